/*
Print live chat, gifts and rank changes from one broadcast room.

The room id can be the short vanity id; it is resolved to the real one
before the session opens.
*/
use anyhow::Result;
use clap::Parser;
use tokio::{select, signal};
use tracing::warn;

use blive::{
    Client, DanmuMsg, Event, HotRankChangedV2Msg, InteractWordMsg, SendGiftMsg, SuperChatMsg,
};

#[derive(Debug, Parser)]
#[command(name = "danmu", about = "Print live chat from a broadcast room.")]
struct Opt {
    /// Room to subscribe to
    room_id: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let opt = Opt::parse();
    let client = Client::new(opt.room_id);

    client.on(Event::DanmuMsg, |ctx| async move {
        let danmu = DanmuMsg::new(ctx.body());
        let sender = danmu.sender();

        println!(
            "{}({}:{}): {:?}",
            sender.name,
            sender.medal.name,
            sender.medal.level,
            danmu.content()
        );
        Ok(())
    });

    client.on(Event::InteractWord, |ctx| async move {
        let user = InteractWordMsg::new(ctx.body()).user();

        println!("welcome {} ({}:{})", user.name, user.medal.name, user.medal.level);
        Ok(())
    });

    client.on(Event::SendGift, |ctx| async move {
        let gift = SendGiftMsg::new(ctx.body());

        println!("{} sent {}", gift.sender().name, gift.gift().name);
        Ok(())
    });

    client.on(Event::SuperChatMessage, |ctx| async move {
        let sc = SuperChatMsg::new(ctx.body());

        println!("[SC ¥{}] {}: {}", sc.price(), sc.sender().name, sc.content());
        Ok(())
    });

    client.on(Event::HotRankChangedV2, |ctx| async move {
        let rank = HotRankChangedV2Msg::new(ctx.body());

        println!(
            "{} is now #{} on the {} {} board",
            ctx.uname(),
            rank.rank(),
            rank.area_name(),
            rank.rank_desc()
        );
        Ok(())
    });

    select! {
        res = client.run() => {
            if let Err(err) = res {
                warn!(%err, "session ended");
            }
        }
        _ = signal::ctrl_c() => {
            client.stop().await;
        }
    }

    Ok(())
}
