/*
Subscribe to several rooms at once.

Each room gets its own session and dispatcher; a slow or failing room never
stalls the others.
*/
use anyhow::Result;
use clap::Parser;
use tokio::signal;

use blive::{Client, DanmuMsg, Event};

#[derive(Debug, Parser)]
#[command(name = "multi-room", about = "Follow the chat of several rooms.")]
struct Opt {
    /// Rooms to subscribe to
    #[arg(required = true)]
    rooms: Vec<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let opt = Opt::parse();

    let clients: Vec<_> = opt
        .rooms
        .into_iter()
        .map(|room| {
            let client = Client::new(room);

            client.on(Event::DanmuMsg, move |ctx| async move {
                let danmu = DanmuMsg::new(ctx.body());

                println!(
                    "[{}] {}: {:?}",
                    ctx.room_id(),
                    danmu.sender().name,
                    danmu.content()
                );
                Ok(())
            });

            client
        })
        .collect();

    for client in &clients {
        client.start().await?;
    }

    signal::ctrl_c().await?;

    for client in &clients {
        client.stop().await;
    }

    Ok(())
}
