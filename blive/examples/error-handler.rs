/*
Route handler failures by type.

Each room owns one error-handler table; a second table is shared across all
rooms for the failures everybody treats the same way. A failure nobody
claims is only logged, the sibling handlers and the session keep going.
*/
use std::sync::Arc;

use anyhow::Result;
use thiserror::Error;
use tokio::signal;

use blive::{Client, ErrorHandlers, Event};

#[derive(Debug, Error)]
#[error("the gift ledger is full")]
struct LedgerFull;

#[derive(Debug, Error)]
#[error("chat moved too fast")]
struct TooFast;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // failures every room treats the same way
    let shared = Arc::new(ErrorHandlers::new());
    shared.catch::<LedgerFull, _>(|err, ctx| eprintln!("[{}] shared: {err}", ctx.room_id()));

    let ke = Client::builder(21716679).error_handlers(shared.clone()).build();
    let azi = Client::builder(7983476).error_handlers(shared).build();

    ke.on(Event::SendGift, |_| async { Err(LedgerFull.into()) });
    azi.on(Event::DanmuMsg, |_| async { Err(TooFast.into()) });

    // instance-scoped, invisible to the other room
    azi.catch::<TooFast, _>(|err, ctx| eprintln!("{} only: {err}", ctx.uname()));

    ke.start().await?;
    azi.start().await?;

    signal::ctrl_c().await?;

    ke.stop().await;
    azi.stop().await;

    Ok(())
}
