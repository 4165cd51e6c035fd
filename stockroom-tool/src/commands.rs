use std::fmt::Display;
use std::time::Duration;

use stockroom_core::{
    Connectivity, Item, ItemId, LocalStore, NewItem, ReconcileReport, Reconciler, RemoteClient,
    Replayed,
};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{error, warn};

use crate::context::AppContext;
use crate::error::ToolError;
use crate::monitor;

pub fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("No items in inventory.");
        return;
    }

    for item in items {
        let marker = if item.pending { "  (pending sync)" } else { "" };
        println!("{:>6}  {}  x{}{}", item.id, item.name, item.quantity, marker);
    }
}

pub fn print_report<E: Display>(report: &ReconcileReport<E>) {
    for outcome in &report.replay.replayed {
        match outcome {
            Replayed::Updated { id } => println!("pushed update for item {}", id),
            Replayed::Recreated { temp_id, id } => {
                println!("uploaded local item {} as item {}", temp_id, id)
            }
        }
    }
    for failure in &report.replay.failed {
        println!("could not push item {}: {}", failure.id, failure.error);
    }
    println!("Synced {} items from remote", report.pulled);
}

pub fn list(ctx: &AppContext) -> Result<(), ToolError> {
    print_items(&ctx.reconciler.items()?);
    Ok(())
}

pub async fn add(ctx: &mut AppContext, name: String, quantity: i64) -> Result<(), ToolError> {
    let item = ctx.reconciler.create(NewItem::new(name, quantity)).await?;
    print_items(&[item]);
    Ok(())
}

pub async fn update(
    ctx: &mut AppContext,
    id: ItemId,
    name: String,
    quantity: i64,
) -> Result<(), ToolError> {
    ensure_known(ctx, id)?;
    let item = Item {
        id,
        name,
        quantity,
        pending: false,
    };
    let item = ctx.reconciler.update(item).await?;
    print_items(&[item]);
    Ok(())
}

pub async fn delete(ctx: &mut AppContext, id: ItemId) -> Result<(), ToolError> {
    ensure_known(ctx, id)?;
    ctx.reconciler.delete(id).await?;
    println!("Deleted item {}", id);
    Ok(())
}

pub async fn sync(ctx: &mut AppContext) -> Result<(), ToolError> {
    let report = ctx
        .connect()
        .await?
        .ok_or_else(|| ToolError::Unreachable(ctx.base_url.clone()))?;
    print_report(&report);
    Ok(())
}

/// Follows connectivity until Ctrl-C, reconciling on every return online.
pub async fn watch(ctx: &mut AppContext, interval: Duration) -> Result<(), ToolError> {
    let events = monitor::spawn(ctx.reconciler.remote().clone(), interval);
    println!(
        "Watching {} every {}s, Ctrl-C to stop",
        ctx.base_url,
        interval.as_secs()
    );

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = follow(&mut ctx.reconciler, events, interval) => {}
    }

    Ok(())
}

/// Feeds connectivity events to the reconciler until the channel closes.
///
/// A failed pass leaves the reconciler online, where the monitor sends no
/// further events, so the pass is retried every `retry` until it succeeds or
/// connectivity drops.
pub async fn follow<L, R>(
    reconciler: &mut Reconciler<L, R>,
    mut events: mpsc::Receiver<Connectivity>,
    retry: Duration,
) where
    L: LocalStore,
    R: RemoteClient,
{
    let mut retry_timer = tokio::time::interval(retry);
    retry_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failed = false;

    loop {
        tokio::select! {
            biased;

            event = events.recv() => {
                let Some(event) = event else { break };
                if event != reconciler.state() {
                    println!("Now {}", event);
                }
                failed = match reconciler.handle(event).await {
                    Ok(Some(report)) => {
                        print_report(&report);
                        false
                    }
                    Ok(None) => failed && event == Connectivity::Online,
                    Err(err) => {
                        error!(%err, "reconciliation failed");
                        true
                    }
                };
                retry_timer.reset();
            }
            _ = retry_timer.tick(), if failed && reconciler.state() == Connectivity::Online => {
                failed = match reconciler.reconcile().await {
                    Ok(report) => {
                        print_report(&report);
                        false
                    }
                    Err(err) => {
                        warn!(%err, "reconciliation retry failed");
                        true
                    }
                };
            }
        }
    }
}

fn ensure_known(ctx: &AppContext, id: ItemId) -> Result<(), ToolError> {
    match ctx.reconciler.local().get(id)? {
        Some(_) => Ok(()),
        None => Err(ToolError::ItemNotFound(id)),
    }
}
