//! Foreground ticking loop.

use clap::Args;
use std::io::Write;
use std::time::Duration;
use timerdeck_core::storage::data_dir;
use timerdeck_core::{Config, Event, RunLock, Ticker, TickerConfig};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use super::{describe, App, CliResult};

const IDLE_CHECK: Duration = Duration::from_millis(200);

#[derive(Args)]
pub struct RunArgs {
    /// Exit once no timer is running
    #[arg(long)]
    pub until_idle: bool,
}

pub async fn run(args: RunArgs, config: &Config) -> CliResult {
    // Held until pending writes are flushed.
    let _lock = RunLock::acquire(&data_dir()?)?;
    let (session, writer_task) = App::open()?.into_parts();

    let handle = Ticker::spawn(session, TickerConfig::default());
    let notifications = config.notifications.clone();
    handle.with_session_mut(|session| {
        session.set_on_complete(move |timer| {
            if !notifications.completion {
                return;
            }
            print!("completed: {} [{}]", timer.name, timer.category);
            if notifications.bell {
                print!("\x07");
            }
            println!();
            let _ = std::io::stdout().flush();
        })
    });

    let running = handle.with_session(|s| s.repository().running_count());
    info!(running, "ticking");
    println!("{running} timer(s) running, ctrl-c to stop");

    let mut events = handle.subscribe();
    let mut check = tokio::time::interval(IDLE_CHECK);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = events.recv() => match event {
                Ok(event @ Event::HalfwayReached { .. }) => {
                    if config.notifications.halfway {
                        println!("{}", describe(&event));
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "event stream lagged"),
                Err(RecvError::Closed) => break,
            },
            _ = check.tick(), if args.until_idle => {
                if !handle.with_session(|s| s.has_running()) {
                    break;
                }
            }
        }
    }

    if let Some(mut session) = handle.shutdown().await {
        session.clear_on_complete();
        println!("{} timer(s) still running", session.repository().running_count());
    }
    writer_task.finish().await;
    Ok(())
}
