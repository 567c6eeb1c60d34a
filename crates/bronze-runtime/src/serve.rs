//! The message loop.
//!
//! Adapters push incoming messages into an `mpsc` channel; [`serve`] hands
//! each one to the [`System`] on its own task, so a slow or panicking command
//! never holds up the next message.
//!
//! ```rust,ignore
//! let (tx, rx) = tokio::sync::mpsc::channel(64);
//! tokio::spawn(gateway.forward_messages(tx));
//! bronze_runtime::serve::run(system, platform, rx).await;
//! ```

use std::sync::Arc;

use bronze_core::{BoxedPlatform, Message};
use bronze_framework::System;
use tokio::signal;
use tokio::sync::mpsc;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info};

use crate::error::{RuntimeError, RuntimeResult};

/// Handles messages from `incoming` until the system's shutdown token is
/// cancelled or the channel closes, then waits for in-flight messages.
pub async fn serve(system: System, platform: BoxedPlatform, mut incoming: mpsc::Receiver<Message>) {
    let shutdown = system.shutdown_token().clone();
    let tracker = TaskTracker::new();

    info!("Bronze is now handling messages");

    loop {
        let msg = tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Shutdown requested, no longer accepting messages");
                break;
            }
            msg = incoming.recv() => msg,
        };

        let Some(msg) = msg else {
            debug!("Message source closed");
            break;
        };

        let system = system.clone();
        let platform = Arc::clone(&platform);
        tracker.spawn(async move {
            system.handle_message(platform, Arc::new(msg)).await;
        });
    }

    tracker.close();
    debug!(in_flight = tracker.len(), "Waiting for in-flight messages");
    tracker.wait().await;

    info!("Message loop stopped");
}

/// Like [`serve`], additionally cancelling the system on Ctrl+C or SIGTERM.
pub async fn run(system: System, platform: BoxedPlatform, incoming: mpsc::Receiver<Message>) {
    let shutdown = system.shutdown_token().clone();
    let watcher = tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(()) => shutdown.cancel(),
            Err(e) => error!(error = %e, "Signal handling unavailable, stop the message source to exit"),
        }
    });

    serve(system, platform, incoming).await;
    watcher.abort();
}

/// Waits for Ctrl+C, or SIGTERM on unix.
pub async fn wait_for_shutdown() -> RuntimeResult<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(RuntimeError::Signal)?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result.map_err(RuntimeError::Signal)?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.map_err(RuntimeError::Signal)?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}
