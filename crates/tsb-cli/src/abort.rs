use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Spawns a task that sets the returned flag on `SIGINT`/`SIGTERM`,
/// observed cooperatively by the sender/receiver loops between TSs
/// rather than by cancelling their tasks outright.
#[must_use]
pub fn install_abort_handler() -> Arc<AtomicBool> {
    let abort = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&abort);
    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();
        #[cfg(unix)]
        {
            let mut term = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
            tokio::select! {
                _ = ctrl_c => info!("received SIGINT, aborting"),
                _ = term.recv() => info!("received SIGTERM, aborting"),
            }
        }
        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received ctrl-c, aborting");
        }
        flag.store(true, Ordering::Relaxed);
    });
    abort
}
