//! Termination signal handling.

use tracing::warn;

/// Resolve with the name of the first termination signal received.
///
/// On unix this is SIGINT, SIGTERM or SIGHUP. If the handlers cannot be
/// installed, or on other platforms, it falls back to Ctrl-C.
pub async fn wait_for_signal() -> &'static str {
    #[cfg(unix)]
    {
        use futures::FutureExt;
        use tokio::signal::unix::{SignalKind, signal};

        let kinds = [
            (SignalKind::interrupt(), "SIGINT"),
            (SignalKind::terminate(), "SIGTERM"),
            (SignalKind::hangup(), "SIGHUP"),
        ];
        let mut waits = Vec::with_capacity(kinds.len());
        for (kind, name) in kinds {
            match signal(kind) {
                Ok(mut stream) => waits.push(
                    async move {
                        stream.recv().await;
                        name
                    }
                    .boxed(),
                ),
                Err(e) => warn!(signal = name, error = %e, "cannot install signal handler"),
            }
        }
        if !waits.is_empty() {
            let (name, _, _) = futures::future::select_all(waits).await;
            return name;
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C; waiting forever");
        std::future::pending::<()>().await;
    }
    "Ctrl-C"
}
