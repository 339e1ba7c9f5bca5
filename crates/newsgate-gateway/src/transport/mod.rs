//! Transport layer.
//!
//! Accepts TCP connections by hand instead of using `axum::serve` so each
//! socket passes through the [`tracker::ConnectionTracker`] before any HTTP
//! parsing happens, then serves the router on the connection.

pub mod tracker;

use std::time::Duration;

use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;

use crate::app_state::AppState;
use crate::router;

const DRAIN_DEADLINE: Duration = Duration::from_secs(10);

/// Accept loop. Runs until SIGTERM/ctrl-c, then drains in-flight connections.
pub async fn serve(listener: TcpListener, state: AppState) {
    let app = router::build_router(state.clone());
    let tracker = state.tracker();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("signal received, stopping accept loop");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let guard = tracker.track();
                        let service = TowerToHyperService::new(app.clone());
                        tokio::spawn(async move {
                            let _guard = guard;
                            let io = TokioIo::new(stream);
                            if let Err(err) = auto::Builder::new(TokioExecutor::new())
                                .serve_connection(io, service)
                                .await
                            {
                                tracing::debug!(%peer, error = %err, "connection closed with error");
                            }
                        });
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "accept failed");
                    }
                }
            }
        }
    }

    drain(&state).await;
}

/// Give in-flight connections a bounded window to finish before the process
/// exits. Idle keep-alives are not waited out past the deadline.
async fn drain(state: &AppState) {
    let tracker = state.tracker();
    let deadline = tokio::time::Instant::now() + DRAIN_DEADLINE;
    while tracker.open_count() > 0 {
        if tokio::time::Instant::now() >= deadline {
            tracing::warn!(open = tracker.open_count(), "drain deadline hit, exiting anyway");
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    tracing::info!("all connections drained");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
