// src/server.rs

use std::{convert::Infallible, future::Future};
use tokio::sync::oneshot;
use tracing::{error, info, warn};
use warp::{
    http::StatusCode,
    hyper::Body,
    reply::{Reply, Response},
    Filter,
};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::extract;
use crate::fetch::Fetcher;
use crate::publish::{publish, EMPTY_ARRAY};
use crate::signal::{self, TerminationSignal};

/// Every method on every path runs one fetch → extract → publish cycle.
pub fn routes(
    fetcher: Fetcher,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    warp::any()
        .map(move || fetcher.clone())
        .then(handle)
        .with(warp::trace::request())
}

/// A failed fetch answers `502 Bad Gateway` with an empty array body.
pub async fn handle(fetcher: Fetcher) -> Response {
    match fetcher.fetch().await {
        Ok(page) => {
            let records = extract(&page);
            info!(rows = records.len(), "serving records");
            Response::new(Body::from(publish(&records)))
        }
        Err(e) => {
            error!(error = %e, "fetch failed");
            let mut resp = Response::new(Body::from(EMPTY_ARRAY));
            *resp.status_mut() = StatusCode::BAD_GATEWAY;
            resp
        }
    }
}

/// Serve until SIGINT/SIGTERM, then shut the listener down and report which
/// signal ended the run.
pub async fn serve(cfg: &Config) -> Result<TerminationSignal> {
    serve_until(cfg, signal::wait()).await
}

pub async fn serve_until<S>(cfg: &Config, shutdown: S) -> Result<TerminationSignal>
where
    S: Future<Output = Result<TerminationSignal>>,
{
    let addr = cfg.listen_addr();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let (bound, server) = warp::serve(routes(Fetcher::new(cfg)))
        .try_bind_with_graceful_shutdown(addr, async {
            let _ = stop_rx.await;
        })
        .map_err(|e| Error::BindFailed {
            addr,
            reason: e.to_string(),
        })?;
    info!(addr = %bound, source = %cfg.source_url, "listening");
    let server = tokio::spawn(server);

    let received = shutdown.await;
    match &received {
        Ok(sig) => info!("Got signal: {}", sig),
        Err(e) => error!(error = %e, "cannot wait for termination signal"),
    }

    let _ = stop_tx.send(());
    if let Err(e) = server.await {
        warn!(error = %e, "server task ended abnormally");
    }
    received
}
