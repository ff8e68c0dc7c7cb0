// src/testing.rs
//
// Helpers shared by the unit tests.

use bytes::Bytes;
use std::net::SocketAddr;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use url::Url;
use warp::{http::StatusCode, Filter};

use crate::config::Config;

pub(crate) fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Stand-in for the remote market page: answers `page` with `status` only when
/// the fixed cookie and form body arrive, 403 otherwise.
pub(crate) async fn serve_page(status: StatusCode, page: &'static str) -> SocketAddr {
    let route = warp::post()
        .and(warp::header::<String>("cookie"))
        .and(warp::body::bytes())
        .map(move |cookie: String, body: Bytes| {
            if cookie == "name=anny" && body.as_ref() == b"name=cjb" {
                warp::reply::with_status(page.to_string(), status)
            } else {
                warp::reply::with_status("rejected".to_string(), StatusCode::FORBIDDEN)
            }
        });
    let (addr, server) = warp::serve(route).bind_ephemeral(([127, 0, 0, 1], 0));
    tokio::spawn(server);
    addr
}

/// An address nothing listens on.
pub(crate) async fn closed_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub(crate) fn config_for(addr: SocketAddr) -> Config {
    Config {
        source_url: Url::parse(&format!("http://{}/wkbcom.php", addr)).unwrap(),
        ..Config::default()
    }
}
