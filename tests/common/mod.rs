//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use versioned_router::config::{build_router, parse_config};
use versioned_router::http::{BoxHandler, HttpServer};
use versioned_router::{Method, Router, RouterBuilder, Shutdown};

/// Router over string labels, built by `f`.
pub fn label_router<F>(f: F) -> Router<&'static str>
where
    F: FnOnce(&mut RouterBuilder<&'static str>),
{
    let mut builder = RouterBuilder::new();
    f(&mut builder);
    builder.build()
}

/// Handler label found for a GET request.
pub fn get<'r>(router: &'r Router<&'static str>, url: &str) -> Option<&'r &'static str> {
    router.find(Method::Get, url, None)
}

/// Router built from TOML text.
pub fn config_router(toml: &str) -> Arc<Router<BoxHandler>> {
    let config = parse_config(toml).expect("valid config");
    Arc::new(build_router(&config).expect("routes register"))
}

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for the server task to finish.
    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server stops in time")
            .expect("server task does not panic");
    }
}

/// Serve the router described by `toml` on 127.0.0.1 with an ephemeral port.
pub async fn start_server(toml: &str) -> TestServer {
    let config = parse_config(toml).expect("valid config");
    let router = Arc::new(build_router(&config).expect("routes register"));
    let server = HttpServer::new(&config.server, router).expect("server builds");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.clone();

    let handle = tokio::spawn(async move {
        server
            .run(listener, server_shutdown)
            .await
            .expect("server runs");
    });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}
