//! # pora-server
//!
//! HTTP front end for the volume probes in `pora-volume`.
//!
//! ## Routes
//!
//! ```text
//! /                       instance index: <INSTANCE_INDEX>
//! /env                    process environment, KEY=VALUE per line
//! /write                  write/append/read/delete a scratch file
//! /create                 create a randomly named file, returns its name
//! /loadtest               4s of 1 MiB write/read/verify cycles
//! /loadtestcleanup        remove poraload-* leftovers
//! /read/<name>            file contents + instance suffix
//! /chmod/<name>/<mode>    apply an octal mode
//! /delete/<name>          remove a file
//! ```
//!
//! The same router is served on every configured port. The first listener
//! to fail ends the process.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use std::io;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::info;

pub use config::{Args, Config, ConfigError, ResolverKind};
pub use error::ApiError;
pub use routes::router;
pub use state::AppState;

/// Serve `app` on every port in `ports` until one listener stops.
///
/// Returns the result of whichever listener finishes first; a bind failure
/// on any port counts.
pub async fn serve(app: Router, ports: &[u16]) -> io::Result<()> {
    let mut listeners = JoinSet::new();
    for &port in ports {
        let app = app.clone();
        listeners.spawn(async move {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let listener = TcpListener::bind(addr).await?;
            info!(%addr, "listening");
            axum::serve(listener, app).await
        });
    }

    match listeners.join_next().await {
        Some(Ok(result)) => result,
        Some(Err(join)) => Err(io::Error::other(join)),
        None => Ok(()),
    }
}

/// Build the router from `config` and serve it on the configured ports.
pub async fn run(config: Config) -> io::Result<()> {
    let state = AppState::new(config);
    let ports = state.config().ports.clone();
    info!(
        ports = ?ports,
        mount_resolver = ?state.config().mount_resolver,
        "starting"
    );
    serve(router(state), &ports).await
}
