use axum::{
    Router,
    routing::{get, post},
};
use chrono_tz::Tz;
use tokio::sync::RwLock;

use std::sync::Arc;

use crate::{assets, movements, reports, snapshot, users};
use engine::{Engine, JsonStore};

/// The engine behind the whole API. Reads share the lock; every mutation
/// takes it exclusively, which also serializes the store writes.
pub type SharedEngine = Arc<RwLock<Engine<JsonStore>>>;

#[derive(Clone)]
pub struct ServerState {
    pub engine: SharedEngine,
    /// Timezone the month/year report windows are anchored in.
    pub tz: Tz,
}

fn router(state: ServerState) -> Router {
    Router::new()
        .route("/api/data", get(reports::get_data))
        .route("/api/reports", get(reports::get_report))
        .route("/api/tanks", get(reports::get_tanks))
        .route(
            "/api/movements",
            get(movements::list).post(movements::create),
        )
        .route(
            "/api/movements/{id}",
            axum::routing::put(movements::update).delete(movements::remove),
        )
        .route("/api/assets", post(assets::create))
        .route(
            "/api/assets/{id}",
            axum::routing::put(assets::update).delete(assets::remove),
        )
        .route("/api/users", post(users::create))
        .route("/api/users/{id}", axum::routing::delete(users::remove))
        .route("/api/export", get(snapshot::export))
        .route("/api/import", post(snapshot::import))
        .with_state(state)
}

pub async fn run(engine: Engine<JsonStore>, tz: Tz) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, tz, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine<JsonStore>,
    tz: Tz,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    let state = ServerState {
        engine: Arc::new(RwLock::new(engine)),
        tz,
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine<JsonStore>,
    tz: Tz,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, tz, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
