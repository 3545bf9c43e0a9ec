use chrono_tz::Tz;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "gasolio={level},server={level}",
            level = settings.app.level
        ))
        .init();

    let tz: Tz = match settings.report.timezone.parse() {
        Ok(tz) => tz,
        Err(err) => {
            tracing::error!(
                "unknown report timezone {}: {err}",
                settings.report.timezone
            );
            return Ok(());
        }
    };

    let store = match engine::JsonStore::open(&settings.store.path) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!("failed to open store {}: {err}", settings.store.path);
            return Ok(());
        }
    };

    let engine = match engine::Engine::builder().store(store).build() {
        Ok(engine) => engine,
        Err(err) => {
            tracing::error!("failed to build engine from store: {err}");
            return Ok(());
        }
    };

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return Ok(());
        }
    };

    if let Err(err) = server::run_with_listener(engine, tz, listener).await {
        tracing::error!("server failed: {err}");
    }

    Ok(())
}
