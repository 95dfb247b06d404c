use std::{net::SocketAddr, sync::Arc};

use orders_admin::{
    config::{self, StoreBackend},
    routes,
    services::{mongo_store::MongoOrderStore, order_store::OrderStore, sanity::SanityClient, sessions::ConsoleSessions},
    templates, AppState,
};

fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

async fn build_store(settings: &config::Settings) -> Result<Arc<dyn OrderStore>, String> {
    match settings.store_backend {
        StoreBackend::Sanity => {
            let client = SanityClient::new(settings).map_err(|e| e.to_string())?;
            Ok(Arc::new(client))
        }
        StoreBackend::Mongo => {
            let store = MongoOrderStore::connect(settings)
                .await
                .map_err(|e| e.to_string())?;
            if let Err(e) = store.ensure_indexes().await {
                tracing::warn!(error = %e, "could not ensure order indexes");
            }
            Ok(Arc::new(store))
        }
    }
}

// Consoles of sessions that were never logged out are dropped once their
// token has expired.
fn spawn_console_sweeper(sessions: ConsoleSessions) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(std::time::Duration::from_secs(15 * 60));
        loop {
            tick.tick().await;
            let evicted = sessions.sweep_expired().await;
            if evicted > 0 {
                tracing::info!(evicted, "expired consoles swept");
            }
        }
    });
}

#[tokio::main]
async fn main() {
    setup_tracing();

    let settings = config::load();

    let store = build_store(&settings)
        .await
        .expect("Failed to set up the order store");
    tracing::info!(backend = store.name(), "order store ready");

    if settings.jwt_secret == "change-me-dev-secret" {
        tracing::warn!("JWT_SECRET is not set; using the development secret");
    }

    let state = AppState {
        hbs: templates::build_handlebars(),
        store,
        settings: settings.clone(),
        sessions: ConsoleSessions::new(),
    };

    spawn_console_sweeper(state.sessions.clone());

    let app = routes::app(state);

    let ip = settings
        .host
        .parse::<std::net::IpAddr>()
        .expect("HOST must be an IP address");
    let addr = SocketAddr::from((ip, settings.port));
    tracing::info!("listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.expect("bind listener");
    axum::serve(listener, app).await.expect("server error");
}
