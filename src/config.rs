use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sanity,
    Mongo,
}

impl StoreBackend {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => StoreBackend::Mongo,
            _ => StoreBackend::Sanity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    pub store_backend: StoreBackend,

    pub sanity_project_id: String,
    pub sanity_dataset: String,
    pub sanity_api_version: String,
    pub sanity_api_host: String,
    pub sanity_token: String,

    pub mongodb_uri: String,
    pub mongodb_db: String,

    pub jwt_secret: String,
    pub jwt_cookie_name: String,
    pub session_days: i64,
    pub cookie_secure: bool,

    pub admin_email: String,
    pub admin_password: String,
    pub admin_password_hash: Option<String>,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let session_days = env::var("SESSION_DAYS")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|d| *d > 0)
        .unwrap_or(1);

    let cookie_secure = env::var("COOKIE_SECURE")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let admin_password_hash = env::var("ADMIN_PASSWORD_HASH")
        .ok()
        .filter(|h| !h.trim().is_empty());

    Settings {
        host: var_or("HOST", "127.0.0.1"),
        port,
        store_backend: StoreBackend::parse(&var_or("STORE_BACKEND", "sanity")),
        sanity_project_id: var_or("SANITY_PROJECT_ID", ""),
        sanity_dataset: var_or("SANITY_DATASET", "production"),
        sanity_api_version: var_or("SANITY_API_VERSION", "2025-02-01"),
        sanity_api_host: var_or("SANITY_API_HOST", "api.sanity.io"),
        sanity_token: var_or("SANITY_TOKEN", ""),
        mongodb_uri: var_or("MONGODB_URI", "mongodb://localhost:27017"),
        mongodb_db: var_or("MONGODB_DB", "orders_admin"),
        jwt_secret: var_or("JWT_SECRET", "change-me-dev-secret"),
        jwt_cookie_name: var_or("JWT_COOKIE_NAME", "admin_session"),
        session_days,
        cookie_secure,
        // placeholder credentials; override via .env
        admin_email: var_or("ADMIN_EMAIL", "admin@example.com"),
        admin_password: var_or("ADMIN_PASSWORD", "test123"),
        admin_password_hash,
    }
}
