/// Runtime configuration read from the environment (and `.env` in dev).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub port: u16,
    /// Browser origins allowed to call the API
    pub cors_origins: Vec<String>,
    /// Redirect plain-HTTP requests and send HSTS (behind a TLS proxy)
    pub require_https: bool,
    /// Upper bound on records in one snapshot (scenarios + controls + plans,
    /// or questions)
    pub max_snapshot_items: usize,
}

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_MAX_SNAPSHOT_ITEMS: usize = 5000;

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let cors_origins = parse_origins(
            &lookup("VANTAGE_CORS_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string()),
        );

        let require_https = lookup("VANTAGE_REQUIRE_HTTPS")
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let max_snapshot_items = lookup("VANTAGE_MAX_SNAPSHOT_ITEMS")
            .and_then(|v| v.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(DEFAULT_MAX_SNAPSHOT_ITEMS);

        Self {
            port,
            cors_origins,
            require_https,
            max_snapshot_items,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    let mut origins: Vec<String> = Vec::new();
    for origin in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !origins.iter().any(|o| o.eq_ignore_ascii_case(origin)) {
            origins.push(origin.to_string());
        }
    }
    origins
}
