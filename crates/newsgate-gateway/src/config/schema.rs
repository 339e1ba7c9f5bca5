use std::collections::HashMap;

use newsgate_core::error::{NewsGateError, Result};

/// Resolved service configuration.
///
/// Sourced from the process environment: `PORT`, `COLOR`, `NEWSAPI_KEY`,
/// `NEWSAPI_URL`, `NEWSAPI_SEARCH_URL`, `DB_HOST`/`DB_PORT`. Empty values are
/// treated the same as unset.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen port.
    pub port: u16,
    /// Instance label attached to every metric.
    pub color: String,
    /// Upstream credential. Absent is not a startup error; readiness and the
    /// proxy endpoint report it per request.
    pub newsapi_key: Option<String>,
    /// Top-headlines endpoint, used verbatim (it embeds its own query string).
    pub headlines_url: String,
    /// Search endpoint; `q` is appended per request.
    pub search_url: String,
    /// Optional readiness dependency.
    pub db: Option<DbAddr>,
}

/// Optional TCP dependency probed by the readiness check.
#[derive(Debug, Clone)]
pub struct DbAddr {
    pub host: String,
    pub port: u16,
}

impl GatewayConfig {
    /// Build from `(name, value)` pairs. `std::env::vars()` in production;
    /// tests pass their own.
    pub fn from_pairs<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let vars: HashMap<String, String> = vars.into_iter().collect();
        let get = |name: &str| vars.get(name).map(String::as_str).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            None => default_port(),
            Some(v) => v
                .parse::<u16>()
                .map_err(|e| NewsGateError::Config(format!("PORT must be a port number: {e}")))?,
        };

        let cfg = Self {
            port,
            color: get("COLOR").unwrap_or(default_color()).to_string(),
            newsapi_key: get("NEWSAPI_KEY").map(str::to_string),
            headlines_url: get("NEWSAPI_URL").unwrap_or(default_headlines_url()).to_string(),
            search_url: get("NEWSAPI_SEARCH_URL").unwrap_or(default_search_url()).to_string(),
            db: parse_db_pair(get("DB_HOST"), get("DB_PORT")),
        };

        cfg.validate()?;

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        check_http_url("NEWSAPI_URL", &self.headlines_url)?;
        check_http_url("NEWSAPI_SEARCH_URL", &self.search_url)?;
        Ok(())
    }
}

/// The DB check only runs when both halves of the pair are present and the
/// port parses; a half-configured or unparsable pair is treated as
/// unconfigured, with a warning so the misconfiguration is visible.
fn parse_db_pair(host: Option<&str>, port: Option<&str>) -> Option<DbAddr> {
    let host = host?;
    let Some(port) = port else {
        tracing::warn!(%host, "DB_HOST set without DB_PORT; skipping readiness DB check");
        return None;
    };
    match port.parse::<u16>() {
        Ok(port) => Some(DbAddr { host: host.to_string(), port }),
        Err(err) => {
            tracing::warn!(%host, %port, %err, "DB_PORT is not a port number; skipping readiness DB check");
            None
        }
    }
}

fn check_http_url(name: &str, value: &str) -> Result<()> {
    let url = reqwest::Url::parse(value)
        .map_err(|e| NewsGateError::Config(format!("{name} is not a valid URL: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(NewsGateError::Config(format!(
            "{name} must be an http(s) URL, got scheme {}",
            url.scheme()
        )));
    }
    Ok(())
}

fn default_port() -> u16 {
    8080
}
fn default_color() -> &'static str {
    "unknown"
}
fn default_headlines_url() -> &'static str {
    "https://newsapi.org/v2/top-headlines?country=us"
}
fn default_search_url() -> &'static str {
    "https://newsapi.org/v2/everything"
}
