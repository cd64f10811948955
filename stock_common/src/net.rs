//! Endpoint constants and URL helpers for the stock data provider.
use url::Url;

use crate::error::ModelError;

/// Default HTTP port of the data provider.
pub const DEFAULT_PORT: u16 = 8080;
/// Path of the one-shot instrument listing.
pub const SNAPSHOT_PATH: &str = "/api/stocks";
/// Path of the live-update WebSocket channel.
pub const UPDATES_PATH: &str = "/api/ws";

/// Helper to format a host with a port like "host:port".
pub fn addr(host: &str, port: u16) -> String {
    format!("{}:{}", host, port)
}

/// Default provider base URL (`http://localhost:8080`).
pub fn default_base_url() -> String {
    format!("http://{}", addr("localhost", DEFAULT_PORT))
}

/// Listing endpoint under `base`.
pub fn snapshot_url(base: &Url) -> Result<Url, ModelError> {
    Ok(base.join(SNAPSHOT_PATH)?)
}

/// Live-update endpoint under `base`, with `http` mapped to `ws` and `https` to `wss`.
pub fn updates_url(base: &Url) -> Result<Url, ModelError> {
    let mut url = base.join(UPDATES_PATH)?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(ModelError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| ModelError::UnsupportedScheme(scheme.to_string()))?;
    Ok(url)
}
