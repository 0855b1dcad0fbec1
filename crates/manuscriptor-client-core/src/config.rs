use tracing::warn;

use crate::error::{ClientError, Result};
use crate::session::DEFAULT_CLIENT_ID_LENGTH;

pub const DEFAULT_SOCKET_PATH_PREFIX: &str = "ws";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_EXAMPLE_BATCH: &str = "test_batch_1";
pub const DEFAULT_EXAMPLE_SCRIPT: &str = "test_script_1";
pub const DEFAULT_EXAMPLE_PAGE_SIZE: u32 = 1;
pub const DEFAULT_EXAMPLE_PAGE_NUMBER: u32 = 20;

/// Requests sent once the socket opens. The list requests always go out;
/// the two example fetches are a demo hook and can be switched off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub fetch_examples: bool,
    pub example_batch: String,
    pub example_script: String,
    pub page_size: u32,
    pub page_number: u32,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            fetch_examples: true,
            example_batch: DEFAULT_EXAMPLE_BATCH.to_string(),
            example_script: DEFAULT_EXAMPLE_SCRIPT.to_string(),
            page_size: DEFAULT_EXAMPLE_PAGE_SIZE,
            page_number: DEFAULT_EXAMPLE_PAGE_NUMBER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub client_id_length: usize,
    pub socket_path_prefix: String,
    pub log_filter: String,
    pub bootstrap: BootstrapConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            client_id_length: DEFAULT_CLIENT_ID_LENGTH,
            socket_path_prefix: DEFAULT_SOCKET_PATH_PREFIX.to_string(),
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            bootstrap: BootstrapConfig::default(),
        }
    }
}

impl ShellConfig {
    /// Defaults overridden by `key=value` pairs from the page query string.
    /// Bad values are skipped with a warning so a typo never blocks startup.
    pub fn from_query(search: &str) -> Self {
        let mut config = Self::default();
        let query = search.strip_prefix('?').unwrap_or(search);
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            if let Err(error) = config.apply_query_param(key, value) {
                warn!(%error, "ignoring query parameter");
            }
        }
        config
    }

    pub fn apply_query_param(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = || ClientError::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "log" => {
                if value.trim().is_empty() {
                    return Err(invalid());
                }
                self.log_filter = value.trim().to_string();
            }
            "examples" => {
                self.bootstrap.fetch_examples = match value {
                    "1" | "true" | "on" => true,
                    "0" | "false" | "off" => false,
                    _ => return Err(invalid()),
                };
            }
            "page_size" => {
                self.bootstrap.page_size = value.parse().map_err(|_| invalid())?;
            }
            "page_number" => {
                self.bootstrap.page_number = value.parse().map_err(|_| invalid())?;
            }
            "id_length" => {
                let length: usize = value.parse().map_err(|_| invalid())?;
                if length == 0 {
                    return Err(invalid());
                }
                self.client_id_length = length;
            }
            // Unrelated query parameters belong to the page, not to us.
            _ => {}
        }
        Ok(())
    }
}

/// Socket address for a page served from `protocol`//`host`: same host, the
/// scheme switched to its websocket counterpart, the client id as last
/// path segment.
pub fn websocket_url(
    protocol: &str,
    host: &str,
    path_prefix: &str,
    client_id: &str,
) -> Result<String> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ClientError::InvalidOrigin("page host is empty".to_string()));
    }
    let ws_protocol = if protocol == "https:" { "wss" } else { "ws" };
    let prefix = path_prefix.trim_matches('/');
    if prefix.is_empty() {
        Ok(format!("{ws_protocol}://{host}/{client_id}"))
    } else {
        Ok(format!("{ws_protocol}://{host}/{prefix}/{client_id}"))
    }
}
