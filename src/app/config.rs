//! Application configuration.

/// Defaults applied to every response.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Media type of a response until a handler changes it.
    pub default_media_type: String,
    /// Charset of a response until a handler changes it.
    pub default_charset: String,
    /// Name shown in generated error pages.
    pub server_name: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_media_type: "text/html".to_string(),
            default_charset: "UTF-8".to_string(),
            server_name: format!("microweb-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
