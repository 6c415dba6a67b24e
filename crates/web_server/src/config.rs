//! Server configuration loaded from environment variables.

/// Runtime settings for the page server.
pub struct Config {
    /// Port the HTTP server binds on.
    pub port: u16,
    /// Base URL of the hosted image service.
    pub image_host_url: String,
    /// Optional bearer token for the image host.
    pub image_host_key: Option<String>,
}

impl Config {
    /// Reads configuration from the environment, falling back to local
    /// development defaults.
    pub fn from_env() -> Self {
        Self {
            port: parse_port(std::env::var("PORT").ok()),
            image_host_url: std::env::var("IMAGE_STORE_URL")
                .unwrap_or_else(|_| "http://localhost:9000".to_string()),
            image_host_key: std::env::var("IMAGE_STORE_KEY").ok(),
        }
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    raw.and_then(|value| value.parse().ok()).unwrap_or(3000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_defaults_to_3000() {
        assert_eq!(parse_port(None), 3000);
        assert_eq!(parse_port(Some("not-a-port".to_string())), 3000);
    }

    #[test]
    fn test_port_honors_the_environment() {
        assert_eq!(parse_port(Some("8080".to_string())), 8080);
    }
}
