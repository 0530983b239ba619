//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: COLLECTION_, nested keys separated by `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/collection-service/{service_name}/config.toml
//! 4. System directory: /etc/collection-service/{service_name}/config.toml
//! 5. Default values
//!
//! ```toml
//! [service]
//! name = "kv"
//! port = 8080
//! log_level = "debug"
//!
//! [collection]
//! href = "http://localhost:8080/"
//! profile_href = "http://localhost:8080/profile/kv"
//! ```

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Collection endpoint configuration
    #[serde(default)]
    pub collection: HttpConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Collection endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HttpConfig {
    /// Href written onto every non-empty collection response
    #[serde(default = "default_href")]
    pub href: String,

    /// Profile identifying the response schema
    #[serde(default = "default_profile_href")]
    pub profile_href: String,

    /// Media type of the binary representation
    #[serde(default = "default_content_type")]
    pub content_type: String,
}

impl HttpConfig {
    /// Full content type of the binary representation, including the profile
    pub fn full_content_type(&self) -> String {
        format!("{}; profile={}", self.content_type, self.profile_href)
    }

    /// Value of the `Link` header
    pub fn profile_link(&self) -> String {
        format!("<{}>; rel=\"profile\"", self.profile_href)
    }

    /// Href of the item identified by `key`
    pub fn item_href(&self, key: &str) -> String {
        format!("{}/{}", self.href.trim_end_matches('/'), key)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            href: default_href(),
            profile_href: default_profile_href(),
            content_type: default_content_type(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_href() -> String {
    "/".to_string()
}

fn default_profile_href() -> String {
    "/profile".to_string()
}

fn default_content_type() -> String {
    "application/vnd.collection+protobuf".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name is inferred from the binary name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "collection-service".to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut defaults = Config::default();
        defaults.service.name = service_name.to_string();

        let mut figment = Figment::new().merge(Serialized::defaults(defaults));

        // Lowest priority first so higher priority files override
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed("COLLECTION_").split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// This bypasses the XDG and system directories.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("COLLECTION_").split("__"))
            .extract()?;

        Ok(config)
    }

    /// Candidate config file paths, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix("collection-service");
        if let Some(path) = xdg_dirs.find_config_file(Path::new(service_name).join("config.toml")) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc/collection-service")
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "collection-service".to_string(),
                port: default_port(),
                log_level: default_log_level(),
            },
            collection: HttpConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8080);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(
            config.collection.content_type,
            "application/vnd.collection+protobuf"
        );
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "kv"
port = 9000

[collection]
href = "http://example.com/kv"
profile_href = "http://example.com/profile/kv"
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "kv");
        assert_eq!(config.service.port, 9000);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.collection.href, "http://example.com/kv");
        assert_eq!(
            config.collection.content_type,
            "application/vnd.collection+protobuf"
        );
    }

    #[test]
    fn test_load_from_rejects_bad_types() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[service]\nname = \"kv\"\nport = \"not a port\"").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, crate::error::Error::Config(_)));
    }

    #[test]
    fn test_http_config_headers() {
        let config = HttpConfig {
            href: "http://example.com/kv/".to_string(),
            profile_href: "http://example.com/profile/kv".to_string(),
            content_type: default_content_type(),
        };
        assert_eq!(
            config.full_content_type(),
            "application/vnd.collection+protobuf; profile=http://example.com/profile/kv"
        );
        assert_eq!(
            config.profile_link(),
            "<http://example.com/profile/kv>; rel=\"profile\""
        );
        assert_eq!(config.item_href("a"), "http://example.com/kv/a");
    }
}
