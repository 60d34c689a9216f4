// rest_api/src/config.rs

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Represents the configuration for the REST API server itself.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_data_directory")]
    pub data_directory: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8082
}

fn default_data_directory() -> String {
    "anc_track_data".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_directory: default_data_directory(),
        }
    }
}

// Wrapper struct to match the 'server:' key in the YAML config.
#[derive(Debug, Deserialize)]
struct ServerConfigWrapper {
    server: ServerConfig,
}

/// Loads the server configuration from a YAML file; falls back to defaults
/// when no file is given.
pub fn load_server_config(config_file_path: Option<PathBuf>) -> Result<ServerConfig> {
    let Some(path) = config_file_path else {
        return Ok(ServerConfig::default());
    };

    let config_content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read server config file {}", path.display()))?;

    let wrapper: ServerConfigWrapper = serde_yaml::from_str(&config_content)
        .with_context(|| format!("Failed to parse server config file {}", path.display()))?;

    Ok(wrapper.server)
}

#[cfg(test)]
mod tests {
    use super::load_server_config;
    use std::io::Write;

    #[test]
    fn missing_path_falls_back_to_defaults() {
        let config = load_server_config(None).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8082);
    }

    #[test]
    fn yaml_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "server:\n  host: 0.0.0.0\n  port: 9000\n  data_directory: /var/lib/anc"
        )
        .unwrap();

        let config = load_server_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_directory, "/var/lib/anc");
    }
}
