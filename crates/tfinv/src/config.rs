//! Configuration loading and types

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tfinv_core::{AddressExtractor, ConvertOptions, DEFAULT_HOST_PREFIX, OutputFormat};
use tfinv_source::DEFAULT_CONSUL_ADDRESS;

/// Environment variable naming a config file
pub const CONFIG_ENV: &str = "TFINV_CONFIG";

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,
    /// Inventory representation to print
    #[serde(default)]
    pub format: OutputFormat,
    /// Project name, exposed on `all` and used in the Consul key
    #[serde(default)]
    pub project: Option<String>,
    /// Host resource classification
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Attribute keys holding address and name
    #[serde(default)]
    pub attributes: AddressExtractor,
    /// Consul key/value source
    #[serde(default)]
    pub consul: ConsulConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            format: OutputFormat::default(),
            project: None,
            classifier: ClassifierConfig::default(),
            attributes: AddressExtractor::default(),
            consul: ConsulConfig::default(),
        }
    }
}

/// Host resource classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Resource name prefixes treated as hosts
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            prefixes: default_prefixes(),
        }
    }
}

/// Consul key/value settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsulConfig {
    /// Agent HTTP address
    #[serde(default = "default_consul_address")]
    pub address: String,
    /// Key prefix; the state lives at `<prefix>:<project>`
    #[serde(default = "default_key_prefix")]
    pub prefix: String,
    /// Datacenter to query
    pub datacenter: Option<String>,
    /// ACL token
    pub token: Option<String>,
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self {
            address: default_consul_address(),
            prefix: default_key_prefix(),
            datacenter: None,
            token: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_prefixes() -> Vec<String> {
    vec![DEFAULT_HOST_PREFIX.to_string()]
}

fn default_consul_address() -> String {
    DEFAULT_CONSUL_ADDRESS.to_string()
}

fn default_key_prefix() -> String {
    "tfstate".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// # Errors
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &Path) -> eyre::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from an explicit path, `TFINV_CONFIG`, or the default locations
    ///
    /// Returns the path the configuration came from, `None` when defaults are used.
    ///
    /// # Errors
    /// Returns error if a selected file cannot be read or parsed
    pub fn load_default(explicit: Option<&Path>) -> eyre::Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            return Ok((Self::load(&path)?, Some(path)));
        }

        let mut paths = vec![
            PathBuf::from("tfinv.toml"),
            PathBuf::from("/etc/tfinv/tfinv.toml"),
        ];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("tfinv/tfinv.toml"));
        }

        for path in paths {
            if path.exists() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }

        Ok((Config::default(), None))
    }

    /// Conversion options derived from this configuration
    #[must_use]
    pub fn options(&self) -> ConvertOptions {
        let mut options = ConvertOptions::default()
            .with_prefixes(self.classifier.prefixes.iter().cloned())
            .with_extractor(self.attributes.clone());
        options.project.clone_from(&self.project);
        options
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.format, OutputFormat::Flat);
        assert_eq!(config.classifier.prefixes, vec![DEFAULT_HOST_PREFIX]);
        assert_eq!(config.consul.address, DEFAULT_CONSUL_ADDRESS);
        assert_eq!(config.consul.prefix, "tfstate");
        assert_eq!(config.attributes, AddressExtractor::default());
    }

    #[test]
    fn test_full_file() {
        let config: Config = toml::from_str(
            r#"
            log_level = "debug"
            format = "tree"
            project = "demo"

            [classifier]
            prefixes = ["aws_instance.", "vsphere_virtual_machine.host"]

            [attributes]
            default_key = "private_ip"

            [consul]
            address = "http://consul.local:8500"
            prefix = "cluster-tfstate"
            datacenter = "infra1"
            "#,
        )
        .unwrap();

        assert_eq!(config.format, OutputFormat::Tree);
        assert_eq!(config.consul.datacenter.as_deref(), Some("infra1"));
        assert_eq!(config.attributes.default_key, "private_ip");
        assert_eq!(config.attributes.list_key, "guest_ip_addresses.0");

        let options = config.options();
        assert_eq!(options.project.as_deref(), Some("demo"));
        assert!(options.classifier.is_host("aws_instance.web"));
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "project = \"demo\"").unwrap();

        let (config, path) = Config::load_default(Some(file.path())).unwrap();
        assert_eq!(config.project.as_deref(), Some("demo"));
        assert_eq!(path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "format = \"yaml\"").unwrap();

        assert!(Config::load(file.path()).is_err());
    }
}
