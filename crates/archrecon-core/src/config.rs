use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::binder::ExhibitPolicy;
use crate::filter::BlacklistFilter;
use crate::similarity::{NameTrimmer, DEFAULT_DELIMITER};

/// Name of the configuration file looked up by [`Config::load_or_default`].
pub const CONFIG_FILE: &str = ".archrecon.toml";

/// Top-level configuration from `.archrecon.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub name_resemblance: NameResemblanceConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub binder: BinderConfig,
}

/// Affixes stripped from simple type names before they are compared.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameResemblanceConfig {
    #[serde(default)]
    pub excluded_prefixes: String,
    #[serde(default = "default_excluded_suffixes")]
    pub excluded_suffixes: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: String,
}

fn default_excluded_suffixes() -> String {
    "Impl".to_string()
}

fn default_delimiter() -> String {
    DEFAULT_DELIMITER.to_string()
}

impl Default for NameResemblanceConfig {
    fn default() -> Self {
        Self {
            excluded_prefixes: String::new(),
            excluded_suffixes: default_excluded_suffixes(),
            delimiter: default_delimiter(),
        }
    }
}

/// Regex patterns of qualified type names kept out of candidate groupings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub blacklist: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BinderConfig {
    #[serde(default = "default_true")]
    pub exhibit_all_provided: bool,
}

fn default_true() -> bool {
    true
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            exhibit_all_provided: true,
        }
    }
}

impl Config {
    /// Load configuration from a `.archrecon.toml` file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        let config: Config = toml::from_str(&content).with_context(|| {
            format!(
                "failed to parse '{}'. Run `archrecon init` to create a valid config file",
                path.display()
            )
        })?;
        config
            .blacklist_filter()
            .with_context(|| format!("invalid [filter] section in '{}'", path.display()))?;
        Ok(config)
    }

    /// Load from `.archrecon.toml` in the given directory or any ancestor, or return defaults.
    pub fn load_or_default(dir: &Path) -> Self {
        let start = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
        let mut current = start.as_path();
        loop {
            let config_path = current.join(CONFIG_FILE);
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => config,
                    Err(e) => {
                        warn!(
                            "failed to load config from '{}': {e:#}. Using defaults.",
                            config_path.display()
                        );
                        Self::default()
                    }
                };
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        Self::default()
    }

    pub fn trimmer(&self) -> NameTrimmer {
        let names = &self.name_resemblance;
        NameTrimmer::from_delimited(
            &names.excluded_prefixes,
            &names.excluded_suffixes,
            &names.delimiter,
        )
    }

    pub fn exhibit_policy(&self) -> ExhibitPolicy {
        ExhibitPolicy::from_flag(self.binder.exhibit_all_provided)
    }

    pub fn blacklist_filter(&self) -> Result<BlacklistFilter> {
        BlacklistFilter::new(&self.filter.blacklist)
    }

    /// Generate default TOML content for `archrecon init`.
    pub fn default_toml() -> String {
        r#"# archrecon - Architecture Reconstruction Configuration

[name_resemblance]
# Affixes stripped from simple type names before comparing them,
# separated by the delimiter. Stripping repeats until nothing matches.
excluded_prefixes = ""
excluded_suffixes = "Impl"
delimiter = "§"

[filter]
# Regular expressions matched case-insensitively against the whole
# qualified type name. Matching types never enter a candidate grouping.
blacklist = []
# blacklist = ["java\\..*", "javax\\..*", ".*\\.test\\..*"]

[binder]
# Exhibit every provided interface of a sub-component at its composite,
# even when a connector inside the composite already binds it.
exhibit_all_provided = true
"#
        .to_string()
    }
}
