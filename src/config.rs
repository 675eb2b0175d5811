// Configuration loaded from built-in defaults, the user config file and
// environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: &str = include_str!("../assets/default-config.toml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub service: Service,
    #[serde(default)]
    pub upload: Upload,
}

/// Which of the two Sourcebin URLs is handed back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    #[default]
    Short,
    Full,
}

impl std::str::FromStr for LinkStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(LinkStyle::Short),
            "full" => Ok(LinkStyle::Full),
            other => anyhow::bail!("unknown link style `{other}` (expected `short` or `full`)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    #[serde(default = "Service::default_api_url")]
    pub api_url: String,
    #[serde(default = "Service::default_short_url")]
    pub short_url: String,
    #[serde(default)]
    pub link: LinkStyle,
    #[serde(default = "Service::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Service {
    fn default_api_url() -> String {
        "https://sourceb.in".into()
    }

    fn default_short_url() -> String {
        "https://srcb.in".into()
    }

    fn default_timeout_secs() -> u64 {
        30
    }
}

impl Default for Service {
    fn default() -> Self {
        Self {
            api_url: Self::default_api_url(),
            short_url: Self::default_short_url(),
            link: LinkStyle::default(),
            timeout_secs: Self::default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    #[serde(default = "Upload::default_fallback_language")]
    pub fallback_language: String,
    /// Title used for buffers that were never saved. Unset means the paste
    /// goes up without a title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub untitled_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_table: Option<PathBuf>,
}

impl Upload {
    fn default_fallback_language() -> String {
        "text".into()
    }
}

impl Default for Upload {
    fn default() -> Self {
        Self {
            fallback_language: Self::default_fallback_language(),
            untitled_title: None,
            language_table: None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    api_url: Option<String>,
    link: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            api_url: env::var("BINUP_API_URL").ok(),
            link: env::var("BINUP_LINK").ok(),
        }
    }
}

impl Config {
    /// Load defaults, then `<config_dir>/binup/config.toml`, then the
    /// `BINUP_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_with_layers(global_config_path(), EnvOverrides::from_env())
    }

    fn load_with_layers(global: Option<PathBuf>, env_overrides: EnvOverrides) -> Result<Self> {
        let mut config = Self::from_str(DEFAULT_CONFIG)?;

        if let Some(path) = global.filter(|path| path.exists()) {
            tracing::debug!(path = %path.display(), "loading user config");
            config = config.merge(Self::from_file(&path)?);
        }

        apply_env_overrides(config, env_overrides)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("failed to load config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse TOML config")
    }

    fn merge(self, overlay: Self) -> Self {
        let service = Service {
            api_url: pick(self.service.api_url, overlay.service.api_url, Service::default_api_url),
            short_url: pick(
                self.service.short_url,
                overlay.service.short_url,
                Service::default_short_url,
            ),
            link: if overlay.service.link != LinkStyle::default() {
                overlay.service.link
            } else {
                self.service.link
            },
            timeout_secs: if overlay.service.timeout_secs != Service::default_timeout_secs() {
                overlay.service.timeout_secs
            } else {
                self.service.timeout_secs
            },
        };
        let upload = Upload {
            fallback_language: pick(
                self.upload.fallback_language,
                overlay.upload.fallback_language,
                Upload::default_fallback_language,
            ),
            untitled_title: overlay.upload.untitled_title.or(self.upload.untitled_title),
            language_table: overlay.upload.language_table.or(self.upload.language_table),
        };
        Self { service, upload }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to render config as TOML")
    }
}

fn pick(base: String, overlay: String, default_fn: fn() -> String) -> String {
    if overlay != default_fn() {
        overlay
    } else {
        base
    }
}

pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("binup").join("config.toml"))
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Result<Config> {
    if let Some(api_url) = env.api_url {
        config.service.api_url = api_url;
    }
    if let Some(link) = env.link {
        config.service.link = link.parse().context("invalid BINUP_LINK")?;
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_files() {
        let config = Config::load_with_layers(None, EnvOverrides::default()).expect("defaults");
        assert_eq!(config.service.api_url, "https://sourceb.in");
        assert_eq!(config.service.link, LinkStyle::Short);
        assert_eq!(config.upload.fallback_language, "text");
        assert_eq!(config.upload.untitled_title, None);
    }

    #[test]
    fn user_file_overrides_defaults() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            r#"
[service]
link = "full"
timeout_secs = 5
[upload]
untitled_title = "scratch"
"#,
        )?;
        let config = Config::load_with_layers(Some(path), EnvOverrides::default())?;
        assert_eq!(config.service.link, LinkStyle::Full);
        assert_eq!(config.service.timeout_secs, 5);
        assert_eq!(config.service.api_url, "https://sourceb.in");
        assert_eq!(config.upload.untitled_title.as_deref(), Some("scratch"));
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides {
            api_url: Some("http://127.0.0.1:9".into()),
            link: Some("FULL".into()),
        };
        let config = Config::load_with_layers(None, overrides)?;
        assert_eq!(config.service.api_url, "http://127.0.0.1:9");
        assert_eq!(config.service.link, LinkStyle::Full);
        Ok(())
    }

    #[test]
    fn bad_link_override_is_an_error() {
        let overrides = EnvOverrides {
            api_url: None,
            link: Some("medium".into()),
        };
        assert!(Config::load_with_layers(None, overrides).is_err());
    }

    #[test]
    fn invalid_file_is_an_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("broken.toml");
        fs::write(&path, "this is not toml")?;
        assert!(Config::from_file(&path).is_err());
        Ok(())
    }

    #[test]
    fn renders_round_trippable_toml() -> Result<()> {
        let rendered = Config::default().to_toml()?;
        assert!(rendered.contains("api_url"));
        assert_eq!(Config::from_str(&rendered)?, Config::default());
        Ok(())
    }
}
