//! Layered settings: built-in defaults, then a TOML file, then the
//! environment, then command-line flags.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::Deserialize;
use survey_spec::DEFAULT_AUTO_ADVANCE;
use tracing::debug;
use url::Url;

pub const ENDPOINT_ENV: &str = "HI_COWORKING_ENDPOINT";
pub const CONFIG_FILE_NAME: &str = "hi-coworking.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub gateway: GatewaySection,
    pub survey: SurveySection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GatewaySection {
    pub endpoint: Option<String>,
    /// Request timeout; zero or absent means wait indefinitely.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SurveySection {
    pub auto_advance_ms: Option<u64>,
    /// Survey definition to use instead of the embedded catalog. Relative
    /// paths are resolved against the config file's directory.
    pub spec: Option<PathBuf>,
}

/// Values taken from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub endpoint: Option<String>,
    pub survey: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: Option<Url>,
    pub timeout: Option<Duration>,
    pub auto_advance: Duration,
    pub survey_spec: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout: None,
            auto_advance: DEFAULT_AUTO_ADVANCE,
            survey_spec: None,
        }
    }
}

impl Settings {
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let path = match &overrides.config {
            Some(path) => Some(path.clone()),
            None => default_config_path().filter(|path| path.is_file()),
        };
        let file = match &path {
            Some(path) => read_file_config(path)?,
            None => FileConfig::default(),
        };
        let env_endpoint = env::var(ENDPOINT_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty());
        let base_dir = path.as_deref().and_then(Path::parent);
        resolve(file, base_dir, env_endpoint, overrides)
    }
}

/// `hi-coworking.toml` in the platform config directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "hi-coworking").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

pub fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = toml::from_str(&raw)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Merges the layers. Later layers win field by field.
pub fn resolve(
    file: FileConfig,
    base_dir: Option<&Path>,
    env_endpoint: Option<String>,
    overrides: &Overrides,
) -> Result<Settings> {
    let endpoint = overrides
        .endpoint
        .clone()
        .or(env_endpoint)
        .or(file.gateway.endpoint)
        .map(|raw| parse_endpoint(&raw))
        .transpose()?;

    let timeout = file
        .gateway
        .timeout_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);

    let auto_advance = file
        .survey
        .auto_advance_ms
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_AUTO_ADVANCE);

    let survey_spec = overrides.survey.clone().or_else(|| {
        file.survey.spec.map(|spec| match base_dir {
            Some(base) if spec.is_relative() => base.join(spec),
            _ => spec,
        })
    });

    Ok(Settings {
        endpoint,
        timeout,
        auto_advance,
        survey_spec,
    })
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid endpoint URL `{raw}`"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("endpoint `{raw}` must use http or https");
    }
    Ok(url)
}
