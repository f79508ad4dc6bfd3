use std::{
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

use crate::document::{ElementBinding, ElementId, FETCH_BUTTON_ID, MESSAGE_DISPLAY_ID};

const DEFAULT_CONFIG_FILE: &str = "fetcher.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointAddress {
    Absolute(Url),
    Path(String),
}

impl EndpointAddress {
    pub fn resolve(&self, page_origin: &Url) -> anyhow::Result<Url> {
        match self {
            Self::Absolute(url) => Ok(url.clone()),
            Self::Path(path) => page_origin
                .join(path)
                .with_context(|| format!("failed to resolve '{path}' against '{page_origin}'")),
        }
    }
}

impl FromStr for EndpointAddress {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() {
            bail!("endpoint address must not be empty");
        }
        if raw.starts_with('/') {
            return Ok(Self::Path(raw.to_string()));
        }
        let url = parse_http_url(raw)
            .context("endpoint address must be an http(s) URL or a path starting with '/'")?;
        Ok(Self::Absolute(url))
    }
}

impl fmt::Display for EndpointAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(url) => write!(f, "{url}"),
            Self::Path(path) => f.write_str(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherSettings {
    pub endpoint: String,
    pub page_origin: String,
    pub timeout_secs: Option<u64>,
    pub trigger_id: String,
    pub display_id: String,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            endpoint: shared::protocol::MESSAGE_ROUTE.into(),
            page_origin: "http://127.0.0.1:5000".into(),
            timeout_secs: None,
            trigger_id: FETCH_BUTTON_ID.into(),
            display_id: MESSAGE_DISPLAY_ID.into(),
        }
    }
}

impl FetcherSettings {
    pub fn endpoint_address(&self) -> anyhow::Result<EndpointAddress> {
        self.endpoint.parse()
    }

    pub fn endpoint_url(&self) -> anyhow::Result<Url> {
        let page_origin = parse_http_url(&self.page_origin)
            .with_context(|| format!("invalid page origin '{}'", self.page_origin))?;
        self.endpoint_address()?.resolve(&page_origin)
    }

    // Zero disables the timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    pub fn binding(&self) -> ElementBinding {
        ElementBinding {
            trigger: ElementId::new(self.trigger_id.clone()),
            display: ElementId::new(self.display_id.clone()),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    endpoint: Option<String>,
    page_origin: Option<String>,
    timeout_secs: Option<u64>,
    trigger_id: Option<String>,
    display_id: Option<String>,
}

/// A missing `fetcher.toml` is fine; a missing explicit path is an error.
pub fn load_settings(config_path: Option<&Path>) -> anyhow::Result<FetcherSettings> {
    load_settings_with(config_path, |key| std::env::var(key).ok())
}

fn load_settings_with(
    config_path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<FetcherSettings> {
    let mut settings = FetcherSettings::default();

    let (path, required) = match config_path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };
    match fs::read_to_string(&path) {
        Ok(raw) => apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?,
        Err(err) if required => {
            return Err(err)
                .with_context(|| format!("failed to read config file '{}'", path.display()))
        }
        Err(_) => {}
    }

    apply_env(&mut settings, lookup)?;
    Ok(settings)
}

fn apply_file(settings: &mut FetcherSettings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.endpoint {
        settings.endpoint = v;
    }
    if let Some(v) = file_cfg.page_origin {
        settings.page_origin = v;
    }
    if let Some(v) = file_cfg.timeout_secs {
        settings.timeout_secs = Some(v);
    }
    if let Some(v) = file_cfg.trigger_id {
        settings.trigger_id = v;
    }
    if let Some(v) = file_cfg.display_id {
        settings.display_id = v;
    }
    Ok(())
}

fn apply_env(
    settings: &mut FetcherSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("FETCHER_ENDPOINT") {
        settings.endpoint = v;
    }
    if let Some(v) = lookup("APP__ENDPOINT") {
        settings.endpoint = v;
    }

    if let Some(v) = lookup("FETCHER_PAGE_ORIGIN") {
        settings.page_origin = v;
    }
    if let Some(v) = lookup("APP__PAGE_ORIGIN") {
        settings.page_origin = v;
    }

    if let Some(v) = lookup("APP__TIMEOUT_SECS") {
        let parsed = v
            .parse::<u64>()
            .with_context(|| format!("APP__TIMEOUT_SECS must be whole seconds, got '{v}'"))?;
        settings.timeout_secs = Some(parsed);
    }

    if let Some(v) = lookup("APP__TRIGGER_ID") {
        settings.trigger_id = v;
    }
    if let Some(v) = lookup("APP__DISPLAY_ID") {
        settings.display_id = v;
    }

    Ok(())
}

fn parse_http_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => bail!("unsupported scheme '{other}'"),
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
