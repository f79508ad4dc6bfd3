use std::{collections::HashMap, fs, path::PathBuf};

use anyhow::Context;

const CONFIG_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    pub frontend_dir: PathBuf,
    pub message: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:5000".into(),
            frontend_dir: PathBuf::from("frontend"),
            message: "Hello from the backend!".into(),
        }
    }
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(CONFIG_FILE) {
        apply_file(&mut settings, &raw).with_context(|| format!("invalid {CONFIG_FILE}"))?;
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg = toml::from_str::<HashMap<String, String>>(raw)?;
    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("frontend_dir") {
        settings.frontend_dir = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("message") {
        settings.message = v.clone();
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = lookup("APP__FRONTEND_DIR") {
        settings.frontend_dir = PathBuf::from(v);
    }

    if let Some(v) = lookup("APP__MESSAGE") {
        settings.message = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
