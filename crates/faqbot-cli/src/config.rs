// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_VERSION: i64 = 1;
const APP_NAME: &str = "faqbot";
const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_WELCOME_PATH: &str = "/api/welcome";
const DEFAULT_QUERY_PATH: &str = "/api/query";
const DEFAULT_TITLE: &str = "FAQ";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub ui: Ui,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            backend: Backend::default(),
            ui: Ui::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Backend {
    pub base_url: Option<String>,
    pub welcome_path: Option<String>,
    pub query_path: Option<String>,
    pub timeout: Option<String>,
}

impl Default for Backend {
    fn default() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_owned()),
            welcome_path: Some(DEFAULT_WELCOME_PATH.to_owned()),
            query_path: Some(DEFAULT_QUERY_PATH.to_owned()),
            timeout: Some("5s".to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub title: Option<String>,
    pub transcript: Option<bool>,
    pub reload_on_open: Option<bool>,
    pub typing_delay: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            title: Some(DEFAULT_TITLE.to_owned()),
            transcript: Some(true),
            reload_on_open: Some(false),
            typing_delay: Some("400ms".to_owned()),
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("FAQBOT_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set FAQBOT_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} is not versioned. Add `version = 1` and move values under [backend] and [ui]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if self.version != CONFIG_VERSION {
            bail!(
                "config {} has version {}; expected 1",
                path.display(),
                self.version
            );
        }

        if let Some(timeout) = &self.backend.timeout {
            let parsed = parse_duration(timeout)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "backend.timeout in {} must be positive, got {}",
                    path.display(),
                    timeout
                );
            }
        }

        if let Some(delay) = &self.ui.typing_delay {
            parse_duration(delay)
                .with_context(|| format!("ui.typing_delay in {}", path.display()))?;
        }

        Ok(())
    }

    pub fn base_url(&self) -> &str {
        self.backend
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }

    pub fn welcome_path(&self) -> &str {
        self.backend
            .welcome_path
            .as_deref()
            .unwrap_or(DEFAULT_WELCOME_PATH)
    }

    pub fn query_path(&self) -> &str {
        self.backend
            .query_path
            .as_deref()
            .unwrap_or(DEFAULT_QUERY_PATH)
    }

    pub fn timeout(&self) -> Result<Duration> {
        parse_duration(self.backend.timeout.as_deref().unwrap_or("5s"))
    }

    pub fn title(&self) -> &str {
        self.ui.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn transcript(&self) -> bool {
        self.ui.transcript.unwrap_or(true)
    }

    pub fn reload_on_open(&self) -> bool {
        self.ui.reload_on_open.unwrap_or(false)
    }

    pub fn typing_delay(&self) -> Result<Duration> {
        parse_duration(self.ui.typing_delay.as_deref().unwrap_or("400ms"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# faqbot config\n# Place this file at: {}\n\nversion = 1\n\n[backend]\nbase_url = \"{}\"\nwelcome_path = \"{}\"\nquery_path = \"{}\"\ntimeout = \"5s\"\n\n[ui]\ntitle = \"{}\"\ntranscript = true\nreload_on_open = false\n# \"0ms\" disables the simulated typing pause\ntyping_delay = \"400ms\"\n",
            path.display(),
            DEFAULT_BASE_URL,
            DEFAULT_WELCOME_PATH,
            DEFAULT_QUERY_PATH,
            DEFAULT_TITLE,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(mins * 60));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 400ms or 5s)")
}
