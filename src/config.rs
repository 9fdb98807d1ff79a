// ⚙️ Dashboard configuration - page chrome, export naming, server address
//
// Every field has a default, so a config file only lists what it overrides.

use crate::export::{EXPORT_FILENAME, EXPORT_MIME};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub page_title: String,
    pub page_icon: String,
    pub heading: String,
    pub tagline: String,
    pub footer: String,

    pub export_filename: String,
    pub export_mime: String,

    /// How many calendar months the month picker starts with
    pub default_month_count: usize,

    pub bind_addr: String,

    /// Idle seconds before a server session is dropped
    pub session_ttl_secs: u64,
    pub max_sessions: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_title: "Sales Dashboard".to_string(),
            page_icon: "📊".to_string(),
            heading: "📊 Sales Dashboard Demo".to_string(),
            tagline: "Interactive dashboard for testing business logic".to_string(),
            footer: "Dashboard created for business logic testing".to_string(),
            export_filename: EXPORT_FILENAME.to_string(),
            export_mime: EXPORT_MIME.to_string(),
            default_month_count: 6,
            bind_addr: "0.0.0.0:3000".to_string(),
            session_ttl_secs: 3600,
            max_sessions: 1000,
        }
    }
}

impl DashboardConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        if config.default_month_count > 12 {
            anyhow::bail!(
                "default_month_count must be at most 12, got {}",
                config.default_month_count
            );
        }
        if config.max_sessions == 0 {
            anyhow::bail!("max_sessions must be at least 1");
        }
        Ok(config)
    }

    /// The file named by `--config`, or defaults when none was given
    pub fn from_path(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
