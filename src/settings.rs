//! Front-end settings stored as JSON next to the binary
//!
//! The file carries the screen geometry the board size is derived from,
//! the window caption, and the engine tuning. A missing file is created
//! with the defaults on first launch.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::game::EngineConfig;

/// Settings loaded from `config.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Screen width in pixels
    pub screen_width: u32,
    /// Screen height in pixels
    pub screen_height: u32,
    /// Pixels per board cell
    pub block_size: u32,
    /// Title shown above the board
    pub caption: String,
    /// Simulation tuning
    pub engine: EngineConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            screen_width: 800,
            screen_height: 800,
            block_size: 20,
            caption: "Snake".to_string(),
            engine: EngineConfig::default(),
        }
    }
}

impl Settings {
    /// Read settings from `path`, or write and return the defaults if the
    /// file does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {:?}", path))?;
            let settings: Settings = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse settings in {:?}", path))?;
            settings.validate()?;
            return Ok(settings);
        }

        let settings = Settings::default();
        settings.save(path)?;
        info!(?path, "wrote default settings");
        Ok(settings)
    }

    /// Write settings as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            bail!("block_size must be at least 1");
        }
        self.engine
            .validate()
            .map_err(|e| anyhow::anyhow!("invalid engine settings: {e}"))
    }

    /// Board width in cells
    pub fn board_width(&self) -> i32 {
        (self.screen_width / self.block_size.max(1)) as i32
    }

    /// Board height in cells
    pub fn board_height(&self) -> i32 {
        (self.screen_height / self.block_size.max(1)) as i32
    }
}
