/// Persisted viewer preferences: the toolbar selections and the chart grid
/// spacing, stored as JSON in the per-user config directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::chart::DEFAULT_GRID_SPACING;
use crate::frequency::{
    self, FrequencyRange, RelativeBandwidth, OCTAVE_RANGE_WIDE_DEFAULT,
};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ViewerPreferences {
    #[serde(default = "default_relative_bandwidth")]
    pub relative_bandwidth: String,
    #[serde(default = "default_octave_range")]
    pub octave_range: String,
    #[serde(default = "default_center_frequency")]
    pub center_frequency: f64,
    #[serde(default = "default_grid_spacing")]
    pub grid_spacing: i32,
}

fn default_relative_bandwidth() -> String {
    RelativeBandwidth::ThirdOctave.label().to_owned()
}

fn default_octave_range() -> String {
    OCTAVE_RANGE_WIDE_DEFAULT.to_owned()
}

fn default_center_frequency() -> f64 {
    1000.0
}

fn default_grid_spacing() -> i32 {
    DEFAULT_GRID_SPACING
}

impl Default for ViewerPreferences {
    fn default() -> Self {
        Self {
            relative_bandwidth: default_relative_bandwidth(),
            octave_range: default_octave_range(),
            center_frequency: default_center_frequency(),
            grid_spacing: default_grid_spacing(),
        }
    }
}

impl ViewerPreferences {
    /// Convert the persisted strings back into a frequency range, falling
    /// back to defaults for labels that no longer exist.
    pub fn frequency_range(&self) -> FrequencyRange {
        let relative_bandwidth = RelativeBandwidth::from_label(&self.relative_bandwidth);
        let octave_range = frequency::octave_range_by_label(&self.octave_range).label.to_owned();
        FrequencyRange {
            relative_bandwidth,
            octave_range,
            center_frequency_hz: self.center_frequency,
        }
    }

    /// Load preferences from the default location. Missing or unreadable
    /// files fall back to defaults so first launch works without setup.
    pub fn load() -> Self {
        match preferences_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(preferences) => preferences,
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "preferences file unreadable, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = preferences_path()
            .context("no config directory available for preferences")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!(path = %path.display(), "preferences saved");
        Ok(())
    }
}

/// Per-user preferences file location.
pub fn preferences_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "polarscope")
        .map(|dirs| dirs.config_dir().join("preferences.json"))
}
