use anyhow::{Context, ensure};
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{error, info};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "PATHVIZ";

/// Runtime settings of the visualizer window.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rows (and columns) of the square grid.
    pub rows: usize,
    /// Window side length in pixels.
    pub window_width: u32,
    /// Search steps performed between two redraws.
    pub steps_per_frame: usize,
    /// Probability for a free cell to become an obstacle when scattering.
    pub obstacle_density: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows: 50,
            window_width: 500,
            steps_per_frame: 1,
            obstacle_density: 0.3,
        }
    }
}

impl Settings {
    /// Parses settings from a TOML string, filling missing keys with defaults.
    #[cfg(test)]
    pub fn from_toml_str(toml: &str) -> anyhow::Result<Self> {
        let settings: Settings = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.rows >= 1, "rows must be at least 1, got {}", self.rows);
        ensure!(
            self.window_width as usize >= self.rows,
            "window_width ({}) must leave at least one pixel per row ({} rows)",
            self.window_width,
            self.rows
        );
        ensure!(
            self.steps_per_frame >= 1,
            "steps_per_frame must be at least 1, got {}",
            self.steps_per_frame
        );
        ensure!(
            (0.0..1.0).contains(&self.obstacle_density),
            "obstacle_density must be in [0, 1), got {}",
            self.obstacle_density
        );
        Ok(())
    }
}

/// Loads settings from `config/default.toml` (if present) and `PATHVIZ_*`
/// environment variables, the latter taking precedence.
pub fn load_settings() -> anyhow::Result<Settings> {
    info!("Attempting to load configuration from {}", DEFAULT_CONFIG_PATH);

    let settings: Result<Settings, ConfigError> = Config::builder()
        .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .and_then(Config::try_deserialize);

    match settings {
        Ok(settings) => {
            settings
                .validate()
                .context("Invalid pathviz configuration")?;
            info!(?settings, "Successfully loaded configuration");
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            Err(e).context("Failed to load pathviz configuration")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.rows, 50);
        assert_eq!(settings.window_width, 500);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let settings = Settings::from_toml_str("rows = 20\nsteps_per_frame = 3").unwrap();
        assert_eq!(settings.rows, 20);
        assert_eq!(settings.steps_per_frame, 3);
        assert_eq!(settings.window_width, 500);
        assert_eq!(settings.obstacle_density, 0.3);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let settings = Settings::from_toml_str(include_str!("../config/default.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_invalid_settings_rejected() {
        assert!(Settings::from_toml_str("rows = 0").is_err());
        assert!(Settings::from_toml_str("rows = 600").is_err());
        assert!(Settings::from_toml_str("steps_per_frame = 0").is_err());
        assert!(Settings::from_toml_str("obstacle_density = 1.0").is_err());
        assert!(Settings::from_toml_str("rows = \"many\"").is_err());
    }
}
