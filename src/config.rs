use anyhow::Result;
use config::{Config, File};
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Theme {
    pub bg: String,      // background
    pub main: String,    // brand color (timer, active highlights)
    pub caret: String,   // cursor block color
    pub text: String,    // prompt text and correct input
    pub sub: String,     // kana reading / inactive labels
    // config lowercases keys, so "subAlt" in a file arrives as "subalt"
    #[serde(alias = "subAlt", alias = "subalt")]
    pub sub_alt: String, // subtle UI elements (footer, borders)
    pub error: String,   // incorrect input
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: "#2c2e34".to_string(),
            main: "#e2b714".to_string(),
            caret: "#e2b714".to_string(),
            text: "#d1d0c5".to_string(),
            sub: "#646669".to_string(),
            sub_alt: "#45474d".to_string(),
            error: "#ca4754".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PracticeConfig {
    /// characters per prompt row
    pub line_length: usize,
    /// hide the kana line and score against the kanji text
    pub conversion_enabled: bool,
    /// duration of the custom preset
    pub custom_seconds: u64,
    pub prompt_path: Option<PathBuf>,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            line_length: 25,
            conversion_enabled: false,
            custom_seconds: 60,
            prompt_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub theme: Theme,
    pub practice: PracticeConfig,
}

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "atw")
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config_path = project_dirs().map(|dirs| dirs.config_dir().join("config.toml"));
        Self::load_from(config_path.as_deref())
    }

    /// Layers the file at `path` (when it exists) over the built-in defaults.
    /// Keys the file leaves out fall back to the `Default` impls.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            if path.exists() {
                builder = builder.add_source(File::from(path));
            }
        }

        let cfg = builder.build()?;
        let app_config: AppConfig = cfg.try_deserialize()?;

        Ok(app_config)
    }
}
