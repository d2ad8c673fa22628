use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::cli::RunArgs;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Resolved viewer settings: defaults, then the config file, then CLI flags.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    pub window: WindowSection,
    pub render: RenderSection,
    pub motion: MotionSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct WindowSection {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSection {
    fn default() -> Self {
        Self {
            title: "shaderbox".to_string(),
            width: 800,
            height: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderSection {
    /// `None` follows the monitor's scale factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    pub antialias: bool,
    pub uniforms: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<PathBuf>,
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            scale: None,
            antialias: true,
            uniforms: vec!["iTime".to_string()],
            vertex: None,
            fragment: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionSection {
    pub time_scale: f64,
    pub reduced: bool,
}

impl Default for MotionSection {
    fn default() -> Self {
        Self {
            time_scale: 1.0,
            reduced: false,
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: ViewerConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Reads `path`; relative shader paths are taken relative to the file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let mut config = Self::from_toml_str(&text)
            .with_context(|| format!("failed to load config file {}", path.display()))?;
        if let Some(dir) = path.parent() {
            config.render.vertex = config.render.vertex.map(|p| anchor(dir, p));
            config.render.fragment = config.render.fragment.map(|p| anchor(dir, p));
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(
                "window width and height must be greater than zero".into(),
            ));
        }
        if let Some(scale) = self.render.scale {
            if !scale.is_finite() || scale <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "render scale must be positive, got {scale}"
                )));
            }
        }
        if !self.motion.time_scale.is_finite() || self.motion.time_scale < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "motion time_scale must not be negative, got {}",
                self.motion.time_scale
            )));
        }
        if let Some(name) = self.render.uniforms.iter().find(|name| name.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "uniform names must not be empty, got {name:?}"
            )));
        }
        Ok(())
    }

    /// Applies command-line flags on top of the file values.
    ///
    /// `--uniform` names are appended after the file's list, skipping ones
    /// already declared.
    pub fn apply_overrides(&mut self, args: &RunArgs) {
        if let Some(title) = &args.title {
            self.window.title = title.clone();
        }
        if let Some(size) = args.size {
            self.window.width = size.width;
            self.window.height = size.height;
        }
        if let Some(scale) = args.scale {
            self.render.scale = Some(scale);
        }
        if args.no_antialias {
            self.render.antialias = false;
        }
        for name in &args.uniforms {
            if !self.render.uniforms.contains(name) {
                self.render.uniforms.push(name.clone());
            }
        }
        if let Some(vertex) = &args.vertex {
            self.render.vertex = Some(vertex.clone());
        }
        if let Some(fragment) = &args.fragment {
            self.render.fragment = Some(fragment.clone());
        }
        if let Some(time_scale) = args.time_scale {
            self.motion.time_scale = time_scale;
        }
        if args.reduced_motion {
            self.motion.reduced = true;
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).context("failed to serialise configuration")
    }
}

fn anchor(dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_relative() {
        dir.join(path)
    } else {
        path
    }
}

/// Builds the effective configuration for a run.
pub fn resolve(args: &RunArgs) -> Result<ViewerConfig> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    config.apply_overrides(args);
    config
        .validate()
        .context("command-line flags produced an invalid configuration")?;
    tracing::debug!(?config, "resolved viewer configuration");
    Ok(config)
}
