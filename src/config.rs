use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::{
    foundation::error::{CarouselError, CarouselResult},
    slide::persist::PersistLimits,
};

/// Runtime configuration, loaded from an optional JSON file then overridden by environment
/// variables.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub generation: GenerationConfig,
    pub render: RenderConfig,
    pub persistence: PersistenceConfig,
    pub server: ServerConfig,
}

/// Text-completion backend settings.
#[derive(Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub model: String,
    /// Base URL, without the `/v1beta/...` path.
    pub endpoint: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com".to_string(),
        }
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Output scale multiplier (1.0 = 1080×1080).
    pub scale: f32,
    /// Font files registered with the renderer.
    pub fonts: Vec<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            fonts: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Snapshot file used by the `slides` subcommands.
    pub path: PathBuf,
    pub max_slides: usize,
    pub max_bytes: usize,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        let limits = PersistLimits::default();
        Self {
            path: PathBuf::from("carousel-state.json"),
            max_slides: limits.max_slides,
            max_bytes: limits.max_bytes,
        }
    }
}

impl PersistenceConfig {
    pub fn limits(&self) -> PersistLimits {
        PersistLimits {
            max_slides: self.max_slides,
            max_bytes: self.max_bytes,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Request body limit in bytes for the render and export routes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:3000".to_string(),
            max_body_bytes: 32 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load `path` (if given) and apply process environment overrides.
    pub fn load(path: Option<&Path>) -> CarouselResult<Self> {
        let mut cfg = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    /// Parse a JSON config file. Missing sections take their defaults.
    pub fn from_file(path: &Path) -> CarouselResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config file '{}'", path.display()))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// `CAROUSEL_API_KEY` wins over `GEMINI_API_KEY`. Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> CarouselResult<()> {
        let get = |k: &str| lookup(k).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("CAROUSEL_API_KEY").or_else(|| get("GEMINI_API_KEY")) {
            self.generation.api_key = Some(key);
        }
        if let Some(model) = get("CAROUSEL_MODEL") {
            self.generation.model = model;
        }
        if let Some(endpoint) = get("CAROUSEL_ENDPOINT") {
            self.generation.endpoint = endpoint;
        }
        if let Some(fonts) = get("CAROUSEL_FONT") {
            self.render.fonts = std::env::split_paths(&fonts)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(addr) = get("CAROUSEL_ADDR") {
            self.server.addr = addr;
        }
        if let Some(scale) = get("CAROUSEL_RENDER_SCALE") {
            self.render.scale = scale.trim().parse().map_err(|_| {
                CarouselError::validation(format!(
                    "CAROUSEL_RENDER_SCALE must be a number (got \"{scale}\")"
                ))
            })?;
        }
        Ok(())
    }
}
