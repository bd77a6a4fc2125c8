//! Construction-time configuration.
//!
//! Everything the engine, classifier, toolbar and tracker need is collected
//! here and frozen before the first frame. The optional `air_canvas.toml`
//! overrides any subset of the defaults.

use crate::error::{Error, Result};
use crate::types::{Handedness, Rgb};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "air_canvas.toml";
pub const DEFAULT_SAVE_PATH: &str = "canvas_drawing.png";

/// Inclusive size bounds plus the starting value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeBounds {
    pub min: u32,
    pub max: u32,
    pub initial: u32,
}

impl SizeBounds {
    pub fn clamp(&self, n: i64) -> u32 {
        n.clamp(self.min as i64, self.max as i64) as u32
    }
}

/// Frames each one-shot action stays locked after it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    pub clear: u32,
    pub next_color: u32,
    pub undo: u32,
    pub button_click: u32,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self { clear: 30, next_color: 20, undo: 20, button_click: 15 }
    }
}

/// Thumb-index distance drives the brush size every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchSizing {
    pub enabled: bool,
    pub divisor: f32,
    pub min: u32,
    pub max: u32,
}

impl Default for PinchSizing {
    fn default() -> Self {
        Self { enabled: true, divisor: 3.0, min: 4, max: 40 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteColor {
    pub name: String,
    pub rgb: Rgb,
}

impl PaletteColor {
    fn new(name: &str, rgb: Rgb) -> Self {
        Self { name: name.to_string(), rgb }
    }
}

pub fn default_palette() -> Vec<PaletteColor> {
    vec![
        PaletteColor::new("BLUE", [0, 0, 255]),
        PaletteColor::new("GREEN", [0, 255, 0]),
        PaletteColor::new("RED", [255, 0, 0]),
        PaletteColor::new("YELLOW", [255, 255, 0]),
        PaletteColor::new("PURPLE", [255, 0, 255]),
        PaletteColor::new("ORANGE", [255, 165, 0]),
        PaletteColor::new("CYAN", [0, 255, 255]),
        PaletteColor::new("WHITE", [255, 255, 255]),
    ]
}

/// Stroke & mode engine parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub smoothing_window: usize,
    pub undo_depth: usize,
    pub frame_loss_threshold: u32,
    pub cooldowns: CooldownConfig,
    pub brush: SizeBounds,
    pub eraser: SizeBounds,
    pub pinch_sizing: PinchSizing,
    /// Tighter than the classifier's pinch: only a deliberate pinch erases.
    pub eraser_pinch_threshold: f32,
    pub palette: Vec<PaletteColor>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoothing_window: 5,
            undo_depth: 20,
            frame_loss_threshold: 5,
            cooldowns: CooldownConfig::default(),
            brush: SizeBounds { min: 1, max: 50, initial: 8 },
            eraser: SizeBounds { min: 10, max: 100, initial: 50 },
            pinch_sizing: PinchSizing::default(),
            eraser_pinch_threshold: 35.0,
            palette: default_palette(),
        }
    }
}

/// Gesture classifier thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Pixels a fingertip must clear its joint by to count as "up".
    pub finger_margin: i32,
    pub pinch_threshold: f32,
    pub swipe_threshold: i32,
    /// Fallback when the detector does not report a hand.
    pub handedness: Handedness,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self { finger_margin: 10, pinch_threshold: 40.0, swipe_threshold: 100, handedness: Handedness::Right }
    }
}

/// Reserved UI strip at the top of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolbarConfig {
    pub height: i32,
    pub button_width: i32,
    pub button_height: i32,
    pub margin: i32,
    pub top: i32,
    /// Extra rows below the strip that still count as "UI".
    pub zone_padding: i32,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self { height: 90, button_width: 100, button_height: 60, margin: 15, top: 15, zone_padding: 10 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// EMA factor: 0.0 very stable/laggy, 1.0 instant/jittery.
    pub stability_factor: f32,
    pub history_size: usize,
    pub stable_ratio: f32,
    pub bbox_padding: i32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { stability_factor: 0.3, history_size: 5, stable_ratio: 0.8, bbox_padding: 20 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub enabled: bool,
    pub index: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Selfie view: flip frames horizontally.
    pub mirror: bool,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self { enabled: true, index: 0, width: 1280, height: 720, fps: 30, mirror: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub camera: CameraConfig,
    pub engine: EngineConfig,
    pub gesture: GestureConfig,
    pub toolbar: ToolbarConfig,
    pub tracker: TrackerConfig,
    pub save_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            engine: EngineConfig::default(),
            gesture: GestureConfig::default(),
            toolbar: ToolbarConfig::default(),
            tracker: TrackerConfig::default(),
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a TOML file. A missing file is not an error: defaults are used.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No {:?}, using default configuration", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("{:?}: {e}", path)))?;
        log::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(Error::config("camera resolution must be non-zero"));
        }
        if !(0.0..=1.0).contains(&self.tracker.stability_factor) {
            return Err(Error::config("tracker.stability_factor must lie in [0, 1]"));
        }
        if self.tracker.history_size == 0 {
            return Err(Error::config("tracker.history_size must be at least 1"));
        }
        Ok(())
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.smoothing_window == 0 {
            return Err(Error::config("engine.smoothing_window must be at least 1"));
        }
        if self.undo_depth == 0 {
            return Err(Error::config("engine.undo_depth must be at least 1"));
        }
        if self.frame_loss_threshold == 0 {
            return Err(Error::config("engine.frame_loss_threshold must be at least 1"));
        }
        for (name, b) in [("brush", &self.brush), ("eraser", &self.eraser)] {
            if b.min == 0 || b.min > b.max || b.initial < b.min || b.initial > b.max {
                return Err(Error::config(format!("engine.{name}: need 1 <= min <= initial <= max")));
            }
        }
        if self.palette.is_empty() {
            return Err(Error::config("engine.palette must hold at least one colour"));
        }
        if self.pinch_sizing.divisor <= 0.0 {
            return Err(Error::config("engine.pinch_sizing.divisor must be positive"));
        }
        if self.pinch_sizing.min > self.pinch_sizing.max {
            return Err(Error::config("engine.pinch_sizing: need min <= max"));
        }
        Ok(())
    }
}
