//! Session configuration.

use serde::{Deserialize, Serialize};

use crate::raster::RasterConfig;

/// User-toggled behavior flags of an interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionFlags {
    /// Classify automatically whenever a stroke ends.
    pub auto_evaluate: bool,
    /// Reset the canvas automatically after a candidate is selected.
    pub auto_clear: bool,
}

impl Default for SessionFlags {
    fn default() -> Self {
        Self {
            auto_evaluate: true,
            auto_clear: true,
        }
    }
}

/// Configuration for one interaction session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Initial flag values.
    pub flags: SessionFlags,
    /// Touch surface width in canvas coordinates.
    pub canvas_width: f32,
    /// Touch surface height in canvas coordinates.
    pub canvas_height: f32,
    /// Rendering settings for classifier input.
    pub raster: RasterConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            flags: SessionFlags::default(),
            canvas_width: 400.0,
            canvas_height: 400.0,
            raster: RasterConfig::default(),
        }
    }
}
