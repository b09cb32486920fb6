//! # Scene Configuration
//!
//! Configuration for the scene graph pipeline: culling behaviour, traversal
//! limits, default camera parameters and logging. All sections are
//! serializable so a scene setup can be loaded from TOML or RON.
//!
//! ```toml
//! [culling]
//! enabled = true
//! respect_camera_masks = true
//!
//! [traversal]
//! max_depth = 256
//!
//! [camera]
//! fov_y_degrees = 45.0
//! aspect_ratio = 1.3333
//! near = 1.0
//! far = 2000.0
//!
//! [logging]
//! level = "info"
//! ```

use serde::{Deserialize, Serialize};

pub use crate::config::{Config, ConfigError};

/// Frustum culling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CullingConfig {
    /// When false every enabled visual node is queued without bound tests
    pub enabled: bool,
    /// Honour node camera masks against the camera's object mask
    pub respect_camera_masks: bool,
}

impl Default for CullingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            respect_camera_masks: true,
        }
    }
}

/// Tree traversal limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalConfig {
    /// Deepest nesting accepted before a traversal aborts the frame
    pub max_depth: usize,
}

impl Default for TraversalConfig {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Default projection parameters for cameras created by the scene manager
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraDefaults {
    /// Vertical field of view in degrees
    pub fov_y_degrees: f32,
    /// Width / height
    pub aspect_ratio: f32,
    /// Near clipping distance
    pub near: f32,
    /// Far clipping distance
    pub far: f32,
}

impl Default for CameraDefaults {
    fn default() -> Self {
        Self {
            fov_y_degrees: 45.0,
            aspect_ratio: 4.0 / 3.0,
            near: 1.0,
            far: 2000.0,
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// env_logger filter used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// # Scene Configuration
///
/// Root configuration consumed by [`crate::scene::SceneManager`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Culling settings
    pub culling: CullingConfig,
    /// Traversal limits
    pub traversal: TraversalConfig,
    /// Camera defaults
    pub camera: CameraDefaults,
    /// Logging settings
    pub logging: LoggingConfig,
}

impl SceneConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.traversal.max_depth == 0 {
            return Err(ConfigError::Invalid("traversal.max_depth must be at least 1".to_string()));
        }

        let camera = &self.camera;
        if !(camera.fov_y_degrees > 0.0 && camera.fov_y_degrees < 180.0) {
            return Err(ConfigError::Invalid(format!(
                "camera.fov_y_degrees must be in (0, 180), got {}",
                camera.fov_y_degrees
            )));
        }
        if !(camera.aspect_ratio > 0.0 && camera.aspect_ratio.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "camera.aspect_ratio must be positive, got {}",
                camera.aspect_ratio
            )));
        }
        if !(camera.near > 0.0 && camera.near < camera.far && camera.far.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "camera clip range must satisfy 0 < near < far, got near={} far={}",
                camera.near, camera.far
            )));
        }

        Ok(())
    }

    /// Builder pattern: disable or enable frustum culling
    pub fn with_culling(mut self, enabled: bool) -> Self {
        self.culling.enabled = enabled;
        self
    }

    /// Builder pattern: set the traversal depth limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.traversal.max_depth = max_depth;
        self
    }
}

impl Config for SceneConfig {}
