//! # Core Module
//!
//! Shared configuration consumed by the scene pipeline.
//!
//! ## Organization
//!
//! - **Config**: [`SceneConfig`] and its nested sections, loadable from TOML or RON

pub mod config;

pub use config::{
    CameraDefaults,
    Config,
    ConfigError,
    CullingConfig,
    LoggingConfig,
    SceneConfig,
    TraversalConfig,
};
