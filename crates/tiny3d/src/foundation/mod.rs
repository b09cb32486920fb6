//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types and operations
//! - The affine `Transform` value
//! - Logging utilities

pub mod math;
pub mod transform;
pub mod logging;

pub use transform::Transform;
