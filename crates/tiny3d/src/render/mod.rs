//! # Rendering Contracts
//!
//! The scene core does not render anything itself. This module defines the
//! narrow interfaces through which a populated render queue reaches a
//! graphics backend.
//!
//! ## Architecture
//!
//! - **Renderer**: draw-call sink; its default `render` walks the queue in group order
//! - **Viewport**: target rectangle, clear state and the camera that drives it

pub mod renderer;
pub mod viewport;

pub use renderer::{RenderError, RenderMode, RenderResult, Renderer};
pub use viewport::{ClearFlags, Color, Viewport};
