//! Render viewport
//!
//! A viewport is a rectangle of the render target, given as fractions of the
//! target size, that one camera renders into. Viewports with a lower z-order
//! are rendered first.

use bitflags::bitflags;

use crate::foundation::math::Mat4;
use crate::scene::{NodeType, SceneNode, WeakSceneNode};

use super::renderer::{RenderError, RenderResult};

bitflags! {
    /// Buffers cleared at the start of a viewport's render pass
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClearFlags: u32 {
        /// Clear the color buffer to the background color
        const COLOR = 1 << 0;
        /// Clear the depth buffer to the clear depth
        const DEPTH = 1 << 1;
        /// Clear the stencil buffer
        const STENCIL = 1 << 2;
    }
}

impl Default for ClearFlags {
    fn default() -> Self {
        Self::COLOR | Self::DEPTH
    }
}

/// RGBA color, components in `[0, 1]`
pub type Color = [f32; 4];

/// Rectangle of a render target driven by one camera
#[derive(Debug, Clone)]
pub struct Viewport {
    camera: WeakSceneNode,

    left: f32,
    top: f32,
    width: f32,
    height: f32,
    z_order: i32,

    background_color: Color,
    clear_flags: ClearFlags,
    clear_depth: f32,

    target_width: u32,
    target_height: u32,
}

impl Viewport {
    /// Create a viewport for `camera` covering the given fraction of a
    /// `target_width` x `target_height` render target
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        camera: &SceneNode,
        left: f32,
        top: f32,
        width: f32,
        height: f32,
        z_order: i32,
        target_width: u32,
        target_height: u32,
    ) -> RenderResult<Self> {
        if camera.node_type() != NodeType::Camera {
            return Err(RenderError::InvalidViewport(format!(
                "node {} is a {:?}, not a camera",
                camera.id(),
                camera.node_type()
            )));
        }

        let mut viewport = Self {
            camera: camera.downgrade(),
            left: 0.0,
            top: 0.0,
            width: 1.0,
            height: 1.0,
            z_order,
            background_color: [0.0, 0.0, 0.0, 1.0],
            clear_flags: ClearFlags::default(),
            clear_depth: 1.0,
            target_width,
            target_height,
        };
        viewport.set_dimensions(left, top, width, height)?;
        Ok(viewport)
    }

    /// Full-target viewport
    pub fn full(camera: &SceneNode, target_width: u32, target_height: u32) -> RenderResult<Self> {
        Self::new(camera, 0.0, 0.0, 1.0, 1.0, 0, target_width, target_height)
    }

    /// Camera rendering into this viewport, if it is still alive
    pub fn camera(&self) -> Option<SceneNode> {
        self.camera.upgrade()
    }

    /// Set position and size as fractions of the render target
    pub fn set_dimensions(&mut self, left: f32, top: f32, width: f32, height: f32) -> RenderResult<()> {
        let in_unit = |v: f32| (0.0..=1.0).contains(&v);
        if !(in_unit(left) && in_unit(top) && width > 0.0 && height > 0.0
            && left + width <= 1.0 + f32::EPSILON && top + height <= 1.0 + f32::EPSILON)
        {
            return Err(RenderError::InvalidViewport(format!(
                "dimensions ({left}, {top}, {width}, {height}) leave the render target"
            )));
        }

        self.left = left;
        self.top = top;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Render target resized
    pub fn set_target_size(&mut self, width: u32, height: u32) {
        self.target_width = width;
        self.target_height = height;
    }

    /// Left edge as a fraction of the target width
    pub fn left(&self) -> f32 {
        self.left
    }

    /// Top edge as a fraction of the target height
    pub fn top(&self) -> f32 {
        self.top
    }

    /// Width as a fraction of the target width
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Height as a fraction of the target height
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Left edge in pixels
    pub fn actual_left(&self) -> u32 {
        (self.left * self.target_width as f32) as u32
    }

    /// Top edge in pixels
    pub fn actual_top(&self) -> u32 {
        (self.top * self.target_height as f32) as u32
    }

    /// Width in pixels
    pub fn actual_width(&self) -> u32 {
        (self.width * self.target_width as f32) as u32
    }

    /// Height in pixels
    pub fn actual_height(&self) -> u32 {
        (self.height * self.target_height as f32) as u32
    }

    /// Width / height of the pixel rectangle
    pub fn aspect_ratio(&self) -> f32 {
        let height = self.actual_height().max(1);
        self.actual_width() as f32 / height as f32
    }

    /// Render order; lower values render first
    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    /// Change the render order
    pub fn set_z_order(&mut self, z_order: i32) {
        self.z_order = z_order;
    }

    /// Background color used when clearing
    pub fn background_color(&self) -> Color {
        self.background_color
    }

    /// Set the background color
    pub fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    /// Buffers cleared before rendering
    pub fn clear_flags(&self) -> ClearFlags {
        self.clear_flags
    }

    /// Choose which buffers are cleared
    pub fn set_clear_flags(&mut self, flags: ClearFlags) {
        self.clear_flags = flags;
    }

    /// Depth value written by a depth clear
    pub fn clear_depth(&self) -> f32 {
        self.clear_depth
    }

    /// Set the depth clear value
    pub fn set_clear_depth(&mut self, depth: f32) {
        self.clear_depth = depth;
    }

    /// Matrix taking normalized device coordinates to window pixels
    ///
    /// x and y map from `[-1, 1]` to the pixel rectangle (y pointing down from
    /// the top edge); z maps from `[-1, 1]` to `[0, 1]`.
    pub fn viewport_matrix(&self) -> Mat4 {
        let half_w = self.actual_width() as f32 * 0.5;
        let half_h = self.actual_height() as f32 * 0.5;
        let left = self.actual_left() as f32;
        let top = self.actual_top() as f32;

        Mat4::new(
            half_w, 0.0, 0.0, left + half_w,
            0.0, -half_h, 0.0, top + half_h,
            0.0, 0.0, 0.5, 0.5,
            0.0, 0.0, 0.0, 1.0,
        )
    }
}
