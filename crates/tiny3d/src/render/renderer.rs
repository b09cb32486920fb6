//! Renderer contract consumed by the scene pipeline
//!
//! The scene core never talks to a graphics API. It hands a populated
//! [`RenderQueue`] to something implementing [`Renderer`], bracketed by
//! `begin_render`/`end_render` for each viewport.

use thiserror::Error;

use crate::foundation::math::Mat4;
use crate::scene::{MaterialId, RenderGroupId, RenderItem, RenderQueue};

use super::Viewport;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A rendering operation failed during execution
    #[error("Rendering failed: {0}")]
    RenderingFailed(String),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),

    /// Viewport parameters are out of range or reference a non-camera node
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;

/// Rasterization mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Filled polygons
    #[default]
    Solid,
    /// Polygon edges only
    Wireframe,
    /// Vertices only
    Points,
}

/// Draw-call sink for a populated render queue
///
/// Implementors provide the primitive operations; [`Renderer::render`] has a
/// default implementation that walks the queue in group order:
///
/// - `Light` entries are registered with [`Renderer::add_dynamic_light`] and
///   not drawn
/// - `Indicator` entries are drawn in wireframe mode, and the previous mode is
///   restored afterwards
/// - every other entry binds its material once per batch, then sets its world
///   transform and is drawn with its primitive count
pub trait Renderer {
    /// Start a render pass for a viewport
    fn begin_render(&mut self, viewport: &Viewport) -> RenderResult<()>;

    /// Finish the current render pass
    fn end_render(&mut self) -> RenderResult<()>;

    /// Set the view matrix for subsequent draws
    fn set_view_transform(&mut self, view: &Mat4);

    /// Set the projection matrix for subsequent draws
    fn set_projection_transform(&mut self, projection: &Mat4);

    /// Change the rasterization mode, returning the previous one
    fn set_render_mode(&mut self, mode: RenderMode) -> RenderMode;

    /// Bind a material; `None` binds the renderer's default material
    fn set_material(&mut self, material: Option<MaterialId>) -> RenderResult<()>;

    /// Set the world matrix for the next draw
    fn set_world_transform(&mut self, world: &Mat4);

    /// Issue a draw call for one queued item
    fn draw(&mut self, item: &RenderItem, primitive_count: usize) -> RenderResult<()>;

    /// Register a light for this pass; `index` counts lights from zero
    fn add_dynamic_light(&mut self, index: usize, item: &RenderItem) -> RenderResult<()>;

    /// Submit every queued item in group order
    fn render(&mut self, queue: &RenderQueue) -> RenderResult<()> {
        let mut current: Option<(RenderGroupId, Option<MaterialId>)> = None;
        let mut restore_mode: Option<RenderMode> = None;
        let mut light_index = 0;

        let result = queue.try_for_each_in_order(|group, material, item| {
            let group_changed = current.map(|(g, _)| g) != Some(group);
            if group_changed {
                if let Some(mode) = restore_mode.take() {
                    self.set_render_mode(mode);
                }
                if group == RenderGroupId::Indicator {
                    restore_mode = Some(self.set_render_mode(RenderMode::Wireframe));
                }
            }

            if group == RenderGroupId::Light {
                current = Some((group, material));
                self.add_dynamic_light(light_index, item)?;
                light_index += 1;
                return Ok(());
            }

            if group_changed || current.map(|(_, m)| m) != Some(material) {
                self.set_material(material)?;
            }
            current = Some((group, material));

            match &item.geometry {
                Some(geometry) => {
                    self.set_world_transform(&item.world_matrix);
                    self.draw(item, geometry.primitive_count())
                }
                None => {
                    log::trace!("Node {} has no geometry, nothing to draw", item.node_id);
                    Ok(())
                }
            }
        });

        if let Some(mode) = restore_mode {
            self.set_render_mode(mode);
        }
        result
    }
}
