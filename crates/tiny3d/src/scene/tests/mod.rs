//! Cross-module tests for the scene pipeline
//!
//! `scenarios` exercises whole-tree behaviour; `pipeline` drives frames
//! through a recording renderer.

mod pipeline;

use crate::foundation::math::Mat4;
use crate::render::{RenderError, RenderMode, RenderResult, Renderer, Viewport};
use crate::scene::{MaterialId, NodeId, RenderItem};

/// One call received by [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    Begin(i32),
    End,
    View,
    Projection,
    Mode(RenderMode),
    Material(Option<MaterialId>),
    World,
    Draw(NodeId, usize),
    Light(usize, NodeId),
}

/// Renderer that records every call it receives
#[derive(Debug, Default)]
pub(crate) struct RecordingRenderer {
    pub calls: Vec<Call>,
    pub mode: RenderMode,
    pub fail_draws: bool,
}

impl RecordingRenderer {
    pub fn draws(&self) -> Vec<NodeId> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Draw(id, _) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls.iter().filter(|call| *call == wanted).count()
    }
}

impl Renderer for RecordingRenderer {
    fn begin_render(&mut self, viewport: &Viewport) -> RenderResult<()> {
        self.calls.push(Call::Begin(viewport.z_order()));
        Ok(())
    }

    fn end_render(&mut self) -> RenderResult<()> {
        self.calls.push(Call::End);
        Ok(())
    }

    fn set_view_transform(&mut self, _view: &Mat4) {
        self.calls.push(Call::View);
    }

    fn set_projection_transform(&mut self, _projection: &Mat4) {
        self.calls.push(Call::Projection);
    }

    fn set_render_mode(&mut self, mode: RenderMode) -> RenderMode {
        self.calls.push(Call::Mode(mode));
        std::mem::replace(&mut self.mode, mode)
    }

    fn set_material(&mut self, material: Option<MaterialId>) -> RenderResult<()> {
        self.calls.push(Call::Material(material));
        Ok(())
    }

    fn set_world_transform(&mut self, _world: &Mat4) {
        self.calls.push(Call::World);
    }

    fn draw(&mut self, item: &RenderItem, primitive_count: usize) -> RenderResult<()> {
        if self.fail_draws {
            return Err(RenderError::BackendError("device lost".to_string()));
        }
        self.calls.push(Call::Draw(item.node_id, primitive_count));
        Ok(())
    }

    fn add_dynamic_light(&mut self, index: usize, item: &RenderItem) -> RenderResult<()> {
        self.calls.push(Call::Light(index, item.node_id));
        Ok(())
    }
}
