//! Full frames through a recording renderer

use super::{Call, RecordingRenderer};
use crate::foundation::logging;
use crate::foundation::math::Vec3;
use crate::render::{RenderMode, Viewport};
use crate::scene::{Light, MaterialId, RenderGroupId, SceneError, SceneManager, SceneNode};

#[cfg(test)]
mod tests {
    use super::*;

    /// Scene with a camera at the origin and a quad in front of it
    fn scene_with_camera() -> (SceneManager, SceneNode) {
        logging::init_for_tests();
        let mut scene = SceneManager::new();
        let camera = scene.create_camera(None).unwrap();
        scene.set_active_camera(&camera).unwrap();
        (scene, camera)
    }

    fn quad_at(scene: &SceneManager, z: f32) -> SceneNode {
        let quad = SceneNode::new_quad(1.0, 1.0);
        scene.root().add_child(&quad).unwrap();
        quad.set_position(Vec3::new(0.0, 0.0, z)).unwrap();
        quad
    }

    #[test]
    fn test_render_frame_without_camera_fails() {
        let mut scene = SceneManager::new();
        let mut renderer = RecordingRenderer::default();
        assert!(matches!(scene.render_frame(&mut renderer), Err(SceneError::NoActiveCamera)));
        assert!(renderer.calls.is_empty());
    }

    #[test]
    fn test_solid_is_drawn_before_transparent() {
        let (mut scene, _camera) = scene_with_camera();
        let glass = quad_at(&scene, -8.0);
        glass.set_render_group(RenderGroupId::Transparent).unwrap();
        let wall = quad_at(&scene, -12.0);
        wall.set_render_group(RenderGroupId::Solid).unwrap();

        let mut renderer = RecordingRenderer::default();
        let stats = scene.render_frame(&mut renderer).unwrap();

        assert_eq!(renderer.draws(), vec![wall.id(), glass.id()]);
        assert_eq!(stats.items_queued, 2);
        assert_eq!(&renderer.calls[..2], &[Call::View, Call::Projection]);
    }

    #[test]
    fn test_offscreen_nodes_are_not_drawn() {
        let (mut scene, _camera) = scene_with_camera();
        let visible = quad_at(&scene, -10.0);
        let behind = quad_at(&scene, 10.0);

        let mut renderer = RecordingRenderer::default();
        let stats = scene.render_frame(&mut renderer).unwrap();

        assert_eq!(renderer.draws(), vec![visible.id()]);
        assert!(!scene.queue().contains(behind.id()));
        assert_eq!(stats.nodes_culled, 1);
    }

    #[test]
    fn test_lights_indicators_and_materials() {
        let (mut scene, _camera) = scene_with_camera();

        let lamp = SceneNode::new_light(Light::point(20.0));
        let sun = SceneNode::new_light(Light::directional());
        scene.root().add_child(&lamp).unwrap();
        scene.root().add_child(&sun).unwrap();

        let axis = SceneNode::new_axis(1.0);
        scene.root().add_child(&axis).unwrap();
        axis.set_position(Vec3::new(0.0, 0.0, -5.0)).unwrap();

        let red = MaterialId(1);
        let quads: Vec<_> = (0..3).map(|i| quad_at(&scene, -10.0 - i as f32)).collect();
        for quad in &quads {
            quad.set_material(Some(red)).unwrap();
        }

        let mut renderer = RecordingRenderer::default();
        scene.render_frame(&mut renderer).unwrap();

        // Lights are registered in order, never drawn
        let lights: Vec<_> = renderer
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::Light(index, _) => Some(*index),
                _ => None,
            })
            .collect();
        assert_eq!(lights, vec![0, 1]);
        assert!(!renderer.draws().contains(&lamp.id()));

        // The axis is drawn in wireframe and the mode restored afterwards
        let axis_draw = renderer.calls.iter().position(|c| *c == Call::Draw(axis.id(), 3)).unwrap();
        let wire = renderer.calls.iter().position(|c| *c == Call::Mode(RenderMode::Wireframe)).unwrap();
        let restore = renderer.calls.iter().position(|c| *c == Call::Mode(RenderMode::Solid)).unwrap();
        assert!(wire < axis_draw && axis_draw < restore);
        assert_eq!(renderer.mode, RenderMode::Solid);

        // One material bind for the three quads sharing it
        assert_eq!(renderer.count(&Call::Material(Some(red))), 1);
        for quad in &quads {
            assert!(renderer.calls.contains(&Call::Draw(quad.id(), 2)));
        }
        assert_eq!(renderer.count(&Call::World), 4);
    }

    #[test]
    fn test_viewports_render_in_z_order_with_brackets() {
        let (mut scene, camera) = scene_with_camera();
        let second = scene.create_camera(None).unwrap();
        quad_at(&scene, -10.0);

        let mut front = Viewport::full(&camera, 800, 600).unwrap();
        front.set_z_order(5);
        let mut back = Viewport::new(&second, 0.0, 0.0, 0.5, 0.5, -1, 800, 600).unwrap();
        back.set_z_order(-1);
        scene.add_viewport(front);
        scene.add_viewport(back);

        let mut renderer = RecordingRenderer::default();
        scene.render_viewports(&mut renderer).unwrap();

        let brackets: Vec<_> = renderer
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Begin(_) | Call::End))
            .cloned()
            .collect();
        assert_eq!(brackets, vec![Call::Begin(-1), Call::End, Call::Begin(5), Call::End]);
        assert_eq!(renderer.draws().len(), 2);
    }

    #[test]
    fn test_viewport_with_dropped_camera_is_skipped() {
        let (mut scene, _camera) = scene_with_camera();
        let temporary = scene.create_camera(None).unwrap();
        let key = scene.add_viewport(Viewport::full(&temporary, 640, 480).unwrap());
        temporary.remove_from_parent().unwrap();
        drop(temporary);

        let mut renderer = RecordingRenderer::default();
        scene.render_viewports(&mut renderer).unwrap();
        assert!(renderer.calls.is_empty());

        assert!(scene.remove_viewport(key).is_some());
        assert_eq!(scene.viewport_count(), 0);
    }

    #[test]
    fn test_render_error_still_closes_the_pass() {
        let (mut scene, camera) = scene_with_camera();
        quad_at(&scene, -10.0);
        scene.add_viewport(Viewport::full(&camera, 640, 480).unwrap());

        let mut renderer = RecordingRenderer { fail_draws: true, ..RecordingRenderer::default() };
        let result = scene.render_viewports(&mut renderer);

        assert!(matches!(result, Err(SceneError::Render(_))));
        assert_eq!(renderer.calls.last(), Some(&Call::End));
    }
}
