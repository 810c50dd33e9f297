use anyhow::Result;

use glsteps_engine::core::{App, AppControl, FrameCtx};
use glsteps_engine::device::GraphicsDevice;
use glsteps_engine::render::{SceneDesc, StaticScene};

/// One lesson: a window title and the static scene it shows.
#[derive(Debug, Clone)]
pub struct Lesson {
    pub title: &'static str,
    pub scene: SceneDesc,
}

/// Drives a lesson's scene through the runtime callbacks.
pub struct LessonApp<D: GraphicsDevice> {
    desc: SceneDesc,
    scene: Option<StaticScene<D>>,
}

impl<D: GraphicsDevice> LessonApp<D> {
    pub fn new(desc: SceneDesc) -> Self {
        Self { desc, scene: None }
    }
}

impl<D: GraphicsDevice> App<D> for LessonApp<D> {
    fn init(&mut self, device: &D) -> Result<()> {
        let scene = StaticScene::build(device, &self.desc)?;
        log::info!(
            "scene ready: '{}', {} vertices per frame",
            self.desc.mesh.name,
            scene.vertex_count()
        );
        self.scene = Some(scene);
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, D>) -> AppControl {
        if let Some(scene) = &self.scene {
            scene.draw(ctx.device);
        }
        AppControl::Continue
    }

    fn teardown(&mut self, device: &D) {
        if let Some(scene) = self.scene.take() {
            scene.release(device);
        }
    }
}

#[cfg(test)]
mod tests {
    use glsteps_engine::input::InputState;
    use glsteps_engine::testing::{Call, RecordingDevice};

    use super::*;
    use crate::catalog;

    fn run_frames(lesson: Lesson, frames: u64) -> (RecordingDevice, LessonApp<RecordingDevice>) {
        let dev = RecordingDevice::new();
        let mut app = LessonApp::new(lesson.scene);
        app.init(&dev).unwrap();
        dev.clear_calls();

        let input = InputState::default();
        for frame_index in 0..frames {
            let mut ctx = FrameCtx { device: &dev, input: &input, frame_index };
            assert_eq!(app.on_frame(&mut ctx), AppControl::Continue);
        }
        (dev, app)
    }

    #[test]
    fn triangle_submits_three_vertices_per_frame() {
        let (dev, _) = run_frames(catalog::triangle(), 4);
        assert_eq!(dev.draw_calls(), vec![(0, 3); 4]);
    }

    #[test]
    fn transformed_triangle_submits_three_vertices_and_the_mvp() {
        let (dev, _) = run_frames(catalog::transformed_triangle(), 2);
        assert_eq!(dev.draw_calls(), vec![(0, 3); 2]);
        let uploads = dev
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::UniformMatrix4 { .. }))
            .count();
        assert_eq!(uploads, 2);
    }

    #[test]
    fn cube_submits_thirty_six_vertices_per_frame() {
        let (dev, _) = run_frames(catalog::colored_cube(), 3);
        assert_eq!(dev.draw_calls(), vec![(0, 36); 3]);
    }

    #[test]
    fn shipped_shaders_link() {
        for lesson in catalog::all() {
            let dev = RecordingDevice::new();
            let mut app = LessonApp::new(lesson.scene);
            app.init(&dev).unwrap();

            let program = dev
                .calls()
                .iter()
                .find_map(|c| match c {
                    Call::CreateProgram { program } => Some(*program),
                    _ => None,
                })
                .unwrap_or_else(|| panic!("{}: no program created", lesson.title));
            assert!(dev.is_linked(program), "{}", lesson.title);
            assert_eq!(dev.live_shaders(), 0, "{}", lesson.title);
        }
    }

    #[test]
    fn teardown_releases_everything_once() {
        let (dev, mut app) = run_frames(catalog::colored_cube(), 1);
        app.teardown(&dev);
        app.teardown(&dev);

        assert_eq!(dev.live_buffers(), 0);
        assert_eq!(dev.live_programs(), 0);
        assert_eq!(dev.live_vertex_arrays(), 0);
        let deletes = dev
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::DeleteVertexArray { .. }))
            .count();
        assert_eq!(deletes, 1);
    }

    #[test]
    fn frames_after_teardown_draw_nothing() {
        let (dev, mut app) = run_frames(catalog::triangle(), 1);
        app.teardown(&dev);
        dev.clear_calls();

        let input = InputState::default();
        let mut ctx = FrameCtx { device: &dev, input: &input, frame_index: 1 };
        app.on_frame(&mut ctx);
        assert!(dev.draw_calls().is_empty());
    }
}
