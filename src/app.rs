use std::sync::Arc;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::bounds::BoundingBox;
use crate::config::{SceneConstants, ViewerConfig};
use crate::error::ViewerError;
use crate::geometry;
use crate::gpu::GpuContext;
use crate::input::{InputQueue, ViewerEvent};
use crate::mesh::Mesh;
use crate::mesh_pass::MeshPass;
use crate::orbit_camera::OrbitCamera;
use crate::texture::MaterialTextures;
use crate::transform::{FrameTransforms, ViewportState, frame_transforms};

/// Whether the render loop should keep going.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopState {
    #[default]
    Running,
    Terminated,
}

/// Everything a frame depends on that is not a GPU resource.
///
/// Events are applied in arrival order and the transforms are recomputed
/// from scratch every frame, so this can be driven without a window.
#[derive(Clone, Debug)]
pub struct ViewerState {
    pub orbit: OrbitCamera,
    pub viewport: ViewportState,
    /// Bounds of the imported mesh; fixed after loading.
    pub bounds: BoundingBox,
    pub scene: SceneConstants,
    loop_state: LoopState,
}

impl ViewerState {
    pub fn new(bounds: BoundingBox, viewport: ViewportState, scene: SceneConstants) -> Self {
        Self {
            orbit: OrbitCamera::new(),
            viewport,
            bounds,
            scene,
            loop_state: LoopState::Running,
        }
    }

    /// Feed one input event into the orbit state machine or the viewport.
    pub fn apply(&mut self, event: ViewerEvent) {
        match event {
            ViewerEvent::PointerPress { x, y } => self.orbit.press(x, y),
            ViewerEvent::PointerMove { x, y } => self.orbit.move_to(x, y),
            ViewerEvent::PointerRelease => self.orbit.release(),
            ViewerEvent::Resize { width, height } => self.viewport.resize(width, height),
        }
    }

    /// Drain every queued event, oldest first.
    pub fn apply_all(&mut self, input: &mut InputQueue) {
        for event in input.drain() {
            self.apply(event);
        }
    }

    pub fn frame_transforms(&self) -> FrameTransforms {
        frame_transforms(&self.bounds, &self.orbit, self.viewport, &self.scene)
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    /// Leave the loop. There is no way back to `Running`.
    pub fn request_close(&mut self) {
        self.loop_state = LoopState::Terminated;
    }
}

/// Open the viewer window and run until it is closed.
///
/// Window, GPU, mesh, texture and shader setup all happen before the first
/// frame; any failure there ends the event loop and is returned here.
///
/// # Example
/// ```no_run
/// use orbitview::{ViewerConfig, run};
///
/// run(ViewerConfig::new().model("assets/bunny.stl")).unwrap();
/// ```
pub fn run(config: ViewerConfig) -> Result<(), ViewerError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ViewerApp {
        phase: Phase::Pending { config },
        fatal: None,
    };
    event_loop.run_app(&mut app)?;

    match app.fatal {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    mesh: Mesh,
    pass: MeshPass,
    input: InputQueue,
    state: ViewerState,
    clear_color: wgpu::Color,
}

enum Phase {
    Pending { config: ViewerConfig },
    Running(Box<Running>),
    Stopped,
}

struct ViewerApp {
    phase: Phase,
    fatal: Option<ViewerError>,
}

impl ViewerApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        self.phase = Phase::Stopped;
        self.fatal = Some(err);
        event_loop.exit();
    }
}

fn start(config: &ViewerConfig, event_loop: &ActiveEventLoop) -> Result<Running, ViewerError> {
    let window_attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

    let window = Arc::new(
        event_loop
            .create_window(window_attrs)
            .map_err(|e| ViewerError::init("window", e))?,
    );
    let gpu = GpuContext::new(window.clone())?;

    let raw = geometry::import_first_mesh(&config.model).map_err(|source| ViewerError::Import {
        path: config.model.clone(),
        source,
    })?;
    tracing::info!(
        path = %config.model.display(),
        vertices = raw.vertices.len(),
        triangles = raw.triangle_count(),
        "imported mesh"
    );

    let bounds = raw.bounds();
    let mesh = Mesh::from_geometry(&gpu, &raw);
    let material = MaterialTextures::load(&gpu, &config.textures)?;
    let pass = MeshPass::new(&gpu, &material)?;

    let viewport = ViewportState::new(gpu.width(), gpu.height());
    let state = ViewerState::new(bounds, viewport, config.scene);

    Ok(Running {
        window,
        gpu,
        mesh,
        pass,
        input: InputQueue::new(),
        state,
        clear_color: config.clear_color,
    })
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Phase::Pending { config } = &self.phase else {
            return;
        };

        match start(config, event_loop) {
            Ok(running) => {
                tracing::info!(
                    width = running.gpu.width(),
                    height = running.gpu.height(),
                    "viewer running"
                );
                running.window.request_redraw();
                self.phase = Phase::Running(Box::new(running));
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Phase::Running(running) = &mut self.phase else {
            return;
        };
        let Running {
            window,
            gpu,
            mesh,
            pass,
            input,
            state,
            clear_color,
        } = running.as_mut();

        input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                state.request_close();
                tracing::info!("close requested");
            }
            WindowEvent::RedrawRequested => {
                state.apply_all(input);

                let viewport = state.viewport;
                if (viewport.width, viewport.height) != (gpu.width(), gpu.height()) {
                    gpu.resize(viewport.width, viewport.height);
                }

                let transforms = state.frame_transforms();
                tracing::trace!(
                    yaw = state.orbit.yaw,
                    pitch = state.orbit.pitch,
                    scale = transforms.scale,
                    "frame"
                );

                match pass.draw_frame(gpu, mesh, &transforms, &state.scene, *clear_color) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        tracing::debug!("surface lost, reconfiguring");
                        gpu.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("surface out of memory");
                        self.fail(event_loop, ViewerError::Render(wgpu::SurfaceError::OutOfMemory));
                        return;
                    }
                    Err(err) => tracing::warn!(%err, "skipping frame"),
                }

                window.request_redraw();
            }
            _ => {}
        }

        if state.loop_state() == LoopState::Terminated {
            self.phase = Phase::Stopped;
            event_loop.exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn state() -> ViewerState {
        let bounds = BoundingBox::from_positions([Vec3::new(-1.0, -2.0, 0.0), Vec3::new(3.0, 4.0, 5.0)]);
        ViewerState::new(bounds, ViewportState::new(1000, 800), SceneConstants::default())
    }

    #[test]
    fn drag_events_rotate_in_order() {
        let mut state = state();
        let mut input = InputQueue::new();
        input.push(ViewerEvent::PointerPress { x: 100.0, y: 100.0 });
        input.push(ViewerEvent::PointerMove { x: 110.0, y: 100.0 });
        input.push(ViewerEvent::PointerRelease);
        input.push(ViewerEvent::PointerMove { x: 500.0, y: 500.0 });

        state.apply_all(&mut input);

        assert!(input.is_empty());
        assert!(!state.orbit.is_dragging());
        assert!((state.orbit.yaw + 3.0).abs() < 1e-5);
        assert_eq!(state.orbit.pitch, 0.0);
    }

    #[test]
    fn resize_event_updates_viewport() {
        let mut state = state();
        state.apply(ViewerEvent::Resize { width: 1600, height: 400 });
        assert_eq!((state.viewport.width, state.viewport.height), (1600, 400));

        state.apply(ViewerEvent::Resize { width: 0, height: 0 });
        assert_eq!((state.viewport.width, state.viewport.height), (1600, 400));
    }

    #[test]
    fn close_is_terminal() {
        let mut state = state();
        assert_eq!(state.loop_state(), LoopState::Running);
        state.request_close();
        state.apply(ViewerEvent::PointerPress { x: 0.0, y: 0.0 });
        assert_eq!(state.loop_state(), LoopState::Terminated);
    }
}
