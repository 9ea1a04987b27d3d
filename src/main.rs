//! Wavefield - an animated point-cloud wave field
//!
//! A square lattice of sprites rides two travelling waves and a drifting
//! simplex noise surface, fading out toward the edges.

use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use glam::Vec2;
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, ModifiersState, PhysicalKey},
    window::{Window, WindowId},
};

use wavefield::animation::AnimationLoop;
use wavefield::camera::OrbitCamera;
use wavefield::cli::Args;
use wavefield::error::{FieldError, Result};
use wavefield::field::GridBuilder;
use wavefield::heightmap::export_heightmap;
use wavefield::params::{RenderConfig, UniformState};
use wavefield::rendering::RenderSystem;
use wavefield::sprite::{load_sprite, SpriteSource};
use wavefield::tuning::TuningPanel;

/// Main application state
struct App {
    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Animation and tuning
    animation: AnimationLoop<OrbitCamera>,
    panel: TuningPanel,

    // Configuration
    render_config: RenderConfig,
    sprite_source: SpriteSource,

    // Input tracking
    modifiers: ModifiersState,
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl App {
    fn new(state: UniformState, render_config: RenderConfig, sprite_source: SpriteSource) -> Self {
        let camera = OrbitCamera::from_config(&render_config);

        Self {
            window: None,
            render_system: None,
            animation: AnimationLoop::new(state, camera),
            panel: TuningPanel::new(),
            render_config,
            sprite_source,
            modifiers: ModifiersState::empty(),
            dragging: false,
            last_cursor: None,
        }
    }

    /// Window, sprite and GPU setup; the loop starts running on success
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("Wavefield")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.render_config.window_width,
                self.render_config.window_height,
            ));

        let window = event_loop
            .create_window(window_attributes)
            .map_err(|e| FieldError::Gpu(format!("Failed to create window: {}", e)))?;
        let window = Arc::new(window);

        let sprite =
            pollster::block_on(self.animation.initialize(load_sprite(&self.sprite_source)))?;
        let mut render_system =
            pollster::block_on(RenderSystem::new(Arc::clone(&window), &sprite))?;

        let size = window.inner_size();
        self.animation
            .resize(size.width, size.height, &mut render_system);

        info!("Tab/Shift+Tab select, Up/Down adjust, B background, Esc quit");
        info!("Selected: {}", self.panel.selected().key);

        self.window = Some(window);
        self.render_system = Some(render_system);
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mesh) = self.animation.teardown() {
            info!("Released grid generation {}", mesh.generation());
        }
        if let Some(render_system) = self.render_system.as_mut() {
            render_system.release_instances();
        }
        event_loop.exit();
    }

    fn handle_key(&mut self, code: KeyCode, event_loop: &ActiveEventLoop) {
        match code {
            KeyCode::Escape => self.shutdown(event_loop),
            KeyCode::Tab => {
                if self.modifiers.shift_key() {
                    self.panel.select_prev();
                } else {
                    self.panel.select_next();
                }
                let control = self.panel.selected();
                info!("Selected: [{}] {}", control.folder, control.key);
            }
            KeyCode::ArrowUp | KeyCode::ArrowDown => {
                let steps = if code == KeyCode::ArrowUp { 1 } else { -1 };
                match self.panel.nudge(self.animation.state_mut(), steps) {
                    Ok(Some(effect)) => self.animation.apply_effect(effect),
                    Ok(None) => {}
                    Err(e) => error!("Edit rejected: {}", e),
                }
            }
            KeyCode::KeyB => {
                let effect = self.panel.cycle_background(self.animation.state_mut());
                self.animation.apply_effect(effect);
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        if let Err(e) = self.init(event_loop) {
            error!("Initialization failed: {}", e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::ModifiersChanged(modifiers) => self.modifiers = modifiers.state(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        ..
                    },
                ..
            } => self.handle_key(code, event_loop),
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.dragging = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (true, Some(last)) = (self.dragging, self.last_cursor) {
                    let delta =
                        Vec2::new((position.x - last.x) as f32, (position.y - last.y) as f32);
                    self.animation.camera_mut().rotate(delta);
                }
                self.last_cursor = Some(position);
            }
            WindowEvent::MouseWheel {
                delta: MouseScrollDelta::LineDelta(_, lines),
                ..
            } => self.animation.camera_mut().zoom(lines),
            WindowEvent::Resized(size) => {
                if let Some(render_system) = self.render_system.as_mut() {
                    self.animation
                        .resize(size.width, size.height, render_system);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(render_system) = self.render_system.as_mut() {
                    self.animation.step(render_system);
                }
            }
            _ => {}
        }
    }
}

/// Headless mode: evaluate one frame and write its heightmap
fn export(args: &Args, path: &Path) -> Result<()> {
    let mut state = args.uniform_state()?;
    if !args.heightmap_time.is_finite() {
        return Err(FieldError::InvalidConfiguration {
            key: "time",
            value: args.heightmap_time,
        });
    }
    state.set_time(args.heightmap_time);
    let buffer = GridBuilder::build(state.grid_cells());
    export_heightmap(path, &buffer, &state.snapshot())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Some(path) = &args.heightmap {
        if let Err(e) = export(&args, path) {
            error!("Heightmap export failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let state = match args.uniform_state() {
        Ok(state) => state,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Wavefield - {}x{} points", state.grid_cells(), state.grid_cells());

    let mut app = App::new(state, args.render_config(), args.sprite_source());
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = event_loop.run_app(&mut app) {
        error!("Event loop error: {}", e);
    }
}
