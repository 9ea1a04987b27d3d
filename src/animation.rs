//! Frame loop: clock, uniform refresh, grid rebuilds and draw submission.
//!
//! The loop has two phases. It starts in `Initializing` and moves to `Running`
//! once the point sprite has loaded and the first grid is attached; there is
//! no way back. Each [`AnimationLoop::step`] runs one whole frame before the
//! next can be scheduled.

use std::future::Future;

use glam::{Mat4, Vec3};
use log::{debug, info, warn};

use crate::error::Result;
use crate::field::{displace_all, GridBuilder, PointInstance, PointMesh, Scene};
use crate::params::{Rgb, UniformState, Uniforms};
use crate::sprite::SpriteImage;
use crate::tuning::TuningEffect;

/// Monotonic animation time advanced once per frame.
///
/// Accumulates in f64 and hands the shading stage an f32, the same split as
/// a script clock feeding a float uniform. Precision of the f32 value still
/// degrades over very long runs.
#[derive(Debug, Clone, Default)]
pub struct AnimationClock {
    time: f64,
    frame: u64,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by `time_inc` and return the new time
    pub fn advance(&mut self, time_inc: f32) -> f32 {
        self.time += time_inc as f64;
        self.frame += 1;
        self.time as f32
    }

    pub fn time(&self) -> f32 {
        self.time as f32
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Camera collaborator driven once per frame
pub trait CameraControls {
    /// Apply interactive input accumulated since the last frame
    fn update(&mut self);

    /// Point the camera at `target`
    fn look_at(&mut self, target: Vec3);

    /// Viewport aspect changed
    fn set_aspect(&mut self, aspect: f32);

    fn view_proj(&self) -> Mat4;
}

/// Everything the draw stage needs for one frame
pub struct Frame<'a> {
    pub mesh: &'a PointMesh,
    pub instances: &'a [PointInstance],
    pub view_proj: Mat4,
    pub background: Rgb,
    pub uniforms: &'a Uniforms,
}

/// Draw-submission collaborator
pub trait FrameSink {
    fn submit_frame(&mut self, frame: &Frame<'_>) -> Result<()>;

    fn resize(&mut self, width: u32, height: u32);
}

/// Lifecycle phase of the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Initializing,
    Running,
}

/// Result of one call to [`AnimationLoop::step`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Still initializing, nothing was drawn
    NotStarted,
    /// Frame submitted
    Rendered,
    /// Submission failed, retried next frame
    Skipped,
}

/// The point field's frame loop
pub struct AnimationLoop<C: CameraControls> {
    phase: LoopPhase,
    state: UniformState,
    clock: AnimationClock,
    scene: Scene,
    camera: C,
    instances: Vec<PointInstance>,
}

impl<C: CameraControls> AnimationLoop<C> {
    pub fn new(state: UniformState, camera: C) -> Self {
        let scene = Scene::new(state.background());
        Self {
            phase: LoopPhase::Initializing,
            state,
            clock: AnimationClock::new(),
            scene,
            camera,
            instances: Vec::new(),
        }
    }

    /// Await the sprite, build the first grid and enter `Running`.
    ///
    /// On failure the loop stays in `Initializing` and the error is returned;
    /// it never runs without a sprite.
    pub async fn initialize<F>(&mut self, sprite: F) -> Result<SpriteImage>
    where
        F: Future<Output = Result<SpriteImage>>,
    {
        let sprite = sprite.await?;
        self.start();
        Ok(sprite)
    }

    /// Enter `Running` with a sprite that is already loaded
    pub fn start(&mut self) {
        if self.phase == LoopPhase::Running {
            return;
        }

        self.state.set_time(self.clock.time());
        self.rebuild(self.state.grid_cells());
        self.phase = LoopPhase::Running;
        info!(
            "Animation running with {}x{} grid",
            self.state.grid_cells(),
            self.state.grid_cells()
        );
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn state(&self) -> &UniformState {
        &self.state
    }

    /// Setter surface for external tuning between frames
    pub fn state_mut(&mut self) -> &mut UniformState {
        &mut self.state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    /// Queue a grid rebuild for the start of the next frame.
    ///
    /// The state's `gridSize` is the only record of the requested size, so
    /// requests and direct edits share last-write-wins. Returns the size of
    /// an unbuilt earlier request this one supersedes; that buffer is never
    /// built.
    pub fn request_grid_size(&mut self, size: usize) -> Option<usize> {
        let previous = self.state.grid_cells();
        self.state.set_grid_cells(size);
        let current = self.state.grid_cells();

        let unbuilt = self.scene.needs_rebuild(previous);
        let superseded = (unbuilt && previous != current).then_some(previous);
        if let Some(previous) = superseded {
            debug!("Grid size {} superseded by {}", previous, current);
        }
        superseded
    }

    /// React to a tuning panel edit
    pub fn apply_effect(&mut self, effect: TuningEffect) {
        match effect {
            TuningEffect::RebuildGrid(size) => {
                self.request_grid_size(size);
            }
            TuningEffect::UpdateBackground(color) => {
                self.state.set_background(color);
                self.scene.set_background(color);
            }
        }
    }

    /// Window resize hook; zero-sized viewports are ignored
    pub fn resize<S: FrameSink>(&mut self, width: u32, height: u32, sink: &mut S) {
        if width == 0 || height == 0 {
            return;
        }
        self.camera.set_aspect(width as f32 / height as f32);
        sink.resize(width, height);
    }

    fn rebuild(&mut self, size: usize) {
        // Old mesh is detached before the new buffer is attached
        if let Some(released) = self.scene.attach(GridBuilder::build(size)) {
            debug!(
                "Disposed grid generation {} ({}x{})",
                released.generation(),
                released.grid_size(),
                released.grid_size()
            );
        }
    }

    /// Run one frame: advance time, apply pending rebuilds, refresh the
    /// uniform snapshot, displace points, update the camera and submit.
    pub fn step<S: FrameSink>(&mut self, sink: &mut S) -> FrameOutcome {
        if self.phase != LoopPhase::Running {
            return FrameOutcome::NotStarted;
        }

        let time = self.clock.advance(self.state.time_inc());
        self.state.set_time(time);

        let cells = self.state.grid_cells();
        if self.scene.needs_rebuild(cells) {
            self.rebuild(cells);
        }

        let uniforms = self.state.snapshot();
        let Some(mesh) = self.scene.mesh() else {
            return FrameOutcome::Skipped;
        };
        displace_all(mesh.buffer(), &uniforms, &mut self.instances);

        self.camera.update();
        self.camera.look_at(Vec3::ZERO);

        let frame = Frame {
            mesh,
            instances: &self.instances,
            view_proj: self.camera.view_proj(),
            background: self.scene.background(),
            uniforms: &uniforms,
        };

        match sink.submit_frame(&frame) {
            Ok(()) => FrameOutcome::Rendered,
            Err(e) => {
                warn!("Skipped frame {}: {}", self.clock.frame(), e);
                FrameOutcome::Skipped
            }
        }
    }

    /// Release the mesh on shutdown
    pub fn teardown(&mut self) -> Option<PointMesh> {
        self.instances.clear();
        self.scene.release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::params::{ParamKey, MAX_GRID_CELLS};
    use crate::sprite::{load_sprite, SpriteSource};

    #[derive(Default)]
    struct FakeCamera {
        updates: usize,
        target: Option<Vec3>,
        aspect: f32,
    }

    impl CameraControls for FakeCamera {
        fn update(&mut self) {
            self.updates += 1;
        }

        fn look_at(&mut self, target: Vec3) {
            self.target = Some(target);
        }

        fn set_aspect(&mut self, aspect: f32) {
            self.aspect = aspect;
        }

        fn view_proj(&self) -> Mat4 {
            Mat4::IDENTITY
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        generations: Vec<u64>,
        grids: Vec<(usize, f32)>,
        instance_counts: Vec<usize>,
        times: Vec<f32>,
        fail_next: bool,
        size: (u32, u32),
    }

    impl FrameSink for RecordingSink {
        fn submit_frame(&mut self, frame: &Frame<'_>) -> Result<()> {
            if std::mem::take(&mut self.fail_next) {
                return Err(FieldError::Surface(wgpu::SurfaceError::Lost));
            }
            self.generations.push(frame.mesh.generation());
            self.grids
                .push((frame.mesh.grid_size(), frame.uniforms.grid_size));
            self.instance_counts.push(frame.instances.len());
            self.times.push(frame.uniforms.time);
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.size = (width, height);
        }
    }

    fn small_state(grid: f32) -> UniformState {
        let mut state = UniformState::default();
        state.set(ParamKey::GridSize, grid).unwrap();
        state
    }

    fn running_loop(grid: f32) -> AnimationLoop<FakeCamera> {
        let mut animation = AnimationLoop::new(small_state(grid), FakeCamera::default());
        pollster::block_on(animation.initialize(load_sprite(&SpriteSource::Builtin))).unwrap();
        animation
    }

    #[test]
    fn test_clock_advances_monotonically() {
        let mut clock = AnimationClock::new();
        assert_eq!(clock.advance(0.3), 0.3);
        assert!(clock.advance(0.3) > 0.3);
        assert_eq!(clock.frame(), 2);
    }

    #[test]
    fn test_no_frames_before_initialization() {
        let mut animation = AnimationLoop::new(small_state(4.0), FakeCamera::default());
        let mut sink = RecordingSink::default();

        assert_eq!(animation.phase(), LoopPhase::Initializing);
        assert_eq!(animation.step(&mut sink), FrameOutcome::NotStarted);
        assert!(sink.generations.is_empty());
    }

    #[test]
    fn test_failed_sprite_load_stays_initializing() {
        let mut animation = AnimationLoop::new(small_state(4.0), FakeCamera::default());
        let missing = SpriteSource::File("/nonexistent/dot.png".into());

        let result = pollster::block_on(animation.initialize(load_sprite(&missing)));

        assert!(matches!(result, Err(FieldError::ResourceLoad { .. })));
        assert_eq!(animation.phase(), LoopPhase::Initializing);
        assert!(animation.scene().mesh().is_none());
    }

    #[test]
    fn test_initialization_builds_grid() {
        let animation = running_loop(6.0);
        assert_eq!(animation.phase(), LoopPhase::Running);
        assert_eq!(animation.scene().mesh().unwrap().grid_size(), 6);
    }

    #[test]
    fn test_step_advances_time_and_drives_camera() {
        let mut animation = running_loop(4.0);
        let mut sink = RecordingSink::default();

        assert_eq!(animation.step(&mut sink), FrameOutcome::Rendered);
        assert_eq!(animation.step(&mut sink), FrameOutcome::Rendered);

        assert_eq!(sink.instance_counts, vec![16, 16]);
        assert!(sink.times[1] > sink.times[0]);
        assert_eq!(animation.camera_mut().updates, 2);
        assert_eq!(animation.camera_mut().target, Some(Vec3::ZERO));
    }

    #[test]
    fn test_time_inc_edit_applies_next_frame() {
        let mut animation = running_loop(2.0);
        let mut sink = RecordingSink::default();
        animation.state_mut().set(ParamKey::TimeInc, 2.0).unwrap();

        animation.step(&mut sink);
        assert_eq!(sink.times, vec![2.0]);
    }

    #[test]
    fn test_rebuild_sequence_leaves_single_buffer() {
        let mut animation = running_loop(4.0);
        let mut sink = RecordingSink::default();

        for size in [10, 50, 3, 200, 10] {
            animation.request_grid_size(size);
            animation.step(&mut sink);
        }

        let mesh = animation.scene().mesh().unwrap();
        assert_eq!(mesh.grid_size(), 10);
        assert_eq!(mesh.buffer().len(), 100);
        assert_eq!(*sink.instance_counts.last().unwrap(), 100);
        // Initial grid plus five rebuilds, one live generation at a time
        assert_eq!(mesh.generation(), 6);
        assert_eq!(sink.generations, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_superseded_requests_are_never_built() {
        let mut animation = running_loop(4.0);
        let mut sink = RecordingSink::default();

        assert_eq!(animation.request_grid_size(10), None);
        assert_eq!(animation.request_grid_size(50), Some(10));
        assert_eq!(animation.request_grid_size(3), Some(50));
        animation.step(&mut sink);

        let mesh = animation.scene().mesh().unwrap();
        assert_eq!(mesh.grid_size(), 3);
        assert_eq!(mesh.generation(), 2);
        assert_eq!(sink.instance_counts, vec![9]);
    }

    #[test]
    fn test_direct_grid_edit_triggers_rebuild() {
        let mut animation = running_loop(4.0);
        let mut sink = RecordingSink::default();

        animation.state_mut().set(ParamKey::GridSize, 7.0).unwrap();
        assert!(animation.scene().needs_rebuild(7));
        animation.step(&mut sink);

        assert_eq!(animation.scene().mesh().unwrap().grid_size(), 7);
        assert_eq!(sink.instance_counts, vec![49]);
    }

    #[test]
    fn test_direct_edit_after_request_wins() {
        let mut animation = running_loop(4.0);
        let mut sink = RecordingSink::default();

        animation.request_grid_size(10);
        animation.state_mut().set(ParamKey::GridSize, 7.0).unwrap();
        animation.step(&mut sink);

        // The 10x10 request was superseded before any frame could use it
        assert_eq!(sink.grids, vec![(7, 7.0)]);
        assert_eq!(animation.scene().mesh().unwrap().generation(), 2);
    }

    #[test]
    fn test_request_after_direct_edit_wins() {
        let mut animation = running_loop(4.0);
        let mut sink = RecordingSink::default();

        animation.state_mut().set(ParamKey::GridSize, 7.0).unwrap();
        assert_eq!(animation.request_grid_size(5), Some(7));
        animation.step(&mut sink);

        assert_eq!(sink.grids, vec![(5, 5.0)]);
    }

    #[test]
    fn test_out_of_range_grid_sizes_do_not_crash() {
        let mut animation = running_loop(4.0);
        let mut sink = RecordingSink::default();

        for value in [0.0, -3.0, 5.0e9] {
            animation.state_mut().set(ParamKey::GridSize, value).unwrap();
            assert_eq!(animation.step(&mut sink), FrameOutcome::Rendered);
        }
        animation.request_grid_size(0);
        assert_eq!(animation.step(&mut sink), FrameOutcome::Rendered);

        assert_eq!(
            sink.grids,
            vec![
                (1, 1.0),
                (1, 1.0),
                (MAX_GRID_CELLS, MAX_GRID_CELLS as f32),
                (1, 1.0),
            ]
        );
        assert!(animation.scene().mesh().unwrap().buffer().len() >= 1);
    }

    #[test]
    fn test_request_updates_grid_uniform() {
        let mut animation = running_loop(4.0);
        animation.request_grid_size(12);
        assert_eq!(animation.state().get(ParamKey::GridSize), 12.0);
    }

    #[test]
    fn test_failed_submit_skips_and_recovers() {
        let mut animation = running_loop(2.0);
        let mut sink = RecordingSink {
            fail_next: true,
            ..RecordingSink::default()
        };

        assert_eq!(animation.step(&mut sink), FrameOutcome::Skipped);
        assert_eq!(animation.step(&mut sink), FrameOutcome::Rendered);
        assert_eq!(animation.phase(), LoopPhase::Running);
    }

    #[test]
    fn test_background_effect_updates_scene() {
        let mut animation = running_loop(2.0);
        let black = Rgb::from_hex(0x000000);

        animation.apply_effect(TuningEffect::UpdateBackground(black));

        assert_eq!(animation.scene().background(), black);
        assert_eq!(animation.state().background(), black);
    }

    #[test]
    fn test_resize_ignores_zero_and_forwards() {
        let mut animation = running_loop(2.0);
        let mut sink = RecordingSink::default();

        animation.resize(0, 600, &mut sink);
        assert_eq!(sink.size, (0, 0));

        animation.resize(800, 400, &mut sink);
        assert_eq!(sink.size, (800, 400));
        assert_eq!(animation.camera_mut().aspect, 2.0);
    }

    #[test]
    fn test_teardown_releases_mesh() {
        let mut animation = running_loop(3.0);
        let released = animation.teardown().unwrap();

        assert_eq!(released.grid_size(), 3);
        assert!(animation.scene().mesh().is_none());
    }
}
