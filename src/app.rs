use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::camera::OrbitCamera;
use crate::config::{
    CLEAR_COLOR, COARSE_STEP_MULTIPLIER, COLOR_PRESETS, SCENERY_MARKER_SIZE, WINDOW_HEIGHT,
    WINDOW_WIDTH,
};
use crate::galaxy::{
    GalaxyError, GalaxyGenerator, GenerationParameters, ParameterChange, ParameterKey,
    PointField,
};
use crate::gpu::{
    begin_frame, CameraBuffer, CameraUniform, GpuContext, GpuError, GpuPointTarget, PointBlend,
    PointCloudBuffers, PointCloudSlot, PointPipeline,
};
use crate::scenery::Scenery;

/// Everything that only exists once a window and device are up
struct GpuState {
    context: GpuContext,
    galaxy_pipeline: PointPipeline,
    scenery_pipeline: PointPipeline,
    galaxy_camera: CameraBuffer,
    scenery_camera: CameraBuffer,
    galaxy_bind_group: wgpu::BindGroup,
    scenery_bind_group: wgpu::BindGroup,
    galaxy_slot: PointCloudSlot,
    scenery: PointCloudBuffers,
}

impl GpuState {
    async fn new(window: Arc<Window>, scenery: &Scenery) -> Result<Self, GpuError> {
        log::info!("Creating GPU context...");
        let context = GpuContext::new(window).await?;

        let scenery_buffers = PointCloudBuffers::new(
            &context.device,
            "scenery",
            &scenery.markers.positions,
            &scenery.markers.colors,
        );

        log::info!("Creating render pipelines...");
        let galaxy_pipeline = PointPipeline::new(&context.device, context.format(), PointBlend::Additive);
        let scenery_pipeline = PointPipeline::new(&context.device, context.format(), PointBlend::Alpha);
        let galaxy_camera = CameraBuffer::new(&context.device, "galaxy-camera-buffer");
        let scenery_camera = CameraBuffer::new(&context.device, "scenery-camera-buffer");
        let galaxy_bind_group = galaxy_pipeline.create_bind_group(&context.device, &galaxy_camera.buffer);
        let scenery_bind_group =
            scenery_pipeline.create_bind_group(&context.device, &scenery_camera.buffer);

        Ok(Self {
            context,
            galaxy_pipeline,
            scenery_pipeline,
            galaxy_camera,
            scenery_camera,
            galaxy_bind_group,
            scenery_bind_group,
            galaxy_slot: PointCloudSlot::default(),
            scenery: scenery_buffers,
        })
    }
}

/// Keyboard parameter panel state
struct PanelState {
    selected: ParameterKey,
    shift_held: bool,
    preset: usize,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            selected: ParameterKey::Count,
            shift_held: false,
            preset: 0,
        }
    }
}

/// Left-button orbit drag
#[derive(Default)]
struct DragState {
    active: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

/// Application state
pub struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    generator: GalaxyGenerator<StdRng>,
    seed: Option<u64>,
    camera: OrbitCamera,
    panel: PanelState,
    drag: DragState,
    clock: Instant,
    fps_counter: FpsCounter,
}

impl App {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            window: None,
            gpu: None,
            generator: GalaxyGenerator::new(GenerationParameters::default(), make_rng(seed)),
            seed,
            camera: OrbitCamera::default(),
            panel: PanelState::default(),
            drag: DragState::default(),
            clock: Instant::now(),
            fps_counter: FpsCounter::new(),
        }
    }

    fn render(&mut self) {
        let Some(state) = self.gpu.as_mut() else {
            return;
        };
        let context = &state.context;
        let galaxy_slot = &mut state.galaxy_slot;

        // Wave animation reads the clock once per frame
        let elapsed = self.clock.elapsed().as_secs_f64();
        self.generator
            .tick(elapsed, &mut galaxy_slot.target(&context.device, &context.queue));

        self.camera.update();
        let height = context.config.height;
        state.galaxy_camera.write(
            &context.queue,
            &CameraUniform::new(&self.camera, galaxy_slot.point_size(), height),
        );
        state.scenery_camera.write(
            &context.queue,
            &CameraUniform::new(&self.camera, SCENERY_MARKER_SIZE, height),
        );

        // Get surface texture
        let output = match context.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Reconfigure surface
                context.surface.configure(&context.device, &context.config);
                return;
            }
            Err(e) => {
                log::error!("Surface error: {:?}", e);
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame-encoder"),
            });

        {
            let mut pass = begin_frame(&mut encoder, &view, CLEAR_COLOR);
            // Opaque scenery first, then the additive galaxy on top
            state
                .scenery_pipeline
                .draw(&mut pass, &state.scenery_bind_group, &state.scenery);
            if let Some(galaxy) = galaxy_slot.buffers() {
                state
                    .galaxy_pipeline
                    .draw(&mut pass, &state.galaxy_bind_group, galaxy);
            }
        }

        context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        // Update and display FPS
        if let Some(fps) = self.fps_counter.tick() {
            self.update_title(Some(fps));
        }
    }

    fn update_title(&self, fps: Option<f64>) {
        let Some(window) = &self.window else {
            return;
        };
        window.set_title(&window_title(
            fps,
            self.generator.field(),
            self.generator.params(),
            self.panel.selected,
        ));
    }

    fn handle_key(&mut self, key_code: KeyCode) {
        match key_code {
            // Select parameter
            KeyCode::Tab => {
                self.panel.selected = if self.panel.shift_held {
                    self.panel.selected.previous()
                } else {
                    self.panel.selected.next()
                };
                log::info!("Selected {}", self.panel.selected.name());
            }

            // Adjust selected parameter
            KeyCode::Equal | KeyCode::BracketRight | KeyCode::NumpadAdd => self.nudge(1.0),
            KeyCode::Minus | KeyCode::BracketLeft | KeyCode::NumpadSubtract => self.nudge(-1.0),

            // Cycle colour presets
            KeyCode::KeyC => {
                self.panel.preset = (self.panel.preset + 1) % COLOR_PRESETS.len();
                let (inside, outside) = COLOR_PRESETS[self.panel.preset];
                self.with_target(|generator, target| {
                    generator.apply_palette(inside, outside, target).map(|_| ())
                });
            }

            // New random galaxy with the same parameters
            KeyCode::KeyG => {
                self.generator.reseed(StdRng::from_entropy());
                self.with_target(|generator, target| generator.regenerate(target).map(|_| ()));
            }

            // Reset parameters, seed and view
            KeyCode::KeyR => {
                self.generator.reseed(make_rng(self.seed));
                self.camera = self.with_aspect(OrbitCamera::default());
                self.panel.preset = 0;
                self.with_target(|generator, target| generator.reset(target));
                log::info!("Parameters and view reset");
            }

            _ => {}
        }
        self.update_title(None);
    }

    /// Step the selected parameter up or down one slider step
    fn nudge(&mut self, direction: f64) {
        let key = self.panel.selected;
        if key.is_color() {
            // Colours step through the preset list for that end of the gradient
            let len = COLOR_PRESETS.len();
            self.panel.preset = if direction > 0.0 {
                (self.panel.preset + 1) % len
            } else {
                (self.panel.preset + len - 1) % len
            };
            let (inside, outside) = COLOR_PRESETS[self.panel.preset];
            let hex = if key == ParameterKey::InsideColor { inside } else { outside };
            self.with_target(|generator, target| {
                generator.apply_color(key, hex, target).map(|_| ())
            });
            return;
        }

        let (Some(range), Some(current)) = (key.range(), self.generator.params().get(key)) else {
            return;
        };
        let multiplier = if self.panel.shift_held {
            COARSE_STEP_MULTIPLIER
        } else {
            1.0
        };
        let value = current + direction * range.step * multiplier;
        let change = self.with_target(|generator, target| generator.apply(key, value, target));
        if let (Some(change), Some(updated)) = (change, self.generator.params().get(key)) {
            match change {
                ParameterChange::Regenerate => log::info!("{} = {}", key.name(), updated),
                ParameterChange::AnimationOnly => {
                    log::info!("{} = {} (animation only)", key.name(), updated)
                }
            }
        }
    }

    /// Run a generator operation against the GPU slot, logging rejected edits
    fn with_target<T, F>(&mut self, op: F) -> Option<T>
    where
        F: FnOnce(&mut GalaxyGenerator<StdRng>, &mut GpuPointTarget<'_>) -> Result<T, GalaxyError>,
    {
        let state = self.gpu.as_mut()?;
        let mut target = state
            .galaxy_slot
            .target(&state.context.device, &state.context.queue);
        match op(&mut self.generator, &mut target) {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("Parameter change rejected: {}", e);
                None
            }
        }
    }

    fn with_aspect(&self, mut camera: OrbitCamera) -> OrbitCamera {
        if let Some(state) = &self.gpu {
            camera.set_aspect(state.context.config.width, state.context.config.height);
        }
        camera
    }

    fn handle_cursor(&mut self, position: PhysicalPosition<f64>) {
        if self.drag.active {
            if let Some(last) = self.drag.last_cursor {
                self.camera
                    .rotate((position.x - last.x) as f32, (position.y - last.y) as f32);
            }
        }
        self.drag.last_cursor = Some(position);
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        log::info!("Initializing Galaxy Garden...");

        // Create window
        let window_attrs = Window::default_attributes()
            .with_title("Galaxy Garden - Initializing...")
            .with_inner_size(winit::dpi::LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        // Scenery is generated once from its own stream
        log::info!("Generating scenery...");
        let scenery = match Scenery::build(&mut make_rng(self.seed)) {
            Ok(scenery) => scenery,
            Err(e) => {
                log::error!("Scenery colours invalid: {}", e);
                event_loop.exit();
                return;
            }
        };
        log::debug!(
            "Scenery layout: {} trees, {} grass blades",
            scenery.trees.len(),
            scenery.grass.len()
        );

        // Initialize GPU
        let mut state = match pollster::block_on(GpuState::new(window.clone(), &scenery)) {
            Ok(state) => state,
            Err(e) => {
                log::error!("GPU initialization failed: {}", e);
                event_loop.exit();
                return;
            }
        };
        self.camera
            .set_aspect(state.context.config.width, state.context.config.height);

        log::info!("Generating galaxy...");
        let mut target = state
            .galaxy_slot
            .target(&state.context.device, &state.context.queue);
        if let Err(e) = self.generator.regenerate(&mut target) {
            log::error!("Initial galaxy generation failed: {}", e);
        }

        log::info!("Initialization complete!");
        log::info!("Controls:");
        log::info!("  Left drag: Orbit camera");
        log::info!("  Scroll: Zoom");
        log::info!("  Tab / Shift+Tab: Select parameter");
        log::info!("  +/- or ]/[: Adjust parameter (Shift for x10)");
        log::info!("  C: Cycle colour presets");
        log::info!("  G: New random galaxy");
        log::info!("  R: Reset parameters and view");
        log::info!("  Escape: Quit");

        self.window = Some(window);
        self.gpu = Some(state);
        self.clock = Instant::now();
        self.update_title(None);
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting...");
                event_loop.exit();
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.panel.shift_held = modifiers.state().shift_key();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() {
                    if let PhysicalKey::Code(key_code) = event.physical_key {
                        if key_code == KeyCode::Escape {
                            log::info!("Escape pressed, exiting...");
                            event_loop.exit();
                        } else {
                            self.handle_key(key_code);
                        }
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.drag.active = state == ElementState::Pressed;
            }
            WindowEvent::CursorMoved { position, .. } => self.handle_cursor(position),
            WindowEvent::CursorLeft { .. } => {
                self.drag.active = false;
                self.drag.last_cursor = None;
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => (p.y / 50.0) as f32,
                };
                self.camera.zoom(lines);
                log::debug!("Camera distance {:.2}", self.camera.distance());
            }
            WindowEvent::Resized(new_size) => {
                if let Some(state) = &mut self.gpu {
                    log::info!("Window resized to {}x{}", new_size.width, new_size.height);
                    state.context.resize(new_size);
                    self.camera.set_aspect(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                self.render();
                // Request another frame immediately
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Title line: FPS, live galaxy id and size, selected parameter
fn window_title(
    fps: Option<f64>,
    field: Option<&PointField>,
    params: &GenerationParameters,
    key: ParameterKey,
) -> String {
    let value = match key {
        ParameterKey::InsideColor => format!("{:?}", params.inside_color.to_array()),
        ParameterKey::OutsideColor => format!("{:?}", params.outside_color.to_array()),
        _ => params.get(key).map(|v| format!("{}", v)).unwrap_or_default(),
    };
    let galaxy = field
        .map(|f| format!("#{} ({} points)", f.generation(), f.len()))
        .unwrap_or_else(|| "none".to_string());
    let fps = fps.map(|f| format!("{:.0} FPS - ", f)).unwrap_or_default();
    format!(
        "Galaxy Garden - {}galaxy {} - {}: {}",
        fps,
        galaxy,
        key.name(),
        value
    )
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Simple FPS counter
struct FpsCounter {
    last_update: Instant,
    frame_count: u32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    /// Tick the counter, returns Some(fps) every second
    fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed.as_secs_f64() >= 1.0 {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.frame_count = 0;
            self.last_update = Instant::now();
            Some(fps)
        } else {
            None
        }
    }
}
