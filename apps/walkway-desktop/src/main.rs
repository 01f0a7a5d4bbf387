mod keys;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use walkway_input::{Intent, KeyEvent as InputEvent};
use walkway_kernel::Scene;
use walkway_motion::{Controller, FrameReport, MovementConfig, MovementLoop, PointerLockController};
use walkway_render_wgpu::{PerspectiveCamera, WgpuRenderer};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "walkway-desktop", about = "First-person walk through the fogged walkway")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON file overriding movement tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial window width in pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "720")]
    height: u32,
}

/// Everything that survives GPU loss: scene, player and clock.
struct AppState {
    scene: Scene,
    controller: PointerLockController,
    intent: Intent,
    movement: MovementLoop,
    camera: PerspectiveCamera,
    started: Instant,
    last_report: FrameReport,
    show_hud: bool,
}

impl AppState {
    fn new(config: MovementConfig, width: u32, height: u32) -> Result<Self> {
        let scene = Scene::walkway().context("building walkway scene")?;
        let controller = PointerLockController::default().with_sensitivity(config.look_sensitivity);
        Ok(Self {
            scene,
            controller,
            intent: Intent::new(),
            movement: MovementLoop::new(config),
            camera: PerspectiveCamera::with_viewport(width, height),
            started: Instant::now(),
            last_report: FrameReport::default(),
            show_hud: true,
        })
    }

    /// Animate the scene, then run one movement frame against it.
    fn update(&mut self) {
        self.scene.advance(self.started.elapsed().as_secs_f32());
        self.last_report = self
            .movement
            .tick(&mut self.intent, &mut self.controller, &self.scene);
    }

    fn handle_key(&mut self, code: KeyCode, pressed: bool) {
        if let Some(key) = keys::movement_key(code) {
            // OS key repeat re-delivers presses; each one re-asserts the flag.
            let event = if pressed {
                InputEvent::Down(key)
            } else {
                InputEvent::Up(key)
            };
            self.intent.apply(event);
            return;
        }

        if pressed && code == KeyCode::F1 {
            self.show_hud = !self.show_hud;
        }
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let pos = self.controller.position;
        let intent = &self.intent;
        let flag = |on: bool, name: &'static str| if on { name } else { "-" };

        egui::Window::new("Walkway")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                ui.label(format!("t = {:.1}s", self.scene.elapsed()));
                ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", pos.x, pos.y, pos.z));
                ui.label(format!(
                    "Look: yaw {:.0}°  pitch {:.0}°",
                    self.controller.yaw.to_degrees(),
                    self.controller.pitch.to_degrees()
                ));
                ui.separator();
                ui.label(format!(
                    "Intent: {} {} {} {}  moving={}",
                    flag(intent.forward, "F"),
                    flag(intent.backward, "B"),
                    flag(intent.left, "L"),
                    flag(intent.right, "R"),
                    intent.moving
                ));
                if self.last_report.blocked.is_empty() {
                    ui.label("Blocked: none");
                } else {
                    let headings: Vec<String> = self
                        .last_report
                        .blocked
                        .iter()
                        .map(ToString::to_string)
                        .collect();
                    ui.colored_label(
                        egui::Color32::LIGHT_RED,
                        format!("Blocked: {}", headings.join(", ")),
                    );
                }
                ui.separator();
                ui.small(if self.controller.is_locked() {
                    "Esc: release pointer | WASD/Arrows: move | F1: HUD"
                } else {
                    "Click: capture pointer | WASD/Arrows: move | F1: HUD"
                });
            });
    }
}

/// GPU and window resources, created on `resumed`.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        egui_ctx: &EguiContext,
        size: PhysicalSize<u32>,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Walkway")
            .with_inner_size(size);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("creating window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("creating surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no GPU adapter can present to this window"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("walkway_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("creating device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no texture formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Grab and hide the cursor. Falls back to confinement where the
    /// platform cannot lock.
    fn capture_pointer(&self) -> bool {
        let grabbed = self
            .window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => {
                self.window.set_cursor_visible(false);
                true
            }
            Err(e) => {
                tracing::warn!("pointer capture unavailable: {e}");
                false
            }
        }
    }

    fn release_pointer(&self) {
        if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!("failed to release pointer: {e}");
        }
        self.window.set_cursor_visible(true);
    }

    fn render(&mut self, egui_ctx: &EguiContext, state: &AppState) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let target = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let view = state
            .camera
            .view(state.controller.position(), state.controller.direction());
        self.renderer.render(
            &self.device,
            &self.queue,
            &target,
            &state.camera,
            &view,
            &state.scene,
        );

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
    }
}

struct GpuApp {
    state: AppState,
    window_size: PhysicalSize<u32>,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    startup_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(state: AppState, window_size: PhysicalSize<u32>) -> Self {
        Self {
            state,
            window_size,
            gpu: None,
            egui_ctx: EguiContext::default(),
            startup_error: None,
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::new(event_loop, &self.egui_ctx, self.window_size) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.camera.resize(size.width, size.height);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("startup failed: {e:#}");
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size.width, new_size.height);
                self.state.camera.resize(new_size.width, new_size.height);
            }
            WindowEvent::Focused(false) => {
                // Key-ups are lost while unfocused; drop whatever was held.
                self.state.intent.reset();
                self.state.controller.unlock();
                gpu.release_pointer();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                if pressed && key == KeyCode::Escape {
                    self.state.controller.unlock();
                    gpu.release_pointer();
                    return;
                }
                self.state.handle_key(key, pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                if !self.state.controller.is_locked() && gpu.capture_pointer() {
                    self.state.controller.lock();
                }
            }
            WindowEvent::RedrawRequested => {
                self.state.update();
                gpu.render(&self.egui_ctx, &self.state);
                gpu.window.request_redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.controller.look(delta.0 as f32, delta.1 as f32);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("walkway-desktop starting");

    let config = match &cli.config {
        Some(path) => MovementConfig::from_json_file(path)
            .with_context(|| format!("loading movement config {}", path.display()))?,
        None => MovementConfig::default(),
    };
    let state = AppState::new(config, cli.width, cli.height)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    match app.startup_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
