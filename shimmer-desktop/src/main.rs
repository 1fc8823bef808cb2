use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use shimmer::{problem, raster, Problem, Settings, Shimmer};

#[derive(Parser, Debug)]
#[command(name = "shimmer")]
#[command(about = "A full-screen animated Perlin noise background", long_about = None)]
struct Args {
    /// JSON settings file
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Window width in logical pixels, or image width for --snapshot
    #[arg(long, default_value_t = 1280)]
    width: u32,

    /// Window height in logical pixels, or image height for --snapshot
    #[arg(long, default_value_t = 800)]
    height: u32,

    /// Cover the whole screen
    #[arg(long)]
    fullscreen: bool,

    /// Render a single frame to a PNG file and exit
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Elapsed time of the --snapshot frame
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    time: f32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };

    if let Some(path) = &args.snapshot {
        save_snapshot(path, args.width, args.height, args.time, &settings)?;
        return Ok(());
    }

    let event_loop = EventLoop::new()?;
    let mut app = App::new(&args, settings);
    event_loop.run_app(&mut app)?;

    Ok(())
}

fn load_settings(path: &Path) -> Result<Settings, Problem> {
    log::info!("Reading settings from {}", path.display());

    let json = std::fs::read_to_string(path)?;
    Settings::from_json(&json)
}

fn save_snapshot(
    path: &Path,
    width: u32,
    height: u32,
    time: f32,
    settings: &Settings,
) -> Result<(), Problem> {
    problem::check_viewport(width, height)?;

    let img = raster::render_image(width, height, time, settings.mode);
    img.save(path)?;

    log::info!("📸 Saved {}x{} frame to {}", width, height, path.display());
    Ok(())
}

struct App {
    settings: Arc<Settings>,
    logical_size: winit::dpi::LogicalSize<u32>,
    fullscreen: bool,
    start: Instant,
    graphics: Option<Graphics>,
}

impl App {
    fn new(args: &Args, settings: Settings) -> Self {
        Self {
            settings: Arc::new(settings),
            logical_size: winit::dpi::LogicalSize::new(args.width, args.height),
            fullscreen: args.fullscreen,
            start: Instant::now(),
            graphics: None,
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }

        let mut window_attributes = Window::default_attributes()
            .with_title("Shimmer")
            .with_decorations(true)
            .with_resizable(true)
            .with_inner_size(self.logical_size);

        if self.fullscreen {
            window_attributes = window_attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        match pollster::block_on(Graphics::new(window, &self.settings)) {
            Ok(graphics) => {
                graphics.window.request_redraw();
                self.graphics = Some(graphics);
            }
            Err(err) => {
                log::error!("{}", err);
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(graphics) = &self.graphics {
            graphics.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(graphics) = self.graphics.as_mut() else {
            return;
        };

        if window_id != graphics.window.id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        state: ElementState::Released,
                        ..
                    },
                ..
            } => event_loop.exit(),

            WindowEvent::Resized(physical_size) => graphics.resize(physical_size),

            WindowEvent::RedrawRequested => {
                graphics.redraw(self.start.elapsed().as_secs_f64() * 1000.0);
            }

            _ => (),
        }
    }
}

struct Graphics {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    device: wgpu::Device,
    queue: wgpu::Queue,
    shimmer: Shimmer,
}

impl Graphics {
    async fn new(window: Arc<Window>, settings: &Arc<Settings>) -> Result<Self, Problem> {
        let wgpu_instance = wgpu::Instance::default();
        let surface = wgpu_instance.create_surface(Arc::clone(&window))?;
        let adapter = wgpu_instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await?;

        log::debug!("{:?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("shimmer:device"),
                required_features: wgpu::Features::empty(),
                // Make sure we use the texture resolution limits from the adapter, so we can support images the size of the swapchain.
                required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                    .using_resolution(adapter.limits()),
                ..Default::default()
            })
            .await?;

        let capabilities = surface.get_capabilities(&adapter);
        let swapchain_format = shimmer::render::preferred_surface_format(&capabilities.formats)
            .unwrap_or(wgpu::TextureFormat::Bgra8Unorm);
        log::debug!("Swapchain format: {:?}", swapchain_format);

        let physical_size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: swapchain_format,
            width: physical_size.width.max(1),
            height: physical_size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: capabilities.alpha_modes[0],
            view_formats: vec![],
        };
        surface.configure(&device, &config);

        let logical_size = physical_size.to_logical::<u32>(window.scale_factor());
        let shimmer = Shimmer::new(
            &device,
            swapchain_format,
            logical_size.width,
            logical_size.height,
            config.width,
            config.height,
            settings,
        )?;

        Ok(Self {
            window,
            surface,
            config,
            device,
            queue,
            shimmer,
        })
    }

    fn resize(&mut self, physical_size: PhysicalSize<u32>) {
        let logical_size = physical_size.to_logical::<u32>(self.window.scale_factor());

        // Minimised windows report a zero size; keep the last frame's state.
        if let Err(err) = self.shimmer.resize(
            logical_size.width,
            logical_size.height,
            physical_size.width,
            physical_size.height,
        ) {
            log::debug!("Skipping resize: {}", err);
            return;
        }

        self.config.width = physical_size.width;
        self.config.height = physical_size.height;
        self.surface.configure(&self.device, &self.config);
        self.window.request_redraw();
    }

    fn redraw(&mut self, timestamp: f64) {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(err) => {
                log::warn!("Failed to acquire next swap chain texture: {}", err);
                return;
            }
        };

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("shimmer:render"),
            });

        self.shimmer
            .animate(&self.queue, &mut encoder, &view, timestamp);

        self.queue.submit(Some(encoder.finish()));
        self.window.pre_present_notify();
        frame.present();
    }
}
