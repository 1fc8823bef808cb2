// The wasm-bindgen wrapper only builds for the browser. The size helpers
// below are shared with native test runs.
#[cfg(target_arch = "wasm32")]
mod web {
    use super::{pixel_ratio_for, physical_from_logical_size};
    use gloo_utils::format::JsValueSerdeExt;
    use shimmer::settings::Settings;
    use std::sync::Arc;

    use wasm_bindgen::prelude::*;
    use wasm_bindgen::{JsCast, JsValue};
    use web_sys::Window;

    #[wasm_bindgen]
    pub struct Shimmer {
        canvas: web_sys::HtmlCanvasElement,
        device: wgpu::Device,
        queue: wgpu::Queue,
        window_surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
        logical_width: u32,
        logical_height: u32,
        pixel_ratio: f64,
        instance: shimmer::Shimmer,
    }

    #[wasm_bindgen]
    impl Shimmer {
        #[wasm_bindgen(setter)]
        pub fn set_settings(&mut self, settings_object: &JsValue) {
            let settings = match parse_settings(settings_object) {
                Ok(settings) => settings,
                Err(err) => {
                    log::error!("Ignoring invalid settings: {:?}", err);
                    return;
                }
            };

            let pixel_ratio = match window() {
                Ok(window) => pixel_ratio_for(window.device_pixel_ratio(), &settings),
                Err(_) => self.pixel_ratio,
            };

            self.instance.update(&Arc::new(settings));

            if pixel_ratio != self.pixel_ratio {
                self.pixel_ratio = pixel_ratio;
                if let Err(err) = self.resize_to(self.logical_width, self.logical_height) {
                    log::error!("Failed to apply the new pixel ratio: {:?}", err);
                }
            }
        }

        #[wasm_bindgen(constructor)]
        pub async fn new(element_id: &str, settings_object: &JsValue) -> Result<Shimmer, JsValue> {
            // Another instance may have installed the logger already.
            let _ = console_log::init_with_level(log::Level::Info);

            set_panic_hook();

            let settings = Arc::new(parse_settings(settings_object)?);

            let window = window()?;
            let document = window
                .document()
                .ok_or_else(|| JsValue::from_str("The window has no document"))?;
            let html_canvas = document
                .get_element_by_id(element_id)
                .ok_or_else(|| {
                    JsValue::from_str(&format!(
                        "I expected to find a canvas element with id `{}`",
                        element_id
                    ))
                })?
                .dyn_into::<web_sys::HtmlCanvasElement>()?;

            let pixel_ratio = pixel_ratio_for(window.device_pixel_ratio(), &settings);
            let logical_width = html_canvas.client_width() as u32;
            let logical_height = html_canvas.client_height() as u32;
            let (physical_width, physical_height) =
                physical_from_logical_size(logical_width, logical_height, pixel_ratio);
            html_canvas.set_width(physical_width);
            html_canvas.set_height(physical_height);

            let wgpu_instance = wgpu::Instance::default();
            let window_surface = wgpu_instance
                .create_surface(wgpu::SurfaceTarget::Canvas(html_canvas.clone()))
                .map_err(to_js_error)?;
            let adapter = wgpu_instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::LowPower,
                    force_fallback_adapter: false,
                    compatible_surface: Some(&window_surface),
                })
                .await
                .map_err(to_js_error)?;

            log::debug!("{:?}", adapter.get_info());

            let (device, queue) = adapter
                .request_device(&wgpu::DeviceDescriptor {
                    label: Some("shimmer:device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    ..Default::default()
                })
                .await
                .map_err(to_js_error)?;

            let capabilities = window_surface.get_capabilities(&adapter);
            let swapchain_format = shimmer::render::preferred_surface_format(&capabilities.formats)
                .ok_or_else(|| JsValue::from_str("The surface supports no texture formats"))?;
            log::debug!("Swapchain format: {:?}", swapchain_format);

            let config = wgpu::SurfaceConfiguration {
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                format: swapchain_format,
                width: physical_width.max(1),
                height: physical_height.max(1),
                present_mode: wgpu::PresentMode::AutoVsync,
                desired_maximum_frame_latency: 2,
                alpha_mode: capabilities.alpha_modes[0],
                view_formats: vec![],
            };
            window_surface.configure(&device, &config);

            let instance = shimmer::Shimmer::new(
                &device,
                swapchain_format,
                logical_width,
                logical_height,
                physical_width,
                physical_height,
                &settings,
            )
            .map_err(to_js_error)?;

            Ok(Self {
                canvas: html_canvas,
                device,
                queue,
                window_surface,
                config,
                logical_width,
                logical_height,
                pixel_ratio,
                instance,
            })
        }

        /// Draws a frame. `timestamp` is the `requestAnimationFrame` time in
        /// milliseconds.
        pub fn animate(&mut self, timestamp: f64) {
            let frame = match self.window_surface.get_current_texture() {
                Ok(frame) => frame,
                Err(err) => {
                    log::warn!("Failed to acquire next swap chain texture: {}", err);
                    self.window_surface.configure(&self.device, &self.config);
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

            self.instance
                .animate(&self.queue, &mut encoder, &view, timestamp);

            self.queue.submit(Some(encoder.finish()));
            frame.present();
        }

        pub fn resize(&mut self, logical_width: u32, logical_height: u32) -> Result<(), JsValue> {
            if (self.logical_width == logical_width) && (self.logical_height == logical_height) {
                return Ok(());
            }

            self.resize_to(logical_width, logical_height)
        }
    }

    impl Shimmer {
        fn resize_to(&mut self, logical_width: u32, logical_height: u32) -> Result<(), JsValue> {
            let (physical_width, physical_height) =
                physical_from_logical_size(logical_width, logical_height, self.pixel_ratio);

            self.instance
                .resize(
                    logical_width,
                    logical_height,
                    physical_width,
                    physical_height,
                )
                .map_err(to_js_error)?;

            self.canvas.set_width(physical_width);
            self.canvas.set_height(physical_height);
            self.config.width = physical_width;
            self.config.height = physical_height;
            self.window_surface.configure(&self.device, &self.config);

            self.logical_width = logical_width;
            self.logical_height = logical_height;

            Ok(())
        }
    }

    fn parse_settings(settings_object: &JsValue) -> Result<Settings, JsValue> {
        let settings: Settings = settings_object.into_serde().map_err(to_js_error)?;
        settings.validate().map_err(to_js_error)?;
        Ok(settings)
    }

    fn window() -> Result<Window, JsValue> {
        web_sys::window().ok_or_else(|| JsValue::from_str("The global `window` doesn’t exist"))
    }

    fn to_js_error(err: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&err.to_string())
    }

    // https://github.com/rustwasm/console_error_panic_hook#readme
    pub fn set_panic_hook() {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::Shimmer;

/// The device pixel ratio to render at, capped by the settings. Browsers that
/// report a nonsensical ratio get one device pixel per CSS pixel.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn pixel_ratio_for(device_pixel_ratio: f64, settings: &shimmer::Settings) -> f64 {
    let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
        device_pixel_ratio
    } else {
        1.0
    };

    device_pixel_ratio.min(settings.max_pixel_ratio)
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn physical_from_logical_size(
    logical_width: u32,
    logical_height: u32,
    pixel_ratio: f64,
) -> (u32, u32) {
    (
        (pixel_ratio * f64::from(logical_width)) as u32,
        (pixel_ratio * f64::from(logical_height)) as u32,
    )
}
