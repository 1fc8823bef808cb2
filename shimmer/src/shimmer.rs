use crate::clock::Clock;
use crate::field::FieldState;
use crate::problem::{self, Problem};
use crate::{render, settings};
use settings::Settings;

use std::sync::Arc;

pub struct Shimmer {
    settings: Arc<Settings>,
    clock: Clock,

    // Drawing size in device pixels.
    physical_size: wgpu::Extent3d,

    field: render::field::Context,
}

impl Shimmer {
    pub fn new(
        device: &wgpu::Device,
        swapchain_format: wgpu::TextureFormat,
        logical_width: u32,
        logical_height: u32,
        physical_width: u32,
        physical_height: u32,
        settings: &Arc<Settings>,
    ) -> Result<Shimmer, Problem> {
        log::info!("✨ Initialising Shimmer");

        problem::check_viewport(physical_width, physical_height)?;

        log::info!("📐 Logical size: {}x{}", logical_width, logical_height);
        log::info!("📏 Physical size: {}x{}", physical_width, physical_height);

        let physical_size = wgpu::Extent3d {
            width: physical_width,
            height: physical_height,
            depth_or_array_layers: 1,
        };

        let clock = Clock::new(settings.max_frame_time);
        let state = FieldState::new(clock.elapsed_time(), physical_width, physical_height);
        let field = render::field::Context::new(device, swapchain_format, &state);

        Ok(Shimmer {
            settings: Arc::clone(settings),
            clock,
            physical_size,
            field,
        })
    }

    pub fn update(&mut self, settings: &Arc<Settings>) {
        if settings.mode != self.settings.mode {
            log::info!("🎛 Switching to {:?}", settings.mode);
        }

        self.clock.set_max_frame_time(settings.max_frame_time);
        self.settings = Arc::clone(settings);
    }

    pub fn resize(
        &mut self,
        logical_width: u32,
        logical_height: u32,
        physical_width: u32,
        physical_height: u32,
    ) -> Result<(), Problem> {
        problem::check_viewport(physical_width, physical_height)?;

        log::debug!(
            "Resizing to {}x{} ({}x{} physical)",
            logical_width,
            logical_height,
            physical_width,
            physical_height
        );

        self.physical_size = wgpu::Extent3d {
            width: physical_width,
            height: physical_height,
            depth_or_array_layers: 1,
        };

        Ok(())
    }

    pub fn state(&self) -> FieldState {
        FieldState::new(
            self.clock.elapsed_time(),
            self.physical_size.width,
            self.physical_size.height,
        )
    }

    pub fn animate(
        &mut self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        timestamp: f64,
    ) {
        self.compute(queue, timestamp);
        self.render(encoder, view);
    }

    /// Advances the clock to `timestamp` (milliseconds) and uploads the frame
    /// state.
    pub fn compute(&mut self, queue: &wgpu::Queue, timestamp: f64) {
        self.clock.tick(timestamp);
        self.field.update_uniforms(queue, &self.state());
    }

    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        encoder.push_debug_group("render field");

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shimmer::render"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.field.draw(&mut rpass, self.settings.mode);
        }

        encoder.pop_debug_group();
    }
}
