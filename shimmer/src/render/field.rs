use crate::field::{FieldState, FieldUniforms};
use crate::settings::Mode;

use std::borrow::Cow;
use wgpu::util::DeviceExt;

pub struct Context {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipelines: Vec<(Mode, wgpu::RenderPipeline)>,
}

impl Context {
    pub fn new(
        device: &wgpu::Device,
        swapchain_format: wgpu::TextureFormat,
        state: &FieldState,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform:field"),
            contents: bytemuck::cast_slice(&[state.to_uniforms()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("bind_group_layout:field"),
            entries: &[
                // uniforms
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(
                            std::mem::size_of::<FieldUniforms>() as u64,
                        ),
                    },
                    count: None,
                },
            ],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("bind_group:field"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: None,
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout:field"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shader:perlin_field"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!(
                "../../shader/perlin_field.wgsl"
            ))),
        });

        let pipelines = Mode::all()
            .iter()
            .map(|mode| {
                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(&format!("pipeline:field:{:?}", mode)),
                    layout: Some(&pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: Some("vs"),
                        buffers: &[],
                        compilation_options: Default::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: Some(mode.fragment_entry_point()),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: swapchain_format,
                            // The field is opaque.
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: Default::default(),
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        ..Default::default()
                    },
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                });

                (*mode, pipeline)
            })
            .collect();

        Self {
            uniform_buffer,
            bind_group,
            pipelines,
        }
    }

    pub fn update_uniforms(&self, queue: &wgpu::Queue, state: &FieldState) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::cast_slice(&[state.to_uniforms()]),
        );
    }

    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, mode: Mode) {
        let some_pipeline = self
            .pipelines
            .iter()
            .find(|(m, _)| *m == mode)
            .map(|(_, pipeline)| pipeline);

        if let Some(pipeline) = some_pipeline {
            rpass.set_pipeline(pipeline);
            rpass.set_bind_group(0, &self.bind_group, &[]);
            rpass.draw(0..6, 0..1);
        }
    }
}
