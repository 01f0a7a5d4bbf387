use crate::camera::PerspectiveCamera;
use crate::mesh::{MeshKey, Vertex, shape_scale};
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use std::collections::{BTreeMap, HashMap};
use wgpu::util::DeviceExt;
use walkway_kernel::{Scene, Side};
use walkway_render::RenderView;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    fog_color: [f32; 4],
    fog_range: [f32; 4],
    ambient: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model_0: [f32; 4],
    model_1: [f32; 4],
    model_2: [f32; 4],
    model_3: [f32; 4],
    color: [f32; 4],
    emissive: [f32; 4],
}

/// Which pipeline variant draws a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PipelineKey {
    side: Side,
    transparent: bool,
}

impl PipelineKey {
    const ALL: [PipelineKey; 6] = [
        PipelineKey { side: Side::Front, transparent: false },
        PipelineKey { side: Side::Back, transparent: false },
        PipelineKey { side: Side::Double, transparent: false },
        PipelineKey { side: Side::Front, transparent: true },
        PipelineKey { side: Side::Back, transparent: true },
        PipelineKey { side: Side::Double, transparent: true },
    ];

    fn cull_mode(self) -> Option<wgpu::Face> {
        match self.side {
            Side::Front => Some(wgpu::Face::Back),
            Side::Back => Some(wgpu::Face::Front),
            Side::Double => None,
        }
    }

    fn label(self) -> &'static str {
        match (self.side, self.transparent) {
            (Side::Front, false) => "opaque_front_pipeline",
            (Side::Back, false) => "opaque_back_pipeline",
            (Side::Double, false) => "opaque_double_pipeline",
            (Side::Front, true) => "blended_front_pipeline",
            (Side::Back, true) => "blended_back_pipeline",
            (Side::Double, true) => "blended_double_pipeline",
        }
    }
}

/// One mesh node, ready to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Draw {
    mesh: MeshKey,
    pipeline: PipelineKey,
    instance: InstanceData,
    /// Distance from the eye to the node origin, for blended ordering.
    depth: f32,
}

/// Opaque draws in scene order, then transparent draws farthest first.
fn draw_list(scene: &Scene, eye: Vec3) -> Vec<Draw> {
    let mut draws = Vec::new();
    scene.visit(|node, world| {
        let Some(mesh) = &node.mesh else {
            return;
        };
        let material = mesh.material;
        let model = world * Mat4::from_scale(shape_scale(&mesh.shape));
        let cols = model.to_cols_array_2d();
        draws.push(Draw {
            mesh: MeshKey::of(&mesh.shape),
            pipeline: PipelineKey {
                side: material.side,
                transparent: material.transparent,
            },
            instance: InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color: material.color.extend(material.opacity).to_array(),
                emissive: material.emissive.extend(0.0).to_array(),
            },
            depth: world.w_axis.truncate().distance(eye),
        });
    });
    let (opaque, mut blended): (Vec<Draw>, Vec<Draw>) =
        draws.into_iter().partition(|draw| !draw.pipeline.transparent);
    blended.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    opaque.into_iter().chain(blended).collect()
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// wgpu-based scene renderer.
pub struct WgpuRenderer {
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    meshes: BTreeMap<MeshKey, GpuMesh>,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    depth_texture: wgpu::TextureView,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let pipelines = PipelineKey::ALL
            .into_iter()
            .map(|key| {
                let pipeline =
                    Self::create_pipeline(device, &pipeline_layout, &shader, surface_format, key);
                (key, pipeline)
            })
            .collect();

        let max_instances = 256u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, width, height);

        Self {
            pipelines,
            uniform_buffer,
            uniform_bind_group,
            meshes: BTreeMap::new(),
            instance_buffer,
            max_instances,
            depth_texture,
        }
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        key: PipelineKey,
    ) -> wgpu::RenderPipeline {
        let blend = if key.transparent {
            wgpu::BlendState::ALPHA_BLENDING
        } else {
            wgpu::BlendState::REPLACE
        };
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(key.label()),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode: wgpu::VertexStepMode::Vertex,
                        attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                    },
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<InstanceData>() as u64,
                        step_mode: wgpu::VertexStepMode::Instance,
                        attributes: &wgpu::vertex_attr_array![
                            1 => Float32x4,
                            2 => Float32x4,
                            3 => Float32x4,
                            4 => Float32x4,
                            5 => Float32x4,
                            6 => Float32x4,
                        ],
                    },
                ],
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(blend),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: key.cull_mode(),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: !key.transparent,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    fn ensure_mesh(&mut self, device: &wgpu::Device, key: MeshKey) {
        if self.meshes.contains_key(&key) {
            return;
        }
        let data = key.build();
        tracing::debug!(?key, vertices = data.vertices.len(), "uploading mesh");
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_vertex_buffer"),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mesh_index_buffer"),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        self.meshes.insert(
            key,
            GpuMesh {
                vertex_buffer,
                index_buffer,
                index_count: data.indices.len() as u32,
            },
        );
    }

    /// Render one frame of `scene` seen through `camera` from `view`.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        target: &wgpu::TextureView,
        camera: &PerspectiveCamera,
        view: &RenderView,
        scene: &Scene,
    ) {
        let fog = scene.fog;
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&Uniforms {
                view_proj: camera.view_projection(view).to_cols_array_2d(),
                view: camera.view_matrix(view).to_cols_array_2d(),
                fog_color: fog.color.extend(1.0).to_array(),
                fog_range: [fog.near, fog.far, 0.0, 0.0],
                ambient: scene.ambient.radiance().extend(1.0).to_array(),
            }),
        );

        let mut draws = draw_list(scene, view.eye);
        if draws.len() > self.max_instances as usize {
            tracing::warn!(
                nodes = draws.len(),
                max = self.max_instances,
                "scene exceeds instance capacity; extra nodes skipped"
            );
            draws.truncate(self.max_instances as usize);
        }
        for draw in &draws {
            self.ensure_mesh(device, draw.mesh);
        }

        let instances: Vec<InstanceData> = draws.iter().map(|draw| draw.instance).collect();
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for (i, draw) in draws.iter().enumerate() {
                let (Some(pipeline), Some(mesh)) =
                    (self.pipelines.get(&draw.pipeline), self.meshes.get(&draw.mesh))
                else {
                    continue;
                };
                let instance = i as u32;
                pass.set_pipeline(pipeline);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                pass.draw_indexed(0..mesh.index_count, 0, instance..instance + 1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkway_kernel::{Material, SceneNode, Shape};

    #[test]
    fn walkway_draws_opaque_before_blended() {
        let scene = Scene::walkway().unwrap();
        let draws = draw_list(&scene, Vec3::new(0.0, 0.0, 19.0));
        assert_eq!(draws.len(), 4);
        assert!(!draws[0].pipeline.transparent);
        assert!(!draws[1].pipeline.transparent);
        assert!(draws[2].pipeline.transparent);
        assert!(draws[3].pipeline.transparent);
        assert!(draws[2].depth >= draws[3].depth);
    }

    #[test]
    fn draw_carries_material_and_side() {
        let scene = Scene::walkway().unwrap();
        let draws = draw_list(&scene, Vec3::ZERO);
        let dome = draws
            .iter()
            .find(|d| matches!(d.mesh, MeshKey::Sphere { .. }))
            .unwrap();
        assert_eq!(dome.pipeline.side, Side::Back);
        assert_eq!(dome.pipeline.cull_mode(), Some(wgpu::Face::Front));
        assert_eq!(dome.instance.color, [0.0, 0.0, 1.0, 0.5]);
        // Unit sphere scaled to radius 20.
        assert_eq!(dome.instance.model_0[0], 20.0);

        let floor = draws.iter().find(|d| d.mesh == MeshKey::Plane).unwrap();
        assert_eq!(floor.pipeline.cull_mode(), None);
        assert_eq!(floor.instance.emissive, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn blended_draws_sort_far_to_near() {
        let mut scene = Scene::new();
        let glass = Material::lambert(Vec3::ONE).with_opacity(0.5);
        let cube = Shape::Cuboid { size: Vec3::ONE };
        for z in [-2.0, -8.0, -5.0] {
            scene
                .add(SceneNode::mesh("pane", cube, glass).with_position(Vec3::new(0.0, 0.0, z)))
                .unwrap();
        }
        let depths: Vec<f32> = draw_list(&scene, Vec3::ZERO).iter().map(|d| d.depth).collect();
        assert_eq!(depths, vec![8.0, 5.0, 2.0]);
    }

    #[test]
    fn groups_produce_no_draws() {
        let mut scene = Scene::new();
        scene
            .add(SceneNode::group("empty").with_child(SceneNode::group("nested")))
            .unwrap();
        assert!(draw_list(&scene, Vec3::ZERO).is_empty());
    }

    #[test]
    fn every_pipeline_variant_has_a_distinct_label() {
        let labels: std::collections::HashSet<&str> =
            PipelineKey::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(labels.len(), PipelineKey::ALL.len());
    }
}
