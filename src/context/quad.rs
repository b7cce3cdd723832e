use super::buffer::{Buffer, UniformBuffer};
use super::{shader, util, BindGroup, GpuContext};
use crate::frame::RenderSink;
use crate::linear::{Mat4, Vec3};
use anyhow::Context as _;
use std::path::Path;

/// Corners of the unit quad in the z = 0 plane, in drawing order.
pub(crate) const CORNERS: [Vec3; 4] = [
    Vec3::new(-0.5, -0.5, 0.0),
    Vec3::new(-0.5, 0.5, 0.0),
    Vec3::new(0.5, 0.5, 0.0),
    Vec3::new(0.5, -0.5, 0.0),
];

const COLORS: [[f32; 3]; 4] = [
    [1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0],
    [1.0, 0.0, 1.0],
];

const TEX_COORDS: [[f32; 2]; 4] = [[0.0, 1.0], [0.0, 0.0], [1.0, 0.0], [1.0, 1.0]];

const INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

const CHECKER_SIZE: u32 = 256;
const CHECKER_CELL: u32 = 32;

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadVertex {
    position: [f32; 3],
    color: [f32; 3],
    tex_coord: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct QuadUniforms {
    /// Column-major, as GLSL expects.
    view: Mat4,
}

/// Draws the textured quad into the main window as seen through the current view matrix.
pub(crate) struct QuadRenderer {
    vertices: Buffer<QuadVertex>,
    indices: Buffer<u32>,
    uniforms: UniformBuffer<QuadUniforms>,
    _texture: wgpu::Texture,
    _sampler: wgpu::Sampler,
    bind_group: BindGroup,
    pipeline: wgpu::RenderPipeline,
}

impl QuadRenderer {
    pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

    pub fn new(
        gpu: &GpuContext,
        shader_dir: &Path,
        texture_path: Option<&Path>,
    ) -> anyhow::Result<QuadRenderer> {
        let vertices = Buffer::new(gpu, wgpu::BufferUsage::VERTEX, &vertices());
        let indices = Buffer::new(gpu, wgpu::BufferUsage::INDEX, &INDICES);
        let uniforms = UniformBuffer::new(
            gpu,
            QuadUniforms {
                view: Mat4::IDENTITY,
            },
        );

        let image = load_image(texture_path)?;
        let size = crate::Size::new(image.width(), image.height());
        let texture = util::create_texture_with_data(
            size,
            Self::TEXTURE_FORMAT,
            wgpu::TextureUsage::SAMPLED,
            gpu,
            image.as_raw(),
        );
        let sampler = util::create_linear_sampler(gpu);

        let texture_view = util::view(&texture);
        let (layout, entries) = bind_group![
            Uniform(0 => (&uniforms.buffer) in VERTEX),
            Sampler(1 => (&sampler) in FRAGMENT),
            Texture(2 => (&texture_view, Float { filterable: true }, D2) in FRAGMENT),
        ];
        let bind_group = BindGroup::from_entries(&layout, &entries, gpu);

        let pipeline = Self::create_pipeline(&bind_group, shader_dir, gpu)?;

        Ok(QuadRenderer {
            vertices,
            indices,
            uniforms,
            _texture: texture,
            _sampler: sampler,
            bind_group,
            pipeline,
        })
    }

    fn create_pipeline(
        bind_group: &BindGroup,
        shader_dir: &Path,
        gpu: &GpuContext,
    ) -> anyhow::Result<wgpu::RenderPipeline> {
        let layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("quad"),
                bind_group_layouts: &[&bind_group.layout],
                push_constant_ranges: &[],
            });

        let vertex_module = shader::create_shader_module(gpu, shader_dir.join("quad.vert"))?;
        let fragment_module = shader::create_shader_module(gpu, shader_dir.join("quad.frag"))?;

        let vertex = wgpu::VertexState {
            module: &vertex_module,
            entry_point: "main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<QuadVertex>() as u64,
                step_mode: wgpu::InputStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float3,
                    1 => Float3,
                    2 => Float2,
                ],
            }],
        };

        let fragment = wgpu::FragmentState {
            module: &fragment_module,
            entry_point: "main",
            targets: &[wgpu::ColorTargetState {
                format: super::SWAP_CHAIN_FORMAT,
                alpha_blend: wgpu::BlendState::REPLACE,
                color_blend: wgpu::BlendState::REPLACE,
                write_mask: wgpu::ColorWrite::ALL,
            }],
        };

        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("quad"),
                layout: Some(&layout),
                vertex,
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: wgpu::CullMode::None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(fragment),
            });

        Ok(pipeline)
    }

    pub fn recreate_pipeline(
        &mut self,
        gpu: &GpuContext,
        shader_dir: &Path,
    ) -> anyhow::Result<()> {
        info!("recreating quad pipeline");
        self.pipeline = Self::create_pipeline(&self.bind_group, shader_dir, gpu)?;
        Ok(())
    }

    pub fn render(&self, gpu: &GpuContext, output: &wgpu::TextureView) {
        self.uniforms.update(gpu);

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("quad"),
                color_attachments: &[wgpu::RenderPassColorAttachmentDescriptor {
                    attachment: output,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                }],
                depth_stencil_attachment: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group.bindings, &[]);
            rpass.set_vertex_buffer(0, self.vertices.slice(..));
            rpass.set_index_buffer(self.indices.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..self.indices.len() as u32, 0, 0..1);
        }

        gpu.queue.submit(Some(encoder.finish()));
    }
}

impl RenderSink for QuadRenderer {
    fn set_view(&mut self, view: &Mat4) {
        self.uniforms.view = view.transpose();
    }
}

fn vertices() -> [QuadVertex; 4] {
    let mut vertices = [QuadVertex {
        position: [0.0; 3],
        color: [0.0; 3],
        tex_coord: [0.0; 2],
    }; 4];

    for (i, vertex) in vertices.iter_mut().enumerate() {
        vertex.position = CORNERS[i].into();
        vertex.color = COLORS[i];
        vertex.tex_coord = TEX_COORDS[i];
    }

    vertices
}

fn load_image(path: Option<&Path>) -> anyhow::Result<image::RgbaImage> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading texture");
            let image = image::open(path)
                .with_context(|| format!("failed to load texture `{}`", path.display()))?;
            Ok(image.to_rgba8())
        }
        None => {
            debug!("no texture given, using a checkerboard");
            Ok(checkerboard(CHECKER_SIZE, CHECKER_CELL))
        }
    }
}

fn checkerboard(size: u32, cell: u32) -> image::RgbaImage {
    image::RgbaImage::from_fn(size, size, |x, y| {
        let value = if (x / cell + y / cell) % 2 == 0 {
            255
        } else {
            96
        };
        image::Rgba([value, value, value, 255])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_coplanar_unit_square() {
        for corner in CORNERS.iter() {
            assert_eq!(corner.z, 0.0);
            assert_eq!(corner.x.abs(), 0.5);
            assert_eq!(corner.y.abs(), 0.5);
        }
    }

    #[test]
    fn triangles_cover_the_quad() {
        let mut used = [false; 4];
        for &index in INDICES.iter() {
            used[index as usize] = true;
        }
        assert!(used.iter().all(|&used| used));

        // both triangles wind the same way
        let winding = |tri: &[u32]| {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| CORNERS[i as usize]);
            (b - a).cross(c - a).z
        };
        assert!(winding(&INDICES[0..3]) * winding(&INDICES[3..6]) > 0.0);
    }

    #[test]
    fn vertices_carry_corner_attributes() {
        let vertices = vertices();
        assert_eq!(vertices[0].position, [-0.5, -0.5, 0.0]);
        assert_eq!(vertices[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[2].color, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[3].tex_coord, [1.0, 1.0]);
    }

    #[test]
    fn uniforms_hold_transposed_view() {
        let view = *crate::camera::CameraState::default().view();
        let uniforms = QuadUniforms {
            view: view.transpose(),
        };
        // translation ends up in the last column-major column
        assert_eq!(uniforms.view.rows[3], view.column(3));
        assert_eq!(std::mem::size_of::<QuadUniforms>(), 64);
    }

    #[test]
    fn checkerboard_alternates_cells() {
        let image = checkerboard(64, 16);
        assert_eq!(image.dimensions(), (64, 64));
        assert_eq!(image.get_pixel(0, 0), image.get_pixel(32, 0));
        assert_ne!(image.get_pixel(0, 0), image.get_pixel(16, 0));
        assert_ne!(image.get_pixel(0, 0), image.get_pixel(0, 16));
        assert_eq!(image.get_pixel(5, 5)[3], 255);
    }

    #[test]
    fn missing_texture_file_is_an_error() {
        let error = load_image(Some(Path::new("does/not/exist.png"))).unwrap_err();
        assert!(format!("{:#}", error).contains("failed to load texture"));
    }
}
