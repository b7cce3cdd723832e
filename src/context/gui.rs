use super::buffer::{Buffer, UniformBuffer};
use super::{shader, util, BindGroup, GpuContext};
use crate::frame::DebugSink;
use crate::readout::{Group, Readout};
use std::path::Path;
use std::sync::Arc;
use winit::event::{ElementState, MouseButton, WindowEvent};

const SCENE_COLOR: egui::Color32 = egui::Color32::from_rgb(128, 255, 0);
const ANGLE_COLOR: egui::Color32 = egui::Color32::from_rgb(255, 128, 0);
const CAMERA_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 128, 255);

fn group_color(group: Group) -> egui::Color32 {
    match group {
        Group::Scene => SCENE_COLOR,
        Group::Angle => ANGLE_COLOR,
        Group::Camera => CAMERA_COLOR,
    }
}

/// The contents of the info window: the latest readouts laid out with egui.
pub(crate) struct InfoPanel {
    ctx: egui::CtxRef,
    events: Vec<egui::Event>,
    pointer: egui::Pos2,
    readouts: Vec<Readout>,
    fps: f32,
}

impl InfoPanel {
    pub fn new() -> InfoPanel {
        InfoPanel {
            ctx: egui::CtxRef::default(),
            events: Vec::new(),
            pointer: egui::Pos2::new(-1.0, -1.0),
            readouts: Vec::new(),
            fps: f32::NAN,
        }
    }

    pub fn set_fps(&mut self, fps: f32) {
        self.fps = fps;
    }

    /// Forwards pointer input from the info window to egui.
    pub fn handle_event(&mut self, event: &WindowEvent, scale_factor: f64) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(scale_factor);
                self.pointer = egui::Pos2::new(logical.x, logical.y);
                self.events.push(egui::Event::PointerMoved(self.pointer));
            }
            WindowEvent::CursorLeft { .. } => self.events.push(egui::Event::PointerGone),
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => egui::PointerButton::Primary,
                    MouseButton::Right => egui::PointerButton::Secondary,
                    MouseButton::Middle => egui::PointerButton::Middle,
                    MouseButton::Other(_) => return,
                };
                self.events.push(egui::Event::PointerButton {
                    pos: self.pointer,
                    button,
                    pressed: matches!(state, ElementState::Pressed),
                    modifiers: egui::Modifiers::default(),
                });
            }
            _ => {}
        }
    }

    /// Lays out one frame and returns the triangles to draw, in logical pixels.
    pub fn run(
        &mut self,
        size: crate::Size,
        scale_factor: f32,
        dt: f32,
    ) -> Vec<egui::ClippedMesh> {
        let screen_size = [
            size.width as f32 / scale_factor,
            size.height as f32 / scale_factor,
        ];
        let screen_rect = egui::Rect::from_min_size([0.0, 0.0].into(), screen_size.into());

        let raw_input = egui::RawInput {
            screen_rect: Some(screen_rect),
            pixels_per_point: Some(scale_factor),
            time: None,
            predicted_dt: dt,
            modifiers: egui::Modifiers::default(),
            events: std::mem::take(&mut self.events),
            ..Default::default()
        };

        self.ctx.begin_frame(raw_input);

        let ctx = self.ctx.clone();
        egui::CentralPanel::default().show(&ctx, |ui| self.layout(ui));

        let (_output, shapes) = self.ctx.end_frame();
        self.ctx.tessellate(shapes)
    }

    pub fn texture(&self) -> Arc<egui::Texture> {
        self.ctx.texture()
    }

    fn layout(&self, ui: &mut egui::Ui) {
        ui.heading("camera");
        ui.label(format!("fps: {:.1}", self.fps));
        ui.separator();

        egui::Grid::new("readouts").striped(true).show(ui, |ui| {
            for readout in self.readouts.iter() {
                ui.label(readout.name);
                ui.add(
                    egui::Label::new(readout.value.to_string())
                        .monospace()
                        .text_color(group_color(readout.group)),
                );
                ui.end_row();
            }
        });
    }
}

impl DebugSink for InfoPanel {
    fn show(&mut self, readouts: Vec<Readout>) {
        self.readouts = readouts;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct GuiVertex {
    position: [f32; 2],
    tex_coord: [f32; 2],
    color: [u8; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct GuiUniforms {
    width: f32,
    height: f32,
}

struct GuiMesh {
    /// Scissor rectangle in physical pixels: x, y, width, height.
    clip: [u32; 4],
    indices: Buffer<u32>,
    vertices: Buffer<GuiVertex>,
}

struct GuiTexture {
    version: Option<u64>,
    size: crate::Size,
    texture: wgpu::Texture,
}

impl GuiTexture {
    pub fn empty(gpu: &GpuContext) -> Self {
        let size = [1, 1].into();
        let texture = util::create_texture_with_data(
            size,
            GuiRenderer::TEXTURE_FORMAT,
            wgpu::TextureUsage::SAMPLED,
            gpu,
            &[0],
        );

        GuiTexture {
            version: None,
            size,
            texture,
        }
    }
}

/// Uploads and draws egui meshes into the info window.
pub(crate) struct GuiRenderer {
    uniforms: UniformBuffer<GuiUniforms>,
    texture: GuiTexture,
    sampler: wgpu::Sampler,
    bind_group: BindGroup,
    pipeline: wgpu::RenderPipeline,
    meshes: Vec<GuiMesh>,
}

impl GuiRenderer {
    pub const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R8Unorm;

    pub fn new(gpu: &GpuContext, shader_dir: &Path) -> anyhow::Result<GuiRenderer> {
        let uniforms = UniformBuffer::new(
            gpu,
            GuiUniforms {
                width: 1.0,
                height: 1.0,
            },
        );
        let texture = GuiTexture::empty(gpu);
        let sampler = util::create_linear_sampler(gpu);

        let texture_view = util::view(&texture.texture);
        let (layout, entries) = Self::bindings(&uniforms, &sampler, &texture_view);
        let bind_group = BindGroup::from_entries(&layout, &entries, gpu);

        let pipeline = Self::create_pipeline(&bind_group, shader_dir, gpu)?;

        Ok(GuiRenderer {
            uniforms,
            texture,
            sampler,
            bind_group,
            pipeline,
            meshes: Vec::new(),
        })
    }

    fn bindings<'a>(
        uniforms: &'a UniformBuffer<GuiUniforms>,
        sampler: &'a wgpu::Sampler,
        texture: &'a wgpu::TextureView,
    ) -> (
        [wgpu::BindGroupLayoutEntry; 3],
        [wgpu::BindGroupEntry<'a>; 3],
    ) {
        bind_group![
            Uniform(0 => (&uniforms.buffer) in VERTEX),
            Sampler(1 => (sampler) in FRAGMENT),
            Texture(2 => (texture, Float { filterable: true }, D2) in FRAGMENT),
        ]
    }

    fn create_pipeline(
        bind_group: &BindGroup,
        shader_dir: &Path,
        gpu: &GpuContext,
    ) -> anyhow::Result<wgpu::RenderPipeline> {
        let layout = gpu
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("gui"),
                bind_group_layouts: &[&bind_group.layout],
                push_constant_ranges: &[],
            });

        let vertex_module = shader::create_shader_module(gpu, shader_dir.join("gui.vert"))?;
        let fragment_module = shader::create_shader_module(gpu, shader_dir.join("gui.frag"))?;

        let vertex = wgpu::VertexState {
            module: &vertex_module,
            entry_point: "main",
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<GuiVertex>() as u64,
                step_mode: wgpu::InputStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float2,
                    1 => Float2,
                    2 => Uint,
                ],
            }],
        };

        let fragment = wgpu::FragmentState {
            module: &fragment_module,
            entry_point: "main",
            targets: &[wgpu::ColorTargetState {
                format: super::SWAP_CHAIN_FORMAT,
                alpha_blend: wgpu::BlendState::REPLACE,
                color_blend: wgpu::BlendState {
                    src_factor: wgpu::BlendFactor::One,
                    dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
                    operation: wgpu::BlendOperation::Add,
                },
                write_mask: wgpu::ColorWrite::ALL,
            }],
        };

        let pipeline = gpu
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("gui"),
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
        info!("recreating gui pipeline");
        self.pipeline = Self::create_pipeline(&self.bind_group, shader_dir, gpu)?;
        Ok(())
    }

    /// Uploads the meshes and font texture of one egui frame.
    pub fn prepare(
        &mut self,
        gpu: &GpuContext,
        meshes: Vec<egui::ClippedMesh>,
        texture: &egui::Texture,
        size: crate::Size,
        scale_factor: f32,
    ) {
        self.uniforms.width = size.width as f32 / scale_factor;
        self.uniforms.height = size.height as f32 / scale_factor;
        self.uniforms.update(gpu);

        self.update_texture(gpu, texture);
        self.build_meshes(gpu, meshes, size, scale_factor);
    }

    fn build_meshes(
        &mut self,
        gpu: &GpuContext,
        meshes: Vec<egui::ClippedMesh>,
        size: crate::Size,
        scale_factor: f32,
    ) {
        self.meshes.clear();
        self.meshes.reserve(meshes.len());

        for egui::ClippedMesh(clip_rect, mesh) in meshes {
            if mesh.indices.is_empty() {
                continue;
            }

            let clip = match scissor(clip_rect, size, scale_factor) {
                Some(clip) => clip,
                None => continue,
            };

            let indices = Buffer::new(gpu, wgpu::BufferUsage::INDEX, &mesh.indices);

            let vertices = mesh
                .vertices
                .into_iter()
                .map(|vertex| GuiVertex {
                    position: vertex.pos.into(),
                    tex_coord: vertex.uv.into(),
                    color: vertex.color.to_array(),
                })
                .collect::<Vec<_>>();

            let vertices = Buffer::new(gpu, wgpu::BufferUsage::VERTEX, vertices.as_slice());

            self.meshes.push(GuiMesh {
                clip,
                indices,
                vertices,
            })
        }
    }

    fn update_texture(&mut self, gpu: &GpuContext, new: &egui::Texture) {
        let new_size = crate::Size::new(new.width as u32, new.height as u32);

        match &mut self.texture {
            old if old.version == Some(new.version) => { /* up to date */ }
            old if old.size == new_size => {
                util::write_texture(&old.texture, new_size, gpu, &new.pixels);
                old.version = Some(new.version);
            }
            old => {
                debug!(?new_size, "recreating gui texture");
                let texture = util::create_texture_with_data(
                    new_size,
                    Self::TEXTURE_FORMAT,
                    wgpu::TextureUsage::SAMPLED,
                    gpu,
                    &new.pixels,
                );

                *old = GuiTexture {
                    version: Some(new.version),
                    size: new_size,
                    texture,
                };

                let texture_view = util::view(&self.texture.texture);
                let (_layout, entries) =
                    Self::bindings(&self.uniforms, &self.sampler, &texture_view);
                self.bind_group.update_bindings(&entries, gpu);
            }
        }
    }

    pub fn render(&self, gpu: &GpuContext, output: &wgpu::TextureView) {
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("gui"),
                color_attachments: &[wgpu::RenderPassColorAttachmentDescriptor {
                    attachment: output,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.02,
                            g: 0.02,
                            b: 0.02,
                            a: 1.0,
                        }),
                        store: true,
                    },
                }],
                depth_stencil_attachment: None,
            });

            rpass.set_pipeline(&self.pipeline);
            rpass.set_bind_group(0, &self.bind_group.bindings, &[]);

            for mesh in self.meshes.iter() {
                let [x, y, width, height] = mesh.clip;
                rpass.set_scissor_rect(x, y, width, height);
                rpass.set_index_buffer(mesh.indices.slice(..), wgpu::IndexFormat::Uint32);
                rpass.set_vertex_buffer(0, mesh.vertices.slice(..));
                rpass.draw_indexed(0..mesh.indices.len() as u32, 0, 0..1);
            }
        }

        gpu.queue.submit(Some(encoder.finish()));
    }
}

/// Converts a clip rectangle in logical pixels to a scissor rectangle inside the target.
fn scissor(clip: egui::Rect, size: crate::Size, scale_factor: f32) -> Option<[u32; 4]> {
    let clamp_x = |x: f32| (x * scale_factor).round().max(0.0).min(size.width as f32) as u32;
    let clamp_y = |y: f32| (y * scale_factor).round().max(0.0).min(size.height as f32) as u32;

    let min_x = clamp_x(clip.min.x);
    let min_y = clamp_y(clip.min.y);
    let max_x = clamp_x(clip.max.x);
    let max_y = clamp_y(clip.max.y);

    if max_x <= min_x || max_y <= min_y {
        return None;
    }

    Some([min_x, min_y, max_x - min_x, max_y - min_y])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraState;

    fn size(width: u32, height: u32) -> crate::Size {
        crate::Size::new(width, height)
    }

    #[test]
    fn groups_have_distinct_colors() {
        assert_eq!(group_color(Group::Scene), egui::Color32::from_rgb(128, 255, 0));
        assert_eq!(group_color(Group::Angle), egui::Color32::from_rgb(255, 128, 0));
        assert_eq!(group_color(Group::Camera), egui::Color32::from_rgb(0, 128, 255));
    }

    #[test]
    fn panel_keeps_latest_readouts() {
        let mut panel = InfoPanel::new();
        let camera = CameraState::default();

        panel.show(crate::readout::collect(&camera, &super::super::quad::CORNERS));
        assert_eq!(panel.readouts.len(), 12);

        panel.show(Vec::new());
        assert!(panel.readouts.is_empty());
    }

    #[test]
    fn panel_lays_out_without_a_gpu() {
        let mut panel = InfoPanel::new();
        let camera = CameraState::default();
        panel.show(crate::readout::collect(&camera, &super::super::quad::CORNERS));
        panel.set_fps(60.0);

        let meshes = panel.run(size(900, 900), 1.0, 1.0 / 60.0);
        assert!(meshes.iter().any(|egui::ClippedMesh(_, mesh)| !mesh.indices.is_empty()));

        let texture = panel.texture();
        assert!(texture.width > 0 && texture.height > 0);
        assert_eq!(texture.pixels.len(), texture.width * texture.height);
    }

    #[test]
    fn pointer_events_are_logical() {
        let mut panel = InfoPanel::new();
        #[allow(deprecated)]
        let moved = WindowEvent::CursorMoved {
            device_id: unsafe { winit::event::DeviceId::dummy() },
            position: winit::dpi::PhysicalPosition::new(200.0, 100.0),
            modifiers: Default::default(),
        };
        panel.handle_event(&moved, 2.0);
        assert_eq!(panel.pointer, egui::Pos2::new(100.0, 50.0));
        assert_eq!(panel.events.len(), 1);

        panel.run(size(900, 900), 2.0, 0.0);
        assert!(panel.events.is_empty());
    }

    #[test]
    fn scissor_scales_and_clamps() {
        let rect = egui::Rect::from_min_max([10.0, 20.0].into(), [1000.0, 30.0].into());
        assert_eq!(scissor(rect, size(900, 900), 2.0), Some([20, 40, 880, 20]));

        let outside = egui::Rect::from_min_max([950.0, 0.0].into(), [990.0, 10.0].into());
        assert_eq!(scissor(outside, size(900, 900), 1.0), None);
    }
}
