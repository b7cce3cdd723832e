#[macro_use]
mod macros;

mod buffer;
mod gui;
mod quad;
mod shader;
mod util;

use self::gui::{GuiRenderer, InfoPanel};
use self::quad::QuadRenderer;
use crate::camera::CameraState;
use crate::controller::{Controller, Flow};
use crate::input::PointerInput;
use crate::options::Options;
use anyhow::anyhow;
use anyhow::Context as _;
use std::path::PathBuf;
use std::sync::Arc;
use winit::event::{Event, WindowEvent};
use winit::event_loop::ControlFlow;
use winit::window::Window;

pub(crate) const SWAP_CHAIN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

/// Everything the application owns: both windows, their renderers and the camera.
pub(crate) struct Context {
    gpu: GpuContext,
    main: Target,
    info: Target,

    quad: QuadRenderer,
    panel: InfoPanel,
    gui: GuiRenderer,

    shader_dir: PathBuf,
    shader_watcher: DirectoryWatcher,
    stopwatch: Stopwatch,
    fps_counter: FpsCounter,

    input: PointerInput,
    controller: Controller,
    camera: CameraState,
}

pub(crate) struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

/// A window together with the surface and swap chain presenting to it.
struct Target {
    window: Arc<Window>,
    surface: wgpu::Surface,
    swap_chain: Option<wgpu::SwapChain>,
    size: crate::Size,
}

struct DirectoryWatcher {
    _watcher: notify::RecommendedWatcher,
    events: std::sync::mpsc::Receiver<notify::DebouncedEvent>,
}

struct BindGroup {
    layout: wgpu::BindGroupLayout,
    bindings: wgpu::BindGroup,
}

struct Stopwatch {
    prev_time: std::time::Instant,
}

impl Stopwatch {
    pub fn new() -> Stopwatch {
        Stopwatch {
            prev_time: std::time::Instant::now(),
        }
    }

    pub fn tick(&mut self) -> std::time::Duration {
        let now = std::time::Instant::now();
        let duration = now.saturating_duration_since(self.prev_time);
        self.prev_time = now;
        duration
    }
}

struct FpsCounter {
    prev_time: std::time::Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub fn new() -> Self {
        FpsCounter {
            prev_time: std::time::Instant::now(),
            frames: 0,
            fps: f32::NAN,
        }
    }

    pub fn tick(&mut self) {
        let now = std::time::Instant::now();
        self.tick_at(now);
    }

    fn tick_at(&mut self, now: std::time::Instant) {
        let elapsed = now.saturating_duration_since(self.prev_time).as_secs_f32();
        self.frames += 1;
        if elapsed > 0.25 {
            self.fps = self.frames as f32 / elapsed;
            self.prev_time = now;
            self.frames = 0;
        }
    }
}

// Context creation
impl Context {
    pub async fn new(
        options: &Options,
        main_window: Arc<Window>,
        info_window: Arc<Window>,
    ) -> anyhow::Result<Context> {
        let instance = wgpu::Instance::new(wgpu::BackendBit::PRIMARY);
        let main_surface = unsafe { instance.create_surface(main_window.as_ref()) };
        let info_surface = unsafe { instance.create_surface(info_window.as_ref()) };

        let gpu = Self::create_gpu_context(instance, &main_surface).await?;
        info!(adapter = ?gpu.adapter.get_info(), "created gpu context");

        let main = Target::new(&gpu, main_window, main_surface);
        let info = Target::new(&gpu, info_window, info_surface);

        let shader_dir = options.shaders.clone();
        let quad = QuadRenderer::new(&gpu, &shader_dir, options.texture.as_deref())
            .context("failed to create quad renderer")?;
        let gui = GuiRenderer::new(&gpu, &shader_dir).context("failed to create gui renderer")?;
        let shader_watcher = DirectoryWatcher::new(&shader_dir)?;

        let camera = CameraState::new(options.position, options.yaw, options.pitch);
        info!(
            position = ?camera.position(),
            yaw = camera.yaw(),
            pitch = camera.pitch(),
            "initial camera"
        );

        Ok(Context {
            gpu,
            main,
            info,

            quad,
            panel: InfoPanel::new(),
            gui,

            shader_dir,
            shader_watcher,
            stopwatch: Stopwatch::new(),
            fps_counter: FpsCounter::new(),

            input: PointerInput::new(),
            controller: Controller::new(options.sensitivity),
            camera,
        })
    }

    async fn create_gpu_context(
        instance: wgpu::Instance,
        surface: &wgpu::Surface,
    ) -> anyhow::Result<GpuContext> {
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
            })
            .await
            .context("failed to find compatible graphics adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .context("failed to find device")?;

        Ok(GpuContext {
            instance,
            adapter,
            device,
            queue,
        })
    }

    fn reload_shaders(&mut self) {
        // on failure the previous pipelines stay in use
        if let Err(error) = self.quad.recreate_pipeline(&self.gpu, &self.shader_dir) {
            error!("failed to reload quad shaders: {:?}", error);
        }
        if let Err(error) = self.gui.recreate_pipeline(&self.gpu, &self.shader_dir) {
            error!("failed to reload gui shaders: {:?}", error);
        }
    }
}

impl Target {
    fn new(gpu: &GpuContext, window: Arc<Window>, surface: wgpu::Surface) -> Target {
        let size = window.inner_size();
        let swap_chain = Self::create_swap_chain(gpu, &surface, size);
        Target {
            window,
            surface,
            swap_chain,
            size,
        }
    }

    fn create_swap_chain(
        gpu: &GpuContext,
        surface: &wgpu::Surface,
        size: crate::Size,
    ) -> Option<wgpu::SwapChain> {
        // a minimized window has no area to present to
        if size.width == 0 || size.height == 0 {
            return None;
        }

        let descriptor = wgpu::SwapChainDescriptor {
            usage: wgpu::TextureUsage::RENDER_ATTACHMENT,
            format: SWAP_CHAIN_FORMAT,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
        };

        Some(gpu.device.create_swap_chain(surface, &descriptor))
    }

    fn resize(&mut self, gpu: &GpuContext, new_size: crate::Size) {
        if self.size == new_size {
            return;
        }

        info!(window = ?self.window.id(), ?new_size, "window was resized");
        self.size = new_size;
        self.recreate_swap_chain(gpu);
    }

    fn recreate_swap_chain(&mut self, gpu: &GpuContext) {
        info!("recreating swap chain");
        self.swap_chain = Self::create_swap_chain(gpu, &self.surface, self.size);
    }

    fn scale_factor(&self) -> f32 {
        self.window.scale_factor() as f32
    }

    /// Fetches the texture to draw into, or `None` while the window has no area.
    fn get_next_frame(
        &mut self,
        gpu: &GpuContext,
    ) -> anyhow::Result<Option<wgpu::SwapChainFrame>> {
        for _attempt in 0..8 {
            let swap_chain = match &self.swap_chain {
                Some(swap_chain) => swap_chain,
                None => return Ok(None),
            };

            match swap_chain.get_current_frame() {
                Ok(frame) => return Ok(Some(frame)),
                Err(wgpu::SwapChainError::Timeout) => {
                    warn!("timed out waiting for the next frame");
                    return Ok(None);
                }
                Err(wgpu::SwapChainError::Outdated) => {
                    warn!("swap chain outdated");
                    self.size = self.window.inner_size();
                    self.recreate_swap_chain(gpu);
                }
                Err(wgpu::SwapChainError::Lost) => {
                    warn!("swap chain lost");
                    self.recreate_swap_chain(gpu);
                }
                Err(e) => return Err(e).context("could not get next frame in swap chain"),
            }
        }

        Err(anyhow!("failed to fetch next frame in swap chain"))
    }
}

// Event handling
impl Context {
    pub fn handle_event(
        &mut self,
        event: Event<()>,
        flow: &mut ControlFlow,
    ) -> anyhow::Result<()> {
        match event {
            Event::MainEventsCleared => {
                self.poll_shader_watcher();

                self.fps_counter.tick();
                let dt = self.stopwatch.tick().as_secs_f32();

                self.render(dt).context("failed to render frame")?;
            }
            Event::WindowEvent { window_id, event } => {
                if window_id == self.main.window.id() {
                    self.handle_main_event(event, flow);
                } else if window_id == self.info.window.id() {
                    self.handle_info_event(event, flow);
                }
            }
            Event::LoopDestroyed => info!("shutting down"),
            _ => {}
        }

        Ok(())
    }

    fn handle_main_event(&mut self, event: WindowEvent, flow: &mut ControlFlow) {
        match &event {
            WindowEvent::Resized(new_size) => self.main.resize(&self.gpu, *new_size),
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                self.main.resize(&self.gpu, **new_inner_size)
            }
            _ => {}
        }

        let scale_factor = self.main.window.scale_factor();
        let events = self.input.translate(&event, scale_factor);
        if let Flow::Quit = self.controller.drain(&mut self.camera, events) {
            *flow = ControlFlow::Exit;
        }
    }

    fn handle_info_event(&mut self, event: WindowEvent, flow: &mut ControlFlow) {
        match &event {
            WindowEvent::Resized(new_size) => self.info.resize(&self.gpu, *new_size),
            WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                self.info.resize(&self.gpu, **new_inner_size)
            }
            event if crate::input::is_quit_request(event) => {
                info!("quit requested from info window");
                *flow = ControlFlow::Exit;
            }
            event => self
                .panel
                .handle_event(event, self.info.window.scale_factor()),
        }
    }

    fn poll_shader_watcher(&mut self) {
        let mut changed = false;

        while let Ok(event) = self.shader_watcher.events.try_recv() {
            match event {
                notify::DebouncedEvent::Create(path)
                | notify::DebouncedEvent::Write(path)
                | notify::DebouncedEvent::Chmod(path)
                | notify::DebouncedEvent::Remove(path)
                | notify::DebouncedEvent::Rename(_, path) => {
                    // compiled binaries are written by the reload itself
                    if !shader::is_binary(&path) {
                        debug!(path = %path.display(), "shader changed");
                        changed = true;
                    }
                }
                notify::DebouncedEvent::Rescan
                | notify::DebouncedEvent::NoticeWrite(_)
                | notify::DebouncedEvent::NoticeRemove(_) => { /* ignore */ }
                notify::DebouncedEvent::Error(error, path) => {
                    error!(?path, "while watching shader directory: {}", error);
                }
            }
        }

        if changed {
            self.reload_shaders();
        }
    }
}

// Rendering
impl Context {
    fn render(&mut self, dt: f32) -> anyhow::Result<()> {
        crate::frame::submit(&self.camera, &quad::CORNERS, &mut self.quad, &mut self.panel);
        self.panel.set_fps(self.fps_counter.fps);

        if let Some(frame) = self.main.get_next_frame(&self.gpu)? {
            self.quad.render(&self.gpu, &frame.output.view);
        }

        let size = self.info.size;
        let scale_factor = self.info.scale_factor();
        let meshes = self.panel.run(size, scale_factor, dt);

        if let Some(frame) = self.info.get_next_frame(&self.gpu)? {
            let texture = self.panel.texture();
            self.gui
                .prepare(&self.gpu, meshes, &texture, size, scale_factor);
            self.gui.render(&self.gpu, &frame.output.view);
        }

        Ok(())
    }
}

impl BindGroup {
    pub fn from_entries(
        layout: &[wgpu::BindGroupLayoutEntry],
        bindings: &[wgpu::BindGroupEntry],
        gpu: &GpuContext,
    ) -> BindGroup {
        let layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: None,
                entries: layout,
            });

        let bindings = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &layout,
            entries: bindings,
        });

        BindGroup { layout, bindings }
    }

    pub fn update_bindings(&mut self, new_bindings: &[wgpu::BindGroupEntry], gpu: &GpuContext) {
        self.bindings = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: None,
            layout: &self.layout,
            entries: new_bindings,
        });
    }
}

impl DirectoryWatcher {
    fn new(path: impl AsRef<std::path::Path>) -> anyhow::Result<DirectoryWatcher> {
        use notify::Watcher;

        let path = path.as_ref();
        let (tx, rx) = std::sync::mpsc::channel();

        let mut watcher = notify::watcher(tx, std::time::Duration::from_millis(500))
            .context("failed to create file system watcher")?;

        watcher
            .watch(path, notify::RecursiveMode::Recursive)
            .with_context(|| format!("failed to watch over directory `{}`", path.display()))?;

        Ok(DirectoryWatcher {
            _watcher: watcher,
            events: rx,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn fps_updates_after_quarter_second() {
        let start = Instant::now();
        let mut counter = FpsCounter {
            prev_time: start,
            frames: 0,
            fps: f32::NAN,
        };

        counter.tick_at(start + Duration::from_millis(100));
        assert!(counter.fps.is_nan());

        counter.tick_at(start + Duration::from_millis(500));
        assert!((counter.fps - 4.0).abs() < 1e-3);
        assert_eq!(counter.frames, 0);
    }

    #[test]
    fn stopwatch_measures_between_ticks() {
        let mut stopwatch = Stopwatch::new();
        stopwatch.prev_time -= Duration::from_millis(20);
        assert!(stopwatch.tick() >= Duration::from_millis(20));
        assert!(stopwatch.tick() < Duration::from_secs(1));
    }

    #[test]
    fn watching_missing_directory_fails() {
        let error = DirectoryWatcher::new("definitely/not/a/shader/dir").err().unwrap();
        assert!(format!("{:#}", error).contains("failed to watch"));
    }
}
