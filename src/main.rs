#[macro_use]
extern crate tracing;

#[macro_use]
mod macros;

mod camera;
mod context;
mod controller;
mod frame;
mod input;
mod linear;
mod options;
mod readout;

use anyhow::Context as _;
use clap::Parser;
use std::sync::Arc;
use winit::dpi::{LogicalPosition, LogicalSize};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

pub(crate) type Size = winit::dpi::PhysicalSize<u32>;

/// Horizontal gap between the main and info windows, in logical pixels.
const WINDOW_GAP: u32 = 40;

fn main() {
    let options = options::Options::parse();
    init_logging(options.verbose);

    if let Err(error) = run(options) {
        error!("{:?}", error);
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(options: options::Options) -> anyhow::Result<()> {
    info!(?options, "starting");

    let event_loop = EventLoop::new();
    let size = LogicalSize::new(options.size, options.size);

    let main_window = WindowBuilder::new()
        .with_title("Main")
        .with_inner_size(size)
        .build(&event_loop)
        .context("failed to create main window")?;

    let info_window = WindowBuilder::new()
        .with_title("Info")
        .with_inner_size(size)
        .build(&event_loop)
        .context("failed to create info window")?;

    info!(size = options.size, "created windows");

    // place the info window to the right of the main window
    if let Ok(position) = main_window.outer_position() {
        let position = position.to_logical::<i32>(main_window.scale_factor());
        info_window.set_outer_position(LogicalPosition::new(
            position.x + (options.size + WINDOW_GAP) as i32,
            position.y,
        ));
    }

    let main_window = Arc::new(main_window);
    let info_window = Arc::new(info_window);

    let mut context = pollster::block_on(context::Context::new(
        &options,
        main_window,
        info_window,
    ))?;

    event_loop.run(move |event, _, flow| {
        *flow = ControlFlow::Poll;

        if let Err(error) = context.handle_event(event, flow) {
            error!("{:?}", error);
            *flow = ControlFlow::Exit;
        }
    })
}
