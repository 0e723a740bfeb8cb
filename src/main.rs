mod app;
mod camera;
mod config;
mod galaxy;
mod gpu;
mod scenery;

use winit::event_loop::{ControlFlow, EventLoop};

use crate::app::App;

fn main() -> Result<(), winit::error::EventLoopError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = config::seed_from_env();
    match seed {
        Some(seed) => log::info!("Using seed {}", seed),
        None => log::info!("Using a random seed (set {} to fix it)", config::SEED_ENV_VAR),
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(seed);
    event_loop.run_app(&mut app)
}
