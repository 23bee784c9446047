//! soar3d terminal demo
//!
//! Watches a few gliders circling over a hill through the cinematic camera.
//! Usage: `soar3d-terminal [config.toml]`
//!
//! Controls:
//!   - 1/2/3/4: Self, group, plan and tile views
//!   - Arrow keys: Orbit and raise/lower the eye
//!   - WASD: Pan
//!   - U: Toggle which glider plan view favours
//!   - Q/ESC: Quit

use soar3d_core::{Config, EngineConfig};
use soar3d_terminal::{AppError, TerminalApp};

fn main() -> Result<(), AppError> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading configuration from {}", path);
            EngineConfig::load_from_file(&path)?
        }
        None => EngineConfig::default(),
    };
    config.validate()?;

    let mut app = TerminalApp::new(config)?;
    app.run()?;

    println!("Thanks for flying soar3d!");
    Ok(())
}
