//! # PuzzleBot
//!
//! Host-side driver for the PuzzleBot pick-and-place stage, a TinyG motion
//! controller in JSON mode reachable through a TCP serial bridge.
//!
//! ## Architecture
//!
//! PuzzleBot is organized as a workspace with multiple crates:
//!
//! 1. **puzzlebot-core** - Coordinates, translators, machine status, errors, events
//! 2. **puzzlebot-communication** - TCP transport, TinyG protocol, motion controller, jog
//! 3. **puzzlebot-settings** - Parameter store and structured configuration
//! 4. **puzzlebot** - Console binary tying the crates together

pub mod console;

pub use puzzlebot_communication::{
    JogController, JogDirection, MachineSnapshot, MotionController, MotionTimeouts,
    NudgeIncrements, TcpConnectionInfo,
};

pub use puzzlebot_core::{
    Axis, ControllerError, ControllerEvent, Coord, CoordCmd, CoordTranslator, Error,
    MachineStatus, MoveType, Result,
};

pub use puzzlebot_settings::{Config, ParameterStore};

/// Initialize tracing/logging
///
/// Honors `RUST_LOG`; defaults to INFO. Output goes to stderr so the
/// console keeps stdout to itself.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
