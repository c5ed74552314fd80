//! Session simulation module
//!
//! All gameplay logic lives here:
//! - Path generation from an injected RNG
//! - Move validation and timer decay in `SessionEngine`
//! - Fixed timestep decay driven through `tick`
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod engine;
pub mod events;
pub mod path;
pub mod state;
pub mod tick;

pub use autopilot::{Autopilot, best_action};
pub use engine::{EndCause, MoveOutcome, SessionEngine, SessionResult};
pub use events::GameEvent;
pub use path::{FlipPolicy, PathGenerator, START_DIRECTION};
pub use state::{
    Direction, History, InputAction, SessionPhase, SessionSnapshot, SessionState, StepPath,
};
pub use tick::{DecayClock, TickInput, tick};
