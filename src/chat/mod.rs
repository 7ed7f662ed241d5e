//! Stateful chat sessions: message history, streaming accumulation, and
//! turn orchestration.

pub mod accumulator;
pub mod controller;
pub mod error;
pub mod models;
pub mod session;

pub use accumulator::StreamingTurn;
pub use controller::{EmptyReplyPolicy, TurnController, TurnOutcome};
pub use error::TurnError;
pub use models::{Message, Sender, Transcript};
pub use session::{Session, SessionInfo, SessionRegistry, TurnGuard};
