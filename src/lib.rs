pub mod combat;
pub mod core;
#[cfg(feature = "network")]
pub mod oracle;
pub mod session;

// module re-exports
pub use crate::combat::{AdjudicationError, CombatConfig, CombatResolver, Verdict};
pub use crate::core::definitions::{DestinationMask, GameEvent, GameResult, InputEvent, MoveOutcome, Square};
pub use crate::core::engine::{Board, Color, Personality, Piece, PieceKind};
pub use crate::core::game::Game;
pub use crate::session::{GameSession, InputResponse, SessionError};
