//! Battle-state inference for Pokemon Showdown gen 4 singles.
//!
//! This crate keeps a belief state about a battle from one player's point of
//! view and narrows what the opponent could be hiding (abilities, items,
//! moves, hidden power types) from what the protocol log shows.
//!
//! # Overview
//!
//! `deduce-battle` sits between `deduce-protocol` (wire format) and the async
//! driver:
//!
//! ```text
//! deduce-protocol (events + requests)
//!        │
//!        ▼
//! deduce-battle (belief state + inference) ← THIS CRATE
//!        │
//!        └─> deduce-client (choice loop, agents)
//! ```
//!
//! # Main Types
//!
//! ## Inference
//! - [`Inference`] - Arena of possibility classes and the sub-reasons over them
//! - [`SubReason`], [`Reasons`] - "class X is one of these values" predicates
//!
//! ## Rules
//! - [`Dex`] - Read-only species/ability/item/move tables loaded from JSON
//! - [`Ability`], [`Item`], [`Move`] - Rule wrappers with legality checks and effect parsers
//!
//! ## State
//! - [`BattleState`] - Both teams, the field and the inference arena
//! - [`BattleParser`] - Consumes event batches and reports [`Progress`]
//!
//! # Example Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use deduce_battle::{BattleParser, Dex, Progress};
//! use deduce_protocol::parse_server_frame;
//!
//! let dex = Arc::new(Dex::from_json(&json)?);
//! let mut parser = BattleParser::new(dex);
//!
//! for progress in parser.feed(&parse_server_frame(frame)?.events)? {
//!     if let Progress::Decide { choices, .. } = progress {
//!         println!("{} legal choices", choices.len());
//!     }
//! }
//!
//! println!("{}", parser.state().snapshot()?);
//! ```

pub mod dex;
pub mod error;
pub mod inference;
pub mod parser;
pub mod state;

#[cfg(test)]
mod testing;

pub use dex::{Ability, Dex, Effectiveness, Item, Move, Type};
pub use error::{BattleError, ContradictionError, Result};
pub use inference::{ClassId, Inference, ReasonState, Reasons, SubReason};
pub use parser::{BattleParser, MoveContext, Phase, Progress, legal_choices};
pub use state::{BattleState, MonRef, Pokemon, Status, Team, Volatile, Weather};

// Re-export commonly used protocol types
pub use deduce_protocol::{Choice, Player, Stat};
