//! Async per-battle driver for the `deduce-battle` inference engine.
//!
//! One [`BattleHandler`] follows one battle: it consumes [`ServerFrame`]s
//! from any stream, keeps the belief state current, and answers requests
//! with the choices a [`BattleAgent`] ranks, through a [`ChoiceSender`].
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use deduce_client::{AgentConfig, BattleHandler, ChannelSender, ConfiguredAgent, HandlerConfig};
//!
//! let agent = ConfiguredAgent::from(AgentConfig::from_json(r#"{"kind": "random", "seed": 1}"#)?);
//! let sender = ChannelSender::new(room_id, outgoing);
//! let mut handler = BattleHandler::new(Arc::new(dex), agent, sender, HandlerConfig::default());
//!
//! let result = handler.run(frames).await?;
//! println!("winner: {:?}", result.winner);
//! ```

mod agent;
mod config;
mod error;
mod handler;
mod sender;

pub use agent::{BattleAgent, ConfiguredAgent, FirstChoiceAgent, RandomAgent};
pub use config::{AgentConfig, AgentKind, HandlerConfig};
pub use error::RejectedChoiceError;
pub use handler::{BattleHandler, BattleResult};
pub use sender::{ChannelSender, ChoiceSender};

pub use deduce_protocol::{Choice, ServerFrame, parse_server_frame};
