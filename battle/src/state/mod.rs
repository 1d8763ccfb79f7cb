//! Mutable belief-state records

mod battle;
mod field;
mod moveset;
mod pokemon;
mod stats;
mod status;
mod switch_in;
mod team;

pub use battle::{BattleState, MonRef, split_hidden_power};
pub use field::{FieldState, WEATHER_TURNS, Weather, WeatherState};
pub use moveset::{MAX_MOVES, MoveSlot, Moveset};
pub use pokemon::{HpTracker, NO_ITEM, Pokemon, VolatileState};
pub use stats::{MAX_STAGE, StatRange, StatStages, StatTable, clamp_stage};
pub use status::{Status, Volatile};
pub use switch_in::{SwitchIn, SwitchInBuilder};
pub use team::{BatonPass, SideConditionState, Team, condition_id};
