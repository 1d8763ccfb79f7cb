//! Event-matching routines shared by the rule wrappers
//!
//! Each parser peeks at the next event, checks its shape against an
//! expected effect on one pokemon, and only then consumes it through
//! [`ParserContext::apply_next`](super::ParserContext::apply_next) so the
//! ordinary state update runs. A caller-supplied `accept` predicate inspects
//! the `[from]`/`[of]` suffixes to tell effects with the same shape apart.

pub mod boost;
pub mod cure;
pub mod damage;
pub mod status;

use deduce_protocol::{KwArgs, to_id};

pub use boost::{BoostTable, match_boost, parse_boosts};
pub use cure::{parse_cure, parse_volatile_end};
pub use damage::{parse_damage, parse_heal};
pub use status::{can_status, observe_status, parse_status};

/// `[from] ability: X` names the ability `id`
pub fn from_ability(kwargs: &KwArgs, id: &str) -> bool {
    kwargs.from_ability().is_some_and(|name| to_id(name) == id)
}

/// `[from] item: X` names the item `id`
pub fn from_item(kwargs: &KwArgs, id: &str) -> bool {
    kwargs.from_item().is_some_and(|name| to_id(name) == id)
}

/// The effect carries no `[from]` attribution
pub fn unattributed(kwargs: &KwArgs) -> bool {
    kwargs.from.is_none()
}

pub fn any(_: &KwArgs) -> bool {
    true
}
