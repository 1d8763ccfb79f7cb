//! Move rule wrapper

use std::fmt;

use super::data::{MoveCategory, MoveData};
use super::types::Type;
use crate::state::{BattleState, MonRef};

/// Moves Forewarn treats as 120 power
const FOREWARN_COUNTERS: &[&str] = &["counter", "mirrorcoat", "metalburst"];

#[derive(Clone, Copy)]
pub struct Move<'a> {
    id: &'a str,
    data: &'a MoveData,
}

impl<'a> Move<'a> {
    pub fn new(id: &'a str, data: &'a MoveData) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.data.name
    }

    pub fn data(&self) -> &'a MoveData {
        self.data
    }

    /// PP with every PP Up applied
    pub fn max_pp(&self) -> u32 {
        self.data.pp * 8 / 5
    }

    pub fn move_type(&self) -> Type {
        self.data.move_type
    }

    pub fn is_damaging(&self) -> bool {
        self.data.category != MoveCategory::Status
    }

    pub fn makes_contact(&self) -> bool {
        self.data.flags.contact
    }

    pub fn is_sound(&self) -> bool {
        self.data.flags.sound
    }

    /// Types this move may have when `user` uses it.
    ///
    /// Hidden Power takes the user's hidden power type.
    pub fn possible_types(&self, state: &BattleState, user: MonRef) -> Vec<Type> {
        if self.id != "hiddenpower" {
            return vec![self.data.move_type];
        }
        let class = state.mon(user).hp_type;
        state
            .inference
            .domain(class)
            .iter()
            .filter_map(|id| Type::from_protocol(id))
            .collect()
    }

    /// Power Forewarn ranks this move by
    pub fn forewarn_power(&self) -> u32 {
        if self.data.ohko {
            160
        } else if FOREWARN_COUNTERS.contains(&self.id) {
            120
        } else if self.data.base_power == 0 && self.is_damaging() {
            80
        } else {
            self.data.base_power
        }
    }
}

impl fmt::Debug for Move<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Move").field(&self.id).finish()
    }
}
