//! Stat stages and stat ranges

use deduce_protocol::{PokemonStats, Stat};
use serde::Serialize;

use crate::dex::BaseStats;

pub const MAX_STAGE: i8 = 6;

/// Clamp a boost stage to [-6, 6]
pub fn clamp_stage(value: i32) -> i8 {
    value.clamp(-(MAX_STAGE as i32), MAX_STAGE as i32) as i8
}

/// Stat stages (-6 to +6)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatStages {
    pub atk: i8,
    pub def: i8,
    pub spa: i8,
    pub spd: i8,
    pub spe: i8,
    pub accuracy: i8,
    pub evasion: i8,
}

impl StatStages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: Stat) -> i8 {
        match stat {
            Stat::Atk => self.atk,
            Stat::Def => self.def,
            Stat::Spa => self.spa,
            Stat::Spd => self.spd,
            Stat::Spe => self.spe,
            Stat::Accuracy => self.accuracy,
            Stat::Evasion => self.evasion,
        }
    }

    fn slot(&mut self, stat: Stat) -> &mut i8 {
        match stat {
            Stat::Atk => &mut self.atk,
            Stat::Def => &mut self.def,
            Stat::Spa => &mut self.spa,
            Stat::Spd => &mut self.spd,
            Stat::Spe => &mut self.spe,
            Stat::Accuracy => &mut self.accuracy,
            Stat::Evasion => &mut self.evasion,
        }
    }

    /// Set stage for a stat (clamped to -6..+6)
    pub fn set(&mut self, stat: Stat, value: i8) {
        *self.slot(stat) = clamp_stage(value as i32);
    }

    /// Apply a boost, returns the change actually applied
    pub fn boost(&mut self, stat: Stat, amount: i8) -> i8 {
        let current = self.get(stat);
        let next = clamp_stage(current as i32 + amount as i32);
        self.set(stat, next);
        next - current
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn clear_positive(&mut self) {
        for stat in Stat::ALL {
            let slot = self.slot(stat);
            *slot = (*slot).min(0);
        }
    }

    pub fn clear_negative(&mut self) {
        for stat in Stat::ALL {
            let slot = self.slot(stat);
            *slot = (*slot).max(0);
        }
    }

    pub fn invert(&mut self) {
        for stat in Stat::ALL {
            let slot = self.slot(stat);
            *slot = -*slot;
        }
    }

    pub fn is_clear(&self) -> bool {
        Stat::ALL.iter().all(|s| self.get(*s) == 0)
    }
}

/// Inclusive range of a stat's possible values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatRange {
    pub min: u32,
    pub max: u32,
}

impl StatRange {
    pub fn exact(value: u32) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    pub fn is_exact(&self) -> bool {
        self.min == self.max
    }
}

/// Possible values of every stat, narrowed to exact values once a request reveals them
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatTable {
    pub hp: StatRange,
    pub atk: StatRange,
    pub def: StatRange,
    pub spa: StatRange,
    pub spd: StatRange,
    pub spe: StatRange,
}

impl StatTable {
    /// Gen 3+ stat formula over every IV, EV and nature combination
    pub fn from_base(base: &BaseStats, level: u8) -> Self {
        let level = level as u32;
        let hp = |b: u32| {
            if b == 1 {
                // Shedinja
                return StatRange::exact(1);
            }
            StatRange {
                min: 2 * b * level / 100 + level + 10,
                max: (2 * b + 31 + 63) * level / 100 + level + 10,
            }
        };
        let other = |b: u32| StatRange {
            min: (2 * b * level / 100 + 5) * 9 / 10,
            max: ((2 * b + 31 + 63) * level / 100 + 5) * 11 / 10,
        };

        Self {
            hp: hp(base.hp),
            atk: other(base.atk),
            def: other(base.def),
            spa: other(base.spa),
            spd: other(base.spd),
            spe: other(base.spe),
        }
    }

    /// Pin every stat to the values reported by a request
    pub fn reveal(&mut self, stats: &PokemonStats, max_hp: Option<u32>) {
        if let Some(max_hp) = max_hp {
            self.hp = StatRange::exact(max_hp);
        }
        self.atk = StatRange::exact(stats.atk);
        self.def = StatRange::exact(stats.def);
        self.spa = StatRange::exact(stats.spa);
        self.spd = StatRange::exact(stats.spd);
        self.spe = StatRange::exact(stats.spe);
    }

    pub fn get(&self, stat: Stat) -> Option<StatRange> {
        match stat {
            Stat::Atk => Some(self.atk),
            Stat::Def => Some(self.def),
            Stat::Spa => Some(self.spa),
            Stat::Spd => Some(self.spd),
            Stat::Spe => Some(self.spe),
            Stat::Accuracy | Stat::Evasion => None,
        }
    }
}
