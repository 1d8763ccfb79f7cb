//! Fixtures shared by the unit tests

use deduce_protocol::{BattleEvent, HpStatus, Player, parse_server_message};

use crate::dex::Dex;
use crate::state::{BattleState, MonRef, SwitchInBuilder};

pub const DEX_JSON: &str = include_str!("../tests/data/dex.json");

pub fn dex() -> Dex {
    Dex::from_json(DEX_JSON).unwrap()
}

pub fn events(lines: &[&str]) -> Vec<BattleEvent> {
    lines
        .iter()
        .map(|line| parse_server_message(line).unwrap())
        .collect()
}

/// Two revealed pokemon facing each other, p1's first
pub struct Fixture {
    pub dex: Dex,
    pub state: BattleState,
}

impl Fixture {
    pub fn new(p1: &str, p2: &str) -> Self {
        let mut fixture = Fixture {
            dex: dex(),
            state: BattleState::new(),
        };
        fixture.send_in(Player::P1, p1);
        fixture.send_in(Player::P2, p2);
        fixture
    }

    pub fn send_in(&mut self, player: Player, species: &str) -> MonRef {
        let info = SwitchInBuilder::new(player, species)
            .species(species)
            .hp(HpStatus::parse("100/100").unwrap())
            .build()
            .unwrap();
        let mon = self.state.reveal(&self.dex, &info).unwrap();
        if let Some(previous) = self.state.active(player) {
            self.state.mon_mut(previous).switch_out();
        }
        self.state.team_mut(player).active = Some(mon.index);
        self.state.mon_mut(mon).active = true;
        mon
    }

    pub fn p1(&self) -> MonRef {
        self.state.active(Player::P1).unwrap()
    }

    pub fn p2(&self) -> MonRef {
        self.state.active(Player::P2).unwrap()
    }
}
