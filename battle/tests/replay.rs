use std::sync::Arc;

use deduce_battle::{BattleParser, Dex, Player, Status};
use deduce_protocol::parse_server_frame;

const DEX_JSON: &str = include_str!("data/dex.json");

const LOG: &[&str] = &[
    ">battle-gen4randombattle-7
|player|p1|Alice|1|
|player|p2|Bob|2|
|teamsize|p1|1
|teamsize|p2|1
|gametype|singles
|gen|4
|tier|[Gen 4] Random Battle
|start
|switch|p1a: Snorlax|Snorlax, L80, F|100/100
|switch|p2a: Pikachu|Pikachu, L88, M|100/100
|turn|1",
    ">battle-gen4randombattle-7
|move|p2a: Pikachu|Thunderbolt|p1a: Snorlax
|-damage|p1a: Snorlax|70/100
|move|p1a: Snorlax|Body Slam|p2a: Pikachu
|-damage|p2a: Pikachu|20/100
|-status|p1a: Snorlax|par|[from] ability: Static|[of] p2a: Pikachu
|-heal|p1a: Snorlax|76/100|[from] item: Leftovers
|upkeep
|turn|2",
];

fn replay(dex: &Arc<Dex>) -> BattleParser {
    let mut parser = BattleParser::new(Arc::clone(dex));
    for frame in LOG {
        let frame = parse_server_frame(frame).unwrap();
        parser.feed(&frame.events).unwrap();
    }
    parser
}

#[test]
fn test_replay_is_deterministic() {
    let dex = Arc::new(Dex::from_json(DEX_JSON).unwrap());
    let first = replay(&dex).state().snapshot().unwrap();
    let second = replay(&dex).state().snapshot().unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_replay_reveals_ability_and_item() {
    let dex = Arc::new(Dex::from_json(DEX_JSON).unwrap());
    let parser = replay(&dex);
    let state = parser.state();
    assert_eq!(state.turn, 2);

    let snorlax = state.active(Player::P1).unwrap();
    let pikachu = state.active(Player::P2).unwrap();
    assert_eq!(state.mon(snorlax).status, Some(Status::Paralysis));
    assert_eq!(state.inference.definite(state.mon(snorlax).item), Some("leftovers"));
    assert_eq!(state.inference.definite(state.mon(pikachu).ability), Some("static"));
}
