use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use deduce_battle::{BattleState, Dex, Player};
use deduce_client::{BattleAgent, BattleHandler, ChannelSender, HandlerConfig, parse_server_frame};
use deduce_protocol::Choice;
use futures_util::stream;
use tokio::sync::mpsc;

const DEX_JSON: &str = include_str!("../../battle/tests/data/dex.json");
const ROOM: &str = "battle-gen4randombattle-1";

/// Ranks switches first and records what it was asked
#[derive(Clone, Default)]
struct SwitchFirstAgent {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<Vec<Choice>>>>,
}

impl BattleAgent for SwitchFirstAgent {
    async fn rank(&mut self, _state: &BattleState, choices: &mut [Choice]) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(choices.to_vec());
        choices.sort_by_key(|c| !c.is_switch());
        Ok(())
    }
}

fn request(rqid: u64, trapped: bool) -> String {
    format!(
        r#">{ROOM}
|request|{{"active":[{{"moves":[{{"move":"Thunderbolt","id":"thunderbolt","pp":24,"maxpp":24,"target":"normal","disabled":false}}],"trapped":{trapped}}}],"side":{{"name":"Alice","id":"p1","pokemon":[{{"ident":"p1: Pikachu","details":"Pikachu, L88, M","condition":"211/211","active":true,"stats":{{"atk":170,"def":140,"spa":160,"spd":150,"spe":240}},"moves":["thunderbolt"],"baseAbility":"static","item":"lightball"}},{{"ident":"p1: Snorlax","details":"Snorlax, L80, F","condition":"400/400","active":false,"stats":{{"atk":250,"def":180,"spa":160,"spd":250,"spe":100}},"moves":["bodyslam"],"baseAbility":"thickfat","item":"leftovers"}}]}},"rqid":{rqid}}}"#
    )
}

fn battle_start() -> String {
    format!(
        ">{ROOM}
|player|p1|Alice|1|
|player|p2|Bob|2|
|teamsize|p1|2
|teamsize|p2|1
|gametype|singles
|gen|4
|tier|[Gen 4] Random Battle
|start
|switch|p1a: Pikachu|Pikachu, L88, M|211/211
|switch|p2a: Dugtrio|Dugtrio, L84, M|100/100
|turn|1"
    )
}

fn frames(raw: Vec<String>) -> impl futures_util::Stream<Item = Result<deduce_client::ServerFrame>> + Unpin {
    stream::iter(raw.into_iter().map(|frame| parse_server_frame(&frame)))
}

fn handler(
    agent: SwitchFirstAgent,
    config: HandlerConfig,
) -> (BattleHandler<SwitchFirstAgent, ChannelSender>, mpsc::Receiver<String>) {
    let dex = Arc::new(Dex::from_json(DEX_JSON).unwrap());
    let (tx, rx) = mpsc::channel(16);
    let sender = ChannelSender::new(ROOM, tx);
    (BattleHandler::new(dex, agent, sender, config), rx)
}

fn sent(rx: &mut mpsc::Receiver<String>) -> Vec<String> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

#[tokio::test]
async fn test_lead_request_offers_move_and_bench_switch() {
    let agent = SwitchFirstAgent::default();
    let (mut handler, mut rx) = handler(agent.clone(), HandlerConfig::default());

    let result = handler
        .run(frames(vec![request(1, false), battle_start()]))
        .await
        .unwrap();
    assert!(result.truncated);

    let seen = agent.seen.lock().unwrap().clone();
    assert_eq!(seen, vec![vec![Choice::Move(1), Choice::Switch(2)]]);
    assert_eq!(sent(&mut rx), vec![format!("{ROOM}|/choose switch 2|1")]);
}

#[tokio::test]
async fn test_unavailable_switch_reuses_ranking() {
    let agent = SwitchFirstAgent::default();
    let (mut handler, mut rx) = handler(agent.clone(), HandlerConfig::default());

    let trapped = format!(
        ">{ROOM}\n|error|[Unavailable choice] Can't switch: The active Pokémon is trapped\n{}",
        request(2, true).lines().skip(1).collect::<Vec<_>>().join("\n")
    );
    let result = handler
        .run(frames(vec![
            request(1, false),
            battle_start(),
            trapped,
            format!(">{ROOM}\n|win|Alice"),
        ]))
        .await
        .unwrap();

    assert_eq!(result.winner.as_deref(), Some("Alice"));
    assert!(!result.truncated);
    assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        sent(&mut rx),
        vec![
            format!("{ROOM}|/choose switch 2|1"),
            format!("{ROOM}|/choose move 1|2"),
        ]
    );

    // only arena trap could have kept pikachu in
    let state = handler.parser().state();
    let dugtrio = state.active(Player::P2).unwrap();
    let ability = state.mon(dugtrio).ability;
    assert_eq!(state.inference.definite(ability), Some("arenatrap"));
}

#[tokio::test]
async fn test_invalid_choice_sends_next_best() {
    let agent = SwitchFirstAgent::default();
    let (mut handler, mut rx) = handler(agent.clone(), HandlerConfig::default());

    handler
        .run(frames(vec![
            request(1, false),
            battle_start(),
            format!(">{ROOM}\n|error|[Invalid choice] Can't switch: You can't switch to an active Pokémon"),
        ]))
        .await
        .unwrap();

    assert_eq!(agent.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        sent(&mut rx),
        vec![
            format!("{ROOM}|/choose switch 2|1"),
            format!("{ROOM}|/choose move 1|1"),
        ]
    );
}

#[tokio::test]
async fn test_retry_limit_is_fatal() {
    let agent = SwitchFirstAgent::default();
    let config = HandlerConfig {
        max_choice_retries: 0,
        ..HandlerConfig::default()
    };
    let (mut handler, _rx) = handler(agent, config);

    let outcome = handler
        .run(frames(vec![
            request(1, false),
            battle_start(),
            format!(">{ROOM}\n|error|[Invalid choice] Can't switch: You can't switch to an active Pokémon"),
        ]))
        .await;
    assert!(outcome.is_err());
}

#[tokio::test]
async fn test_turn_limit_truncates() {
    let agent = SwitchFirstAgent::default();
    let config = HandlerConfig {
        max_turns: Some(0),
        ..HandlerConfig::default()
    };
    let (mut handler, mut rx) = handler(agent.clone(), config);

    let result = handler
        .run(frames(vec![request(1, false), battle_start()]))
        .await
        .unwrap();
    assert!(result.truncated);
    assert_eq!(agent.calls.load(Ordering::SeqCst), 0);
    assert!(sent(&mut rx).is_empty());
}

#[tokio::test]
async fn test_unknown_species_aborts() {
    let (mut handler, _rx) = handler(SwitchFirstAgent::default(), HandlerConfig::default());
    let frame = format!(">{ROOM}\n|gen|4\n|start\n|switch|p2a: Mew|Mew, L70|100/100");
    assert!(handler.run(frames(vec![frame])).await.is_err());
}
