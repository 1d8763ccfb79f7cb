pub mod battle;
pub mod battle_init;
pub mod battle_major;
pub mod battle_minor;
pub mod battle_progress;
pub mod kwargs;
pub mod request;
mod tests;

use anyhow::Result;

use battle::{GameType, HpStatus, Player, PokemonDetails, PokemonIdent, Side, Stat};
use kwargs::KwArgs;
use request::BattleRequest;

/// One decoded battle protocol line.
///
/// The set of tags is closed: consumers match exhaustively, and anything the
/// battle engine cannot model lands in [`BattleEvent::Unsupported`] or
/// [`BattleEvent::Raw`] instead of being dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum BattleEvent {
    // === Initialization ===
    Player {
        player: Player,
        username: String,
        avatar: String,
        rating: Option<u32>,
    },
    TeamSize {
        player: Player,
        size: u8,
    },
    GameType(GameType),
    Gen(u8),
    Tier(String),
    Rated(Option<String>),
    Rule(String),
    ClearPoke,
    Poke {
        player: Player,
        details: PokemonDetails,
        has_item: bool,
    },
    TeamPreview(Option<u8>),
    Start,

    // === Progress ===
    Request(Box<BattleRequest>),
    Error(ChoiceError),
    Inactive(String),
    InactiveOff(String),
    Upkeep,
    Turn(u32),
    Win(String),
    Tie,
    /// End of one server frame: no further events until the next batch
    Halt,

    // === Major actions ===
    Move {
        pokemon: PokemonIdent,
        move_name: String,
        target: Option<PokemonIdent>,
        kwargs: KwArgs,
    },
    Switch {
        pokemon: PokemonIdent,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Drag {
        pokemon: PokemonIdent,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    DetailsChange {
        pokemon: PokemonIdent,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    FormeChange {
        pokemon: PokemonIdent,
        species: String,
        hp_status: Option<HpStatus>,
        kwargs: KwArgs,
    },
    Replace {
        pokemon: PokemonIdent,
        details: PokemonDetails,
        hp_status: Option<HpStatus>,
    },
    Swap {
        pokemon: PokemonIdent,
        position: u8,
    },
    Cant {
        pokemon: PokemonIdent,
        reason: String,
        move_name: Option<String>,
        kwargs: KwArgs,
    },
    Faint(PokemonIdent),

    // === Minor actions ===
    Fail {
        pokemon: PokemonIdent,
        action: Option<String>,
        kwargs: KwArgs,
    },
    Block {
        pokemon: PokemonIdent,
        effect: String,
        kwargs: KwArgs,
    },
    NoTarget(Option<PokemonIdent>),
    Miss {
        source: PokemonIdent,
        target: Option<PokemonIdent>,
        kwargs: KwArgs,
    },
    Damage {
        pokemon: PokemonIdent,
        hp_status: Option<HpStatus>,
        kwargs: KwArgs,
    },
    Heal {
        pokemon: PokemonIdent,
        hp_status: Option<HpStatus>,
        kwargs: KwArgs,
    },
    SetHp {
        pokemon: PokemonIdent,
        hp_status: Option<HpStatus>,
        kwargs: KwArgs,
    },
    Status {
        pokemon: PokemonIdent,
        status: String,
        kwargs: KwArgs,
    },
    CureStatus {
        pokemon: PokemonIdent,
        status: String,
        kwargs: KwArgs,
    },
    CureTeam {
        pokemon: PokemonIdent,
        kwargs: KwArgs,
    },
    Boost {
        pokemon: PokemonIdent,
        stat: Stat,
        amount: i8,
        kwargs: KwArgs,
    },
    Unboost {
        pokemon: PokemonIdent,
        stat: Stat,
        amount: i8,
        kwargs: KwArgs,
    },
    SetBoost {
        pokemon: PokemonIdent,
        stat: Stat,
        amount: i8,
        kwargs: KwArgs,
    },
    SwapBoost {
        source: PokemonIdent,
        target: PokemonIdent,
        stats: Vec<Stat>,
        kwargs: KwArgs,
    },
    InvertBoost(PokemonIdent),
    ClearBoost(PokemonIdent),
    ClearAllBoost,
    ClearPositiveBoost {
        target: PokemonIdent,
        kwargs: KwArgs,
    },
    ClearNegativeBoost(PokemonIdent),
    CopyBoost {
        source: PokemonIdent,
        target: PokemonIdent,
        kwargs: KwArgs,
    },
    Weather {
        weather: String,
        kwargs: KwArgs,
    },
    FieldStart {
        condition: String,
        kwargs: KwArgs,
    },
    FieldEnd {
        condition: String,
        kwargs: KwArgs,
    },
    SideStart {
        side: Side,
        condition: String,
        kwargs: KwArgs,
    },
    SideEnd {
        side: Side,
        condition: String,
        kwargs: KwArgs,
    },
    VolatileStart {
        pokemon: PokemonIdent,
        effect: String,
        args: Vec<String>,
        kwargs: KwArgs,
    },
    VolatileEnd {
        pokemon: PokemonIdent,
        effect: String,
        kwargs: KwArgs,
    },
    Crit(PokemonIdent),
    SuperEffective(PokemonIdent),
    Resisted(PokemonIdent),
    Immune {
        pokemon: PokemonIdent,
        kwargs: KwArgs,
    },
    Item {
        pokemon: PokemonIdent,
        item: String,
        kwargs: KwArgs,
    },
    EndItem {
        pokemon: PokemonIdent,
        item: String,
        kwargs: KwArgs,
    },
    Ability {
        pokemon: PokemonIdent,
        ability: String,
        kwargs: KwArgs,
    },
    EndAbility {
        pokemon: PokemonIdent,
        kwargs: KwArgs,
    },
    Transform {
        pokemon: PokemonIdent,
        target: Option<PokemonIdent>,
        kwargs: KwArgs,
    },
    Activate {
        pokemon: Option<PokemonIdent>,
        effect: String,
        args: Vec<String>,
        kwargs: KwArgs,
    },
    Hint(String),
    Center,
    Message(String),
    Prepare {
        pokemon: PokemonIdent,
        move_name: String,
    },
    MustRecharge(PokemonIdent),
    Nothing,
    HitCount {
        pokemon: PokemonIdent,
        count: u8,
    },
    SingleMove {
        pokemon: PokemonIdent,
        move_name: String,
        kwargs: KwArgs,
    },
    SingleTurn {
        pokemon: PokemonIdent,
        move_name: String,
        kwargs: KwArgs,
    },

    /// A recognized tag from a mechanic this engine does not model
    Unsupported(String),
    /// Non-battle or unrecognized lines (chat, timestamps, room metadata)
    Raw(String),
}

impl BattleEvent {
    /// Protocol tag this event was decoded from, for logging
    pub fn tag(&self) -> &'static str {
        match self {
            BattleEvent::Player { .. } => "player",
            BattleEvent::TeamSize { .. } => "teamsize",
            BattleEvent::GameType(_) => "gametype",
            BattleEvent::Gen(_) => "gen",
            BattleEvent::Tier(_) => "tier",
            BattleEvent::Rated(_) => "rated",
            BattleEvent::Rule(_) => "rule",
            BattleEvent::ClearPoke => "clearpoke",
            BattleEvent::Poke { .. } => "poke",
            BattleEvent::TeamPreview(_) => "teampreview",
            BattleEvent::Start => "start",
            BattleEvent::Request(_) => "request",
            BattleEvent::Error(_) => "error",
            BattleEvent::Inactive(_) => "inactive",
            BattleEvent::InactiveOff(_) => "inactiveoff",
            BattleEvent::Upkeep => "upkeep",
            BattleEvent::Turn(_) => "turn",
            BattleEvent::Win(_) => "win",
            BattleEvent::Tie => "tie",
            BattleEvent::Halt => "halt",
            BattleEvent::Move { .. } => "move",
            BattleEvent::Switch { .. } => "switch",
            BattleEvent::Drag { .. } => "drag",
            BattleEvent::DetailsChange { .. } => "detailschange",
            BattleEvent::FormeChange { .. } => "-formechange",
            BattleEvent::Replace { .. } => "replace",
            BattleEvent::Swap { .. } => "swap",
            BattleEvent::Cant { .. } => "cant",
            BattleEvent::Faint(_) => "faint",
            BattleEvent::Fail { .. } => "-fail",
            BattleEvent::Block { .. } => "-block",
            BattleEvent::NoTarget(_) => "-notarget",
            BattleEvent::Miss { .. } => "-miss",
            BattleEvent::Damage { .. } => "-damage",
            BattleEvent::Heal { .. } => "-heal",
            BattleEvent::SetHp { .. } => "-sethp",
            BattleEvent::Status { .. } => "-status",
            BattleEvent::CureStatus { .. } => "-curestatus",
            BattleEvent::CureTeam { .. } => "-cureteam",
            BattleEvent::Boost { .. } => "-boost",
            BattleEvent::Unboost { .. } => "-unboost",
            BattleEvent::SetBoost { .. } => "-setboost",
            BattleEvent::SwapBoost { .. } => "-swapboost",
            BattleEvent::InvertBoost(_) => "-invertboost",
            BattleEvent::ClearBoost(_) => "-clearboost",
            BattleEvent::ClearAllBoost => "-clearallboost",
            BattleEvent::ClearPositiveBoost { .. } => "-clearpositiveboost",
            BattleEvent::ClearNegativeBoost(_) => "-clearnegativeboost",
            BattleEvent::CopyBoost { .. } => "-copyboost",
            BattleEvent::Weather { .. } => "-weather",
            BattleEvent::FieldStart { .. } => "-fieldstart",
            BattleEvent::FieldEnd { .. } => "-fieldend",
            BattleEvent::SideStart { .. } => "-sidestart",
            BattleEvent::SideEnd { .. } => "-sideend",
            BattleEvent::VolatileStart { .. } => "-start",
            BattleEvent::VolatileEnd { .. } => "-end",
            BattleEvent::Crit(_) => "-crit",
            BattleEvent::SuperEffective(_) => "-supereffective",
            BattleEvent::Resisted(_) => "-resisted",
            BattleEvent::Immune { .. } => "-immune",
            BattleEvent::Item { .. } => "-item",
            BattleEvent::EndItem { .. } => "-enditem",
            BattleEvent::Ability { .. } => "-ability",
            BattleEvent::EndAbility { .. } => "-endability",
            BattleEvent::Transform { .. } => "-transform",
            BattleEvent::Activate { .. } => "-activate",
            BattleEvent::Hint(_) => "-hint",
            BattleEvent::Center => "-center",
            BattleEvent::Message(_) => "-message",
            BattleEvent::Prepare { .. } => "-prepare",
            BattleEvent::MustRecharge(_) => "-mustrecharge",
            BattleEvent::Nothing => "-nothing",
            BattleEvent::HitCount { .. } => "-hitcount",
            BattleEvent::SingleMove { .. } => "-singlemove",
            BattleEvent::SingleTurn { .. } => "-singleturn",
            BattleEvent::Unsupported(_) => "unsupported",
            BattleEvent::Raw(_) => "raw",
        }
    }

    /// Keyword arguments attached to this event, if the tag carries any
    pub fn kwargs(&self) -> Option<&KwArgs> {
        match self {
            BattleEvent::Move { kwargs, .. }
            | BattleEvent::FormeChange { kwargs, .. }
            | BattleEvent::Cant { kwargs, .. }
            | BattleEvent::Fail { kwargs, .. }
            | BattleEvent::Block { kwargs, .. }
            | BattleEvent::Miss { kwargs, .. }
            | BattleEvent::Damage { kwargs, .. }
            | BattleEvent::Heal { kwargs, .. }
            | BattleEvent::SetHp { kwargs, .. }
            | BattleEvent::Status { kwargs, .. }
            | BattleEvent::CureStatus { kwargs, .. }
            | BattleEvent::CureTeam { kwargs, .. }
            | BattleEvent::Boost { kwargs, .. }
            | BattleEvent::Unboost { kwargs, .. }
            | BattleEvent::SetBoost { kwargs, .. }
            | BattleEvent::SwapBoost { kwargs, .. }
            | BattleEvent::ClearPositiveBoost { kwargs, .. }
            | BattleEvent::CopyBoost { kwargs, .. }
            | BattleEvent::Weather { kwargs, .. }
            | BattleEvent::FieldStart { kwargs, .. }
            | BattleEvent::FieldEnd { kwargs, .. }
            | BattleEvent::SideStart { kwargs, .. }
            | BattleEvent::SideEnd { kwargs, .. }
            | BattleEvent::VolatileStart { kwargs, .. }
            | BattleEvent::VolatileEnd { kwargs, .. }
            | BattleEvent::Immune { kwargs, .. }
            | BattleEvent::Item { kwargs, .. }
            | BattleEvent::EndItem { kwargs, .. }
            | BattleEvent::Ability { kwargs, .. }
            | BattleEvent::EndAbility { kwargs, .. }
            | BattleEvent::Transform { kwargs, .. }
            | BattleEvent::Activate { kwargs, .. }
            | BattleEvent::SingleMove { kwargs, .. }
            | BattleEvent::SingleTurn { kwargs, .. } => Some(kwargs),
            _ => None,
        }
    }

    /// Major actions start a new action block in a turn
    pub fn is_major(&self) -> bool {
        matches!(
            self,
            BattleEvent::Move { .. }
                | BattleEvent::Switch { .. }
                | BattleEvent::Drag { .. }
                | BattleEvent::Cant { .. }
                | BattleEvent::Replace { .. }
                | BattleEvent::Swap { .. }
        )
    }
}

/// Server rejection of a sent choice, from `|error|[Invalid choice] ...`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceError {
    pub kind: ChoiceErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceErrorKind {
    /// The choice contradicts state the client already knew
    Invalid,
    /// The choice was rejected because of information the client lacked
    Unavailable,
    Other,
}

impl ChoiceError {
    pub fn parse(text: &str) -> Self {
        let (kind, message) = if let Some(rest) = text.strip_prefix("[Invalid choice]") {
            (ChoiceErrorKind::Invalid, rest)
        } else if let Some(rest) = text.strip_prefix("[Unavailable choice]") {
            (ChoiceErrorKind::Unavailable, rest)
        } else {
            (ChoiceErrorKind::Other, text)
        };

        ChoiceError {
            kind,
            message: message.trim().to_string(),
        }
    }

    /// Whether the rejection was caused by an unrevealed trapping effect
    pub fn is_trapped(&self) -> bool {
        self.kind == ChoiceErrorKind::Unavailable && self.message.contains("trapped")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerFrame {
    pub room_id: Option<String>,
    pub events: Vec<BattleEvent>,
}

/// Parse a complete WebSocket frame into structured events.
///
/// Every frame ends with [`BattleEvent::Halt`], marking the end of one batch.
pub fn parse_server_frame(frame: &str) -> Result<ServerFrame> {
    let mut lines = frame.lines().peekable();
    let mut room_id = None;

    if let Some(room) = lines.peek().and_then(|line| line.strip_prefix('>')) {
        room_id = Some(room.trim().to_string());
        lines.next();
    }

    let mut events = lines
        .filter(|line| !line.trim().is_empty())
        .map(parse_server_message)
        .collect::<Result<Vec<_>>>()?;
    events.push(BattleEvent::Halt);

    Ok(ServerFrame { room_id, events })
}

/// Parse a single line from the server into a BattleEvent
pub fn parse_server_message(line: &str) -> Result<BattleEvent> {
    let line = line.trim_end_matches(['\r', '\n']);

    if !line.starts_with('|') {
        return Ok(BattleEvent::Raw(line.to_string()));
    }

    let parts: Vec<&str> = line.split('|').collect();

    if parts.len() < 2 {
        return Ok(BattleEvent::Raw(line.to_string()));
    }

    match parts[1] {
        // Initialization
        "player" => battle_init::parse_player(&parts),
        "teamsize" => battle_init::parse_teamsize(&parts),
        "gametype" => battle_init::parse_gametype(&parts),
        "gen" => battle_init::parse_gen(&parts),
        "tier" => battle_init::parse_tier(&parts),
        "rated" => battle_init::parse_rated(&parts),
        "rule" => battle_init::parse_rule(&parts),
        "clearpoke" => Ok(BattleEvent::ClearPoke),
        "poke" => battle_init::parse_poke(&parts),
        "teampreview" => battle_init::parse_teampreview(&parts),
        "start" => Ok(BattleEvent::Start),

        // Progress
        "request" => battle_progress::parse_request(&parts),
        "error" => battle_progress::parse_error(&parts),
        "inactive" => battle_progress::parse_inactive(&parts),
        "inactiveoff" => battle_progress::parse_inactiveoff(&parts),
        "upkeep" => Ok(BattleEvent::Upkeep),
        "turn" => battle_progress::parse_turn(&parts),
        "win" => battle_progress::parse_win(&parts),
        "tie" => Ok(BattleEvent::Tie),

        // Major
        "move" => battle_major::parse_move(&parts),
        "switch" => battle_major::parse_switch(&parts),
        "drag" => battle_major::parse_drag(&parts),
        "detailschange" => battle_major::parse_detailschange(&parts),
        "-formechange" => battle_major::parse_formechange(&parts),
        "replace" => battle_major::parse_replace(&parts),
        "swap" => battle_major::parse_swap(&parts),
        "cant" => battle_major::parse_cant(&parts),
        "faint" => battle_major::parse_faint(&parts),

        // Minor
        "-fail" => battle_minor::parse_fail(&parts),
        "-block" => battle_minor::parse_block(&parts),
        "-notarget" => battle_minor::parse_notarget(&parts),
        "-miss" => battle_minor::parse_miss(&parts),
        "-damage" => battle_minor::parse_damage(&parts),
        "-heal" => battle_minor::parse_heal(&parts),
        "-sethp" => battle_minor::parse_sethp(&parts),
        "-status" => battle_minor::parse_status(&parts),
        "-curestatus" => battle_minor::parse_curestatus(&parts),
        "-cureteam" => battle_minor::parse_cureteam(&parts),
        "-boost" => battle_minor::parse_boost(&parts),
        "-unboost" => battle_minor::parse_unboost(&parts),
        "-setboost" => battle_minor::parse_setboost(&parts),
        "-swapboost" => battle_minor::parse_swapboost(&parts),
        "-invertboost" => battle_minor::parse_invertboost(&parts),
        "-clearboost" => battle_minor::parse_clearboost(&parts),
        "-clearallboost" => Ok(BattleEvent::ClearAllBoost),
        "-clearpositiveboost" => battle_minor::parse_clearpositiveboost(&parts),
        "-clearnegativeboost" => battle_minor::parse_clearnegativeboost(&parts),
        "-copyboost" => battle_minor::parse_copyboost(&parts),
        "-weather" => battle_minor::parse_weather(&parts),
        "-fieldstart" => battle_minor::parse_fieldstart(&parts),
        "-fieldend" => battle_minor::parse_fieldend(&parts),
        "-sidestart" => battle_minor::parse_sidestart(&parts),
        "-sideend" => battle_minor::parse_sideend(&parts),
        "-start" => battle_minor::parse_start(&parts),
        "-end" => battle_minor::parse_end(&parts),
        "-crit" => battle_minor::parse_crit(&parts),
        "-supereffective" => battle_minor::parse_supereffective(&parts),
        "-resisted" => battle_minor::parse_resisted(&parts),
        "-immune" => battle_minor::parse_immune(&parts),
        "-item" => battle_minor::parse_item(&parts),
        "-enditem" => battle_minor::parse_enditem(&parts),
        "-ability" => battle_minor::parse_ability(&parts),
        "-endability" => battle_minor::parse_endability(&parts),
        "-transform" => battle_minor::parse_transform(&parts),
        "-activate" => battle_minor::parse_activate(&parts),
        "-hint" => Ok(BattleEvent::Hint(parts.get(2).unwrap_or(&"").to_string())),
        "-center" => Ok(BattleEvent::Center),
        "-message" => Ok(BattleEvent::Message(parts.get(2).unwrap_or(&"").to_string())),
        "-prepare" => battle_minor::parse_prepare(&parts),
        "-mustrecharge" => battle_minor::parse_mustrecharge(&parts),
        "-nothing" => Ok(BattleEvent::Nothing),
        "-hitcount" => battle_minor::parse_hitcount(&parts),
        "-singlemove" => battle_minor::parse_singlemove(&parts),
        "-singleturn" => battle_minor::parse_singleturn(&parts),

        "-mega" | "-primal" | "-burst" | "-zpower" | "-zbroken" | "-terastallize" => {
            Ok(BattleEvent::Unsupported(line.to_string()))
        }

        _ => Ok(BattleEvent::Raw(line.to_string())),
    }
}
