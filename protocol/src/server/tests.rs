#[cfg(test)]
mod tests {
    use crate::{
        BattleEvent, ChoiceErrorKind, Player, Stat, parse_server_frame, parse_server_message,
    };

    #[test]
    fn test_parse_switch() {
        let msg = parse_server_message("|switch|p1a: Pikachu|Pikachu, L80, M|200/200").unwrap();

        match msg {
            BattleEvent::Switch {
                pokemon,
                details,
                hp_status,
            } => {
                assert_eq!(pokemon.player, Player::P1);
                assert_eq!(pokemon.position, Some('a'));
                assert_eq!(pokemon.name, "Pikachu");
                assert_eq!(details.species, "Pikachu");
                assert_eq!(details.level, Some(80));
                assert_eq!(details.gender, Some('M'));
                let hp = hp_status.unwrap();
                assert_eq!(hp.current, 200);
                assert_eq!(hp.max, Some(200));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_move_with_target_and_miss() {
        let msg =
            parse_server_message("|move|p2a: Gyarados|Waterfall|p1a: Pikachu|[miss]").unwrap();

        match msg {
            BattleEvent::Move {
                pokemon,
                move_name,
                target,
                kwargs,
            } => {
                assert_eq!(pokemon.name, "Gyarados");
                assert_eq!(move_name, "Waterfall");
                assert_eq!(target.unwrap().name, "Pikachu");
                assert!(kwargs.has("miss"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_move_without_target() {
        let msg = parse_server_message("|move|p1a: Gyarados|Dragon Dance|").unwrap();
        let BattleEvent::Move { target, .. } = msg else {
            panic!("expected move");
        };
        assert!(target.is_none());
    }

    #[test]
    fn test_parse_heal_from_item() {
        let msg =
            parse_server_message("|-heal|p2a: Snorlax|63/100|[from] item: Leftovers").unwrap();

        let BattleEvent::Heal {
            pokemon,
            hp_status,
            kwargs,
        } = msg
        else {
            panic!("expected heal");
        };
        assert_eq!(pokemon.name, "Snorlax");
        assert_eq!(hp_status.unwrap().current, 63);
        assert_eq!(kwargs.from_item(), Some("Leftovers"));
    }

    #[test]
    fn test_parse_intimidate() {
        let msg = parse_server_message("|-ability|p2a: Gyarados|Intimidate|boost").unwrap();
        let BattleEvent::Ability {
            ability, kwargs, ..
        } = msg
        else {
            panic!("expected ability");
        };
        assert_eq!(ability, "Intimidate");
        assert!(kwargs.has("boost"));
    }

    #[test]
    fn test_parse_unboost() {
        let msg = parse_server_message("|-unboost|p1a: Pikachu|atk|1").unwrap();
        assert!(matches!(
            msg,
            BattleEvent::Unboost {
                stat: Stat::Atk,
                amount: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_parse_activate_forewarn() {
        let msg = parse_server_message(
            "|-activate|p1a: Hypno|ability: Forewarn|Earthquake|[of] p2a: Dugtrio",
        )
        .unwrap();
        let BattleEvent::Activate {
            pokemon,
            effect,
            args,
            kwargs,
        } = msg
        else {
            panic!("expected activate");
        };
        assert_eq!(pokemon.unwrap().name, "Hypno");
        assert_eq!(effect, "ability: Forewarn");
        assert_eq!(args, vec!["Earthquake".to_string()]);
        assert_eq!(kwargs.of.unwrap().name, "Dugtrio");
    }

    #[test]
    fn test_parse_error_kinds() {
        let msg = parse_server_message(
            "|error|[Unavailable choice] Can't switch: The active Pokémon is trapped",
        )
        .unwrap();
        let BattleEvent::Error(err) = msg else {
            panic!("expected error");
        };
        assert_eq!(err.kind, ChoiceErrorKind::Unavailable);
        assert!(err.is_trapped());

        let msg = parse_server_message("|error|[Invalid choice] Can't move: Invalid target").unwrap();
        let BattleEvent::Error(err) = msg else {
            panic!("expected error");
        };
        assert_eq!(err.kind, ChoiceErrorKind::Invalid);
        assert!(!err.is_trapped());
    }

    #[test]
    fn test_parse_request() {
        let line = r#"|request|{"active":[{"moves":[{"move":"Thunderbolt","id":"thunderbolt","pp":24,"maxpp":24,"target":"normal","disabled":false}]}],"side":{"name":"Alice","id":"p1","pokemon":[{"ident":"p1: Pikachu","details":"Pikachu, L80","condition":"200/200","active":true,"stats":{"atk":100,"def":90,"spa":120,"spd":110,"spe":180},"moves":["thunderbolt"],"baseAbility":"static","item":"lightball"}]},"rqid":3}"#;
        let BattleEvent::Request(request) = parse_server_message(line).unwrap() else {
            panic!("expected request");
        };

        assert_eq!(request.rqid, Some(3));
        assert!(request.needs_decision());
        let active = request.active_pokemon().unwrap();
        assert_eq!(active.available_moves().len(), 1);
        assert_eq!(request.player(), Some(Player::P1));
    }

    #[test]
    fn test_parse_request_locked_move() {
        let line = r#"|request|{"active":[{"moves":[{"move":"Outrage","id":"outrage"}],"trapped":true}],"side":{"name":"A","id":"p2","pokemon":[]}}"#;
        let BattleEvent::Request(request) = parse_server_message(line).unwrap() else {
            panic!("expected request");
        };
        let active = request.active_pokemon().unwrap();
        assert!(active.trapped);
        assert_eq!(active.available_moves().len(), 1);
    }

    #[test]
    fn test_request_switch_indices_skip_active_and_fainted() {
        let line = r#"|request|{"active":[{"moves":[]}],"side":{"name":"A","id":"p1","pokemon":[{"ident":"p1: Pikachu","details":"Pikachu, L88","condition":"100/211 par","active":true},{"ident":"p1: Gengar","details":"Gengar, L80","condition":"0 fnt"},{"ident":"p1: Snorlax","details":"Snorlax, L80","condition":"400/400"}]}}"#;
        let BattleEvent::Request(request) = parse_server_message(line).unwrap() else {
            panic!("expected request");
        };
        let side = request.side.as_ref().unwrap();
        assert_eq!(side.pokemon[0].status(), Some("par"));
        assert_eq!(side.pokemon[1].status(), None);
        assert!(side.pokemon[1].is_fainted());

        let switches: Vec<usize> = request.available_switches().iter().map(|(i, _)| *i).collect();
        assert_eq!(switches, vec![3]);
    }

    #[test]
    fn test_parse_frame_appends_halt() {
        let frame = ">battle-gen4randombattle-1\n|\n|t:|1700000000\n|turn|2";
        let frame = parse_server_frame(frame).unwrap();

        assert_eq!(frame.room_id.as_deref(), Some("battle-gen4randombattle-1"));
        assert_eq!(frame.events.last(), Some(&BattleEvent::Halt));
        assert!(frame.events.contains(&BattleEvent::Turn(2)));
    }

    #[test]
    fn test_parse_unsupported_mechanic() {
        let msg = parse_server_message("|-terastallize|p1a: X|Fire").unwrap();
        assert!(matches!(msg, BattleEvent::Unsupported(_)));
    }

    #[test]
    fn test_parse_unknown() {
        let msg = parse_server_message("|someunknown|data").unwrap();
        assert_eq!(msg, BattleEvent::Raw("|someunknown|data".to_string()));
    }

    #[test]
    fn test_parse_missing_pokemon_is_error() {
        assert!(parse_server_message("|-damage|").is_err());
    }
}
