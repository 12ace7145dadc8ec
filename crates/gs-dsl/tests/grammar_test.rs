//! Grammar tests against realistic menu configurations

use gs_dsl::{
    is_block_format, parse_action, parse_block_values, parse_conditional, parse_legacy_list,
    parse_values, parse_weighted_entry, ParseError,
};

#[test]
fn test_sound_block_from_config() {
    let text = r#"sound { - "ui.click:0.5:1.2" - "block.note:1.0:0.8" }"#;
    let action = parse_action(text, "message");

    assert_eq!(action.action_type, "sound");
    assert!(is_block_format(&action.data, "sound"));
    assert_eq!(
        parse_values(&action.action_type, &action.data).unwrap(),
        vec!["ui.click:0.5:1.2", "block.note:1.0:0.8"]
    );
}

#[test]
fn test_yaml_style_multi_line_block() {
    let text = r#"message {
    - "&aWelcome back, {player}!"
    - |
      Rules:
        1. Be nice
        2. No griefing
    - "&7Have fun"
}"#;

    let values = parse_block_values(text).unwrap();
    assert_eq!(
        values,
        vec![
            "&aWelcome back, {player}!",
            "Rules:\n  1. Be nice\n  2. No griefing",
            "&7Have fun",
        ]
    );
}

#[test]
fn test_parsing_is_pure_and_idempotent() {
    let inputs = [
        r#"random { - "message:a:2" - "message:b" }"#,
        r#"[ "console:say 1", "console:say 2" ]"#,
        r#"check:"placeholder:x >= 5 && permission:y" true: message:yes false: message:no"#,
    ];

    for input in inputs {
        assert_eq!(parse_action(input, "message"), parse_action(input, "message"));
        let action = parse_action(input, "message");
        assert_eq!(
            parse_values(&action.action_type, &action.data),
            parse_values(&action.action_type, &action.data)
        );
    }

    let conditional = inputs[2];
    assert_eq!(
        parse_conditional(conditional).unwrap(),
        parse_conditional(conditional).unwrap()
    );
}

#[test]
fn test_legacy_list_with_commas_in_values() {
    let items = parse_legacy_list(r#"[ "message:Hello, world", "title:Hi:there" ]"#).unwrap();
    assert_eq!(items, vec!["message:Hello, world", "title:Hi:there"]);
}

#[test]
fn test_random_entries_from_block() {
    let values = parse_block_values(
        r#"random { - "message:Common:8" - "message:Rare:2" - "economy:add:50" }"#,
    )
    .unwrap();

    let weighted: Vec<_> = values
        .iter()
        .filter_map(|v| parse_weighted_entry(v, |a| !a.starts_with("economy")))
        .collect();

    assert_eq!(weighted.len(), 3);
    assert_eq!(weighted[0].weight, 8.0);
    assert_eq!(weighted[1].weight, 2.0);
    assert_eq!(weighted[2].action, "economy:add:50");
    assert_eq!(weighted[2].weight, 1.0);
}

#[test]
fn test_malformed_input_reports_position() {
    let err = parse_block_values(r#"message { - "ok" - "broken }"#).unwrap_err();
    match err {
        ParseError::UnterminatedQuote { position } => assert_eq!(position, 19),
        other => panic!("unexpected error: {other}"),
    }
}
