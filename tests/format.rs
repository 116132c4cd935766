//! End-to-end coverage of the seed scenarios and facade behavior.

use message_format::{arg, Args, MessageFormat, MessageFormatError, MessageFormatOptions};

fn mf() -> MessageFormat {
    MessageFormat::new(MessageFormatOptions::default()).unwrap()
}

fn mf_locale(tag: &str) -> MessageFormat {
    MessageFormat::new(MessageFormatOptions {
        locale: tag.to_owned(),
        ..Default::default()
    })
    .unwrap()
}

#[test]
fn seed_scenario_1_variable_substitution() {
    let out = mf().format("Hello, {name}!", &arg("name", "Jeff").build()).unwrap();
    assert_eq!(out, "Hello, Jeff!");
}

#[test]
fn seed_scenario_2_plural_with_exact_match_and_hash() {
    let m = mf();
    let pattern = "You have {n, plural, =0 {no items} one {one item} other {# items}}.";
    assert_eq!(
        m.format(pattern, &arg("n", 0_i32).build()).unwrap(),
        "You have no items."
    );
    assert_eq!(
        m.format(pattern, &arg("n", 1_i32).build()).unwrap(),
        "You have one item."
    );
    assert_eq!(
        m.format(pattern, &arg("n", 42_i32).build()).unwrap(),
        "You have 42 items."
    );
}

#[test]
fn seed_scenario_3_select_with_fallback() {
    let m = mf();
    let pattern = "{g, select, male{He} female{She} other{They}} likes it.";
    assert_eq!(
        m.format(pattern, &arg("g", "female").build()).unwrap(),
        "She likes it."
    );
    assert_eq!(
        m.format(pattern, &arg("g", "xx").build()).unwrap(),
        "They likes it."
    );
}

#[test]
fn seed_scenario_4_quoted_placeholder_is_inert() {
    let out = mf()
        .format("Arg: '{escaped}' and {real}", &arg("real", "X").build())
        .unwrap();
    assert_eq!(out, "Arg: {escaped} and X");
}

#[test]
fn seed_scenario_5_doubled_quote_is_literal_apostrophe() {
    let out = mf().format("It's '{a}' test: ''", &Args::new()).unwrap();
    assert_eq!(out, "It's {a} test: '");
}

#[test]
fn seed_scenario_6_offset_applies_only_to_hash() {
    let m = mf();
    let pattern = "{n, plural, offset:1 one{#st} other{# more}}";
    assert_eq!(m.format(pattern, &arg("n", 1_i32).build()).unwrap(), "0st");
    assert_eq!(m.format(pattern, &arg("n", 3_i32).build()).unwrap(), "2 more");
}

#[test]
fn selectordinal_branches_by_ordinal_rule() {
    let m = mf();
    let pattern = "{n, selectordinal, one{#st} two{#nd} few{#rd} other{#th}}";
    assert_eq!(m.format(pattern, &arg("n", 1_i32).build()).unwrap(), "1st");
    assert_eq!(m.format(pattern, &arg("n", 2_i32).build()).unwrap(), "2nd");
    assert_eq!(m.format(pattern, &arg("n", 3_i32).build()).unwrap(), "3rd");
    assert_eq!(m.format(pattern, &arg("n", 4_i32).build()).unwrap(), "4th");
    assert_eq!(m.format(pattern, &arg("n", 11_i32).build()).unwrap(), "11th");
}

#[test]
fn missing_argument_on_variable_is_an_error() {
    let err = mf().format("Hi {name}", &Args::new()).unwrap_err();
    assert!(matches!(err, MessageFormatError::MissingArgument { name } if name == "name"));
}

#[test]
fn missing_argument_on_branching_node_is_an_error_not_empty_string() {
    let err = mf()
        .format("{n, plural, other{x}}", &Args::new())
        .unwrap_err();
    assert!(matches!(err, MessageFormatError::MissingArgument { .. }));
}

#[test]
fn argument_lookup_is_case_sensitive() {
    let err = mf()
        .format("Hi {Name}", &arg("name", "Jeff").build())
        .unwrap_err();
    assert!(matches!(err, MessageFormatError::MissingArgument { name } if name == "Name"));
}

#[test]
fn unknown_formatter_type_is_a_format_error() {
    let err = mf()
        .format("{x, bogus}", &arg("x", 1_i32).build())
        .unwrap_err();
    assert!(matches!(err, MessageFormatError::UnknownFormatter { name } if name == "bogus"));
}

#[test]
fn malformed_pattern_carries_a_character_offset() {
    let err = mf().format("Hello {name", &Args::new()).unwrap_err();
    match err {
        MessageFormatError::MalformedPattern { index, .. } => assert!(index > 0),
        other => panic!("expected MalformedPattern, got {other:?}"),
    }
}

#[test]
fn select_without_other_branch_is_a_parse_error() {
    let err = mf()
        .format("{g, select, male{He}}", &arg("g", "male").build())
        .unwrap_err();
    assert!(matches!(err, MessageFormatError::MalformedPattern { .. }));
}

#[test]
fn number_formatter_styles() {
    let m = mf();
    let args = arg("x", 0.5_f64).build();
    assert!(m.format("{x, number, percent}", &args).unwrap().ends_with('%'));
    let args = arg("x", 7_i32).build();
    assert!(m.format("{x, number, integer}", &args).unwrap().contains('7'));
}

#[test]
fn date_and_time_formatters_consume_an_instant() {
    let m = mf();
    // 2024-03-05T01:01:01Z
    let millis = 1_709_596_800_000_i64 + 3_661_000;
    let args = arg("t", message_format::ParamValue::instant_millis(millis)).build();
    let rendered = m.format("{t, date} at {t, time}", &args).unwrap();
    assert!(rendered.contains("2024-03-05"));
    assert!(rendered.contains("01:01:01"));
}

#[test]
fn date_formatter_rejects_non_instant_values() {
    let m = mf();
    let err = m.format("{t, date}", &arg("t", 5_i32).build()).unwrap_err();
    assert!(matches!(err, MessageFormatError::ArgumentTypeMismatch { name, .. } if name == "t"));
}

#[test]
fn registering_a_custom_formatter_is_picked_up() {
    struct Shout;
    impl message_format::ValueFormatter for Shout {
        fn format(
            &self,
            _name: &str,
            value: &message_format::ParamValue,
            _style: Option<&str>,
            _locale: &icu::locid::Locale,
        ) -> Result<String, MessageFormatError> {
            Ok(value.to_string().to_uppercase())
        }
    }

    let m = mf();
    m.register_formatter("shout", std::sync::Arc::new(Shout)).unwrap();
    let out = m
        .format("{x, shout}", &arg("x", "hello").build())
        .unwrap();
    assert_eq!(out, "HELLO");
}

#[test]
fn replacing_a_branching_formatter_type_is_rejected() {
    struct NoOp;
    impl message_format::ValueFormatter for NoOp {
        fn format(
            &self,
            _name: &str,
            _value: &message_format::ParamValue,
            _style: Option<&str>,
            _locale: &icu::locid::Locale,
        ) -> Result<String, MessageFormatError> {
            Ok(String::new())
        }
    }

    let m = mf();
    let err = m
        .register_formatter("plural", std::sync::Arc::new(NoOp))
        .unwrap_err();
    assert!(matches!(err, MessageFormatError::FormatterFailure { .. }));
}

#[test]
fn registering_a_pluralizer_overrides_the_built_in_cldr_table() {
    let m = mf_locale("en");
    m.register_pluralizer(
        "en",
        std::sync::Arc::new(|n: f64| if n < 0.0 { "few".to_owned() } else { "other".to_owned() }),
    );
    let out = m
        .format(
            "{n, plural, few{negative} other{non-negative}}",
            &arg("n", -1_i32).build(),
        )
        .unwrap();
    assert_eq!(out, "negative");
}

#[test]
fn pattern_cache_and_uncached_facade_agree() {
    let cached = MessageFormat::new(MessageFormatOptions {
        use_cache: true,
        ..Default::default()
    })
    .unwrap();
    let uncached = MessageFormat::new(MessageFormatOptions {
        use_cache: false,
        ..Default::default()
    })
    .unwrap();
    let pattern = "{n, plural, one {one} other {# many}}";
    for n in [0, 1, 2, 5, 100] {
        let args = arg("n", n as i32).build();
        assert_eq!(
            cached.format(pattern, &args).unwrap(),
            uncached.format(pattern, &args).unwrap()
        );
    }
}

#[test]
fn nested_select_inside_plural_resets_hash_scoping() {
    let m = mf();
    let pattern = "{n, plural, other {#{g, select, other{items}}}}";
    let out = m
        .format(pattern, &arg("n", 3_i32).arg("g", "x").build())
        .unwrap();
    assert_eq!(out, "3items");
}
