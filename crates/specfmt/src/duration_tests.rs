use super::*;

#[yare::parameterized(
    seconds = { "30s", 30.0 },
    bare_number_is_seconds = { "45", 45.0 },
    milliseconds = { "500ms", 0.5 },
    minutes = { "2m", 120.0 },
    hours = { "1h", 3_600.0 },
    fractional = { "1.5s", 1.5 },
)]
fn parses_known_units(text: &str, expected_secs: f64) {
    let parsed = parse(text).expect("parses");
    assert!((parsed.as_secs_f64() - expected_secs).abs() < 1e-9);
}

#[test]
fn rejects_unknown_units() {
    assert!(parse("30 fortnights").is_err());
}

#[test]
fn rejects_negative_durations() {
    assert!(parse("-5s").is_err());
}
