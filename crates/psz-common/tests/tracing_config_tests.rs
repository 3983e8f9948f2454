use super::*;

#[test]
fn test_log_format_parse() {
    assert_eq!(LogFormat::parse("json"), LogFormat::Json);
    assert_eq!(LogFormat::parse(" JSON "), LogFormat::Json);
    assert_eq!(LogFormat::parse("tree"), LogFormat::Text);
    assert_eq!(LogFormat::parse(""), LogFormat::Text);
}

#[test]
fn test_init_is_idempotent() {
    init_tracing();
    init_tracing();
}
