use std::collections::HashMap;

use super::*;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

#[test]
fn defaults_point_at_public_mealdb() {
    let settings = Settings::default();
    assert_eq!(settings.api_base_url, DEFAULT_BASE_URL);
    assert_eq!(settings.reveal_delay_ms, 1000);
    assert_eq!(settings.debounce_ms, 500);
    assert_eq!(settings.artificial_latency(), Duration::ZERO);
}

#[test]
fn file_values_override_defaults() {
    let mut settings = Settings::default();
    settings.apply_file(
        r#"
        api_base_url = "http://localhost:8080/api"
        reveal_delay_ms = 250
        debounce_ms = 100
        unknown = "ignored"
        "#,
    );

    assert_eq!(settings.api_base_url, "http://localhost:8080/api");
    assert_eq!(settings.reveal_delay_ms, 250);
    assert_eq!(settings.debounce_ms, 100);
    assert_eq!(settings.database_url, Settings::default().database_url);
}

#[test]
fn broken_file_and_negative_numbers_are_ignored() {
    let mut settings = Settings::default();
    settings.apply_file("reveal_delay_ms = [");
    assert_eq!(settings, Settings::default());

    settings.apply_file("reveal_delay_ms = -5");
    assert_eq!(settings.reveal_delay_ms, 1000);
}

#[test]
fn prefixed_env_wins_over_legacy_name() {
    let mut settings = Settings::default();
    settings.apply_env(env(&[
        ("RECIPE_API_BASE_URL", "http://legacy"),
        ("APP__API_BASE_URL", "http://prefixed"),
        ("APP__DATABASE_URL", "sqlite::memory:"),
        ("APP__ARTIFICIAL_LATENCY_MS", "300"),
        ("APP__DEBOUNCE_MS", "not a number"),
    ]));

    assert_eq!(settings.api_base_url, "http://prefixed");
    assert_eq!(settings.database_url, "sqlite::memory:");
    assert_eq!(settings.artificial_latency(), Duration::from_millis(300));
    assert_eq!(settings.debounce_ms, 500);
}

#[test]
fn screen_settings_carry_timings() {
    let settings = Settings {
        reveal_delay_ms: 10,
        debounce_ms: 20,
        ..Settings::default()
    };
    let screen = settings.screen_settings();
    assert_eq!(screen.reveal_delay, Duration::from_millis(10));
    assert_eq!(screen.debounce, Duration::from_millis(20));
    assert_eq!(screen.feed_count, ScreenSettings::default().feed_count);
}

#[test]
fn normalizes_plain_file_path_to_sqlite_url() {
    assert_eq!(
        normalize_database_url("./data/test.db"),
        "sqlite://./data/test.db"
    );
    assert_eq!(normalize_database_url("sqlite::memory:"), "sqlite::memory:");
    assert_eq!(
        normalize_database_url("  "),
        Settings::default().database_url
    );
}
