use std::time::Duration;

use tokio::time::sleep;

use super::*;
use crate::screens::test_support::{drain_events, names, sample_recipes, FakeSource};

fn settings() -> ScreenSettings {
    ScreenSettings {
        reveal_delay: Duration::from_millis(1000),
        debounce: Duration::from_millis(500),
        feed_count: 4,
    }
}

fn search_screen(source: FakeSource) -> (Arc<SearchScreen>, Arc<FakeSource>) {
    let source = Arc::new(source);
    let screen = SearchScreen::new(source.clone(), settings());
    (screen, source)
}

fn completed(events: &[ScreenEvent]) -> Vec<(String, usize)> {
    events
        .iter()
        .filter_map(|event| match event {
            ScreenEvent::SearchCompleted { query, results } => Some((query.clone(), *results)),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn rapid_typing_runs_one_search_for_the_last_text() {
    let results = sample_recipes("chicken", 2);
    let (screen, source) =
        search_screen(FakeSource::new(Vec::new()).with_search_results(results.clone()));
    let mut events = screen.subscribe_events();

    for text in ["c", "ch", "chi", "chic"] {
        screen.on_text_changed(text);
        sleep(Duration::from_millis(100)).await;
    }
    assert!(source.queries().is_empty());
    assert!(screen.has_pending_search());

    sleep(Duration::from_millis(500)).await;

    assert_eq!(source.queries(), vec!["chic".to_string()]);
    assert_eq!(names(&screen.visible()), names(&results));
    assert!(screen.has_searched());
    assert!(!screen.has_pending_search());
    assert_eq!(
        completed(&drain_events(&mut events)),
        vec![("chic".to_string(), 2)]
    );
}

#[tokio::test(start_paused = true)]
async fn query_is_trimmed_before_searching() {
    let (screen, source) = search_screen(FakeSource::new(Vec::new()));

    screen.on_text_changed("  beef ");
    sleep(Duration::from_secs(1)).await;

    assert_eq!(source.queries(), vec!["beef".to_string()]);
    assert_eq!(screen.query(), "  beef ");
}

#[tokio::test(start_paused = true)]
async fn search_results_replace_list_in_one_render() {
    let (screen, _) = search_screen(
        FakeSource::new(sample_recipes("d", 4)).with_search_results(sample_recipes("s", 3)),
    );
    screen.load_defaults().await;
    sleep(Duration::from_secs(10)).await;

    let mut events = screen.subscribe_events();
    screen.select_chip("Pasta").await;

    let sizes: Vec<_> = drain_events(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            ScreenEvent::ItemsChanged { items, .. } => Some(items.len()),
            _ => None,
        })
        .collect();
    assert_eq!(sizes, vec![3]);
}

#[tokio::test(start_paused = true)]
async fn typing_stops_default_reveal() {
    let (screen, _) = search_screen(FakeSource::new(sample_recipes("d", 4)));

    assert_eq!(screen.load_defaults().await, Some(PresentMode::Incremental));
    sleep(Duration::from_millis(1500)).await;
    assert!(screen.is_revealing());

    screen.on_text_changed("p");
    assert!(!screen.is_revealing());
    assert_eq!(screen.visible().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn chip_searches_immediately_and_drops_pending_text() {
    let (screen, source) =
        search_screen(FakeSource::new(Vec::new()).with_search_results(sample_recipes("b", 1)));

    screen.on_text_changed("pas");
    screen.select_chip("Beef").await;
    sleep(Duration::from_secs(2)).await;

    assert_eq!(source.queries(), vec!["Beef".to_string()]);
    assert_eq!(screen.query(), "Beef");
    assert_eq!(screen.visible().len(), 1);
    assert_eq!(screen.suggestion_chips().len(), SUGGESTION_CHIPS.len());
}

#[tokio::test(start_paused = true)]
async fn clearing_after_a_search_shows_defaults_at_once() {
    let defaults = sample_recipes("d", 4);
    let (screen, _) = search_screen(
        FakeSource::new(defaults.clone()).with_search_results(sample_recipes("s", 2)),
    );
    screen.load_defaults().await;
    screen.select_chip("Dessert").await;

    screen.on_text_changed("");
    sleep(Duration::from_millis(600)).await;

    assert_eq!(names(&screen.visible()), names(&defaults));
    assert!(!screen.is_revealing());
}

#[tokio::test(start_paused = true)]
async fn clearing_before_any_search_resumes_staggered_defaults() {
    let defaults = sample_recipes("d", 4);
    let (screen, source) = search_screen(FakeSource::new(defaults.clone()));
    screen.load_defaults().await;
    sleep(Duration::from_millis(1500)).await;

    screen.on_text_changed("x");
    screen.on_text_changed("");
    sleep(Duration::from_millis(600)).await;

    assert!(screen.is_revealing());
    assert!(source.queries().is_empty());

    sleep(Duration::from_secs(10)).await;
    assert_eq!(names(&screen.visible()), names(&defaults));
}

#[tokio::test(start_paused = true)]
async fn defaults_arriving_after_typing_are_held_back() {
    let (screen, _) = search_screen(FakeSource::new(sample_recipes("d", 4)));
    screen.on_text_changed("soup");

    assert_eq!(screen.load_defaults().await, None);
    assert!(screen.visible().is_empty());
}

#[tokio::test(start_paused = true)]
async fn superseded_search_results_are_discarded() {
    let (screen, source) = search_screen(
        FakeSource::new(Vec::new())
            .with_search_results(sample_recipes("s", 2))
            .with_search_latency(Duration::from_secs(2)),
    );
    let mut events = screen.subscribe_events();

    tokio::join!(screen.select_chip("Beef"), screen.select_chip("Pasta"));

    assert_eq!(
        source.queries(),
        vec!["Beef".to_string(), "Pasta".to_string()]
    );
    assert_eq!(
        completed(&drain_events(&mut events)),
        vec![("Pasta".to_string(), 2)]
    );
}

#[tokio::test(start_paused = true)]
async fn unmount_cancels_pending_search_and_reveal() {
    let (screen, source) = search_screen(FakeSource::new(sample_recipes("d", 4)));
    screen.load_defaults().await;
    screen.on_text_changed("chicken");

    screen.unmount();
    sleep(Duration::from_secs(10)).await;

    assert!(!screen.has_pending_search());
    assert!(!screen.is_revealing());
    assert!(source.queries().is_empty());
}

fn loading_flags(events: &[ScreenEvent]) -> Vec<bool> {
    events
        .iter()
        .filter_map(|event| match event {
            ScreenEvent::LoadingChanged { loading, .. } => Some(*loading),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn clearing_during_in_flight_search_turns_loading_off() {
    let (screen, _) = search_screen(
        FakeSource::new(Vec::new())
            .with_search_results(sample_recipes("s", 2))
            .with_search_latency(Duration::from_secs(2)),
    );
    let mut events = screen.subscribe_events();

    screen.on_text_changed("chicken");
    sleep(Duration::from_millis(700)).await;
    screen.on_text_changed("");
    sleep(Duration::from_secs(10)).await;

    let events = drain_events(&mut events);
    assert_eq!(loading_flags(&events).last(), Some(&false));
    assert!(completed(&events).is_empty());
}

#[tokio::test(start_paused = true)]
async fn typing_discards_chip_results_still_in_flight() {
    let (screen, source) = search_screen(
        FakeSource::new(Vec::new())
            .with_search_results(sample_recipes("s", 2))
            .with_search_latency(Duration::from_secs(2)),
    );
    let mut events = screen.subscribe_events();

    tokio::join!(screen.select_chip("Beef"), async {
        sleep(Duration::from_secs(1)).await;
        screen.on_text_changed("be");
    });

    assert!(screen.visible().is_empty());
    assert!(completed(&drain_events(&mut events)).is_empty());

    sleep(Duration::from_secs(5)).await;
    assert_eq!(source.queries(), vec!["Beef".to_string(), "be".to_string()]);
    assert_eq!(
        completed(&drain_events(&mut events)),
        vec![("be".to_string(), 2)]
    );
}
