use tracing_subscriber::fmt::time::ChronoLocal;

/// Install the fmt subscriber: local timestamps, target and level shown.
/// Returns false if a global subscriber was already set.
pub fn init() -> bool {
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .try_init()
        .is_ok()
}

/// Same format, writing through the test harness's captured output.
pub fn init_for_tests() {
    let _ = tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}
