use tracing::Level;

/// Install a `fmt` subscriber at `max_level`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init(max_level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(false)
        .try_init();
}
