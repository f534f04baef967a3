//! A single monotonic clock shared by input timestamps, playback and autosave.

/// Seconds since the first call in this process.
#[cfg(not(target_arch = "wasm32"))]
pub fn current_time_secs() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static EPOCH: OnceLock<Instant> = OnceLock::new();
    EPOCH.get_or_init(Instant::now).elapsed().as_secs_f64()
}

/// Seconds since page load
#[cfg(target_arch = "wasm32")]
pub fn current_time_secs() -> f64 {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| perf.now() / 1000.0)
        .unwrap_or(0.0)
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_clock_is_monotonic() {
        let a = current_time_secs();
        let b = current_time_secs();
        assert!(b >= a);
    }
}
