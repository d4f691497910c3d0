use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

#[derive(Debug)]
struct WindowState {
    window_started_at: Instant,
    suppressed: u64,
}

static LOG_WINDOWS: OnceLock<Mutex<HashMap<String, WindowState>>> = OnceLock::new();

fn windows() -> &'static Mutex<HashMap<String, WindowState>> {
    LOG_WINDOWS.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Returns `Some(suppressed_count)` when a log for `key` should be emitted,
/// otherwise `None` and the event is counted as suppressed for the active window.
///
/// Used for warnings that would otherwise repeat on every request, such as a
/// failed identity SDK load or a missing bearer token.
pub fn should_emit(key: &str, interval: Duration) -> Option<u64> {
    // A poisoned lock only means another thread panicked mid-update; the counters are still usable.
    let mut map = windows().lock().unwrap_or_else(|e| e.into_inner());
    let now = Instant::now();

    match map.get_mut(key) {
        Some(state) if now.duration_since(state.window_started_at) >= interval => {
            let suppressed = state.suppressed;
            state.window_started_at = now;
            state.suppressed = 0;
            Some(suppressed)
        }
        Some(state) => {
            state.suppressed += 1;
            None
        }
        None => {
            map.insert(
                key.to_string(),
                WindowState {
                    window_started_at: now,
                    suppressed: 0,
                },
            );
            Some(0)
        }
    }
}
