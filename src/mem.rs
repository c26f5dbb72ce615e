use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};
use sysinfo::{System, SystemExt};

/// Cached, low-overhead memory watcher.
/// Refreshes at most every `REFRESH_EVERY` and reports available/total RAM
/// so hot loops can ask cheaply.
struct MemWatcher {
    sys: System,
    refreshed_at: Instant,
    avail_frac: f64, // available / total (0.0..1.0)
}

static WATCHER: OnceLock<Mutex<MemWatcher>> = OnceLock::new();
const REFRESH_EVERY: Duration = Duration::from_millis(500);

fn with_watcher<F, T>(f: F) -> T
where
    F: FnOnce(&mut MemWatcher) -> T,
{
    let m = WATCHER.get_or_init(|| {
        let mut s = System::new();
        s.refresh_memory();
        Mutex::new(MemWatcher {
            sys: s,
            refreshed_at: Instant::now() - REFRESH_EVERY * 2,
            avail_frac: 1.0,
        })
    });
    let mut guard = m.lock().unwrap();
    f(&mut guard)
}

/// Returns a recent estimate of available memory fraction (0.0..1.0).
pub fn available_memory_fraction() -> f64 {
    with_watcher(|w| {
        let now = Instant::now();
        if now.duration_since(w.refreshed_at) >= REFRESH_EVERY {
            w.sys.refresh_memory();
            let total = w.sys.total_memory() as f64;
            let avail = w.sys.available_memory() as f64;
            w.avail_frac = if total > 0.0 { (avail / total).clamp(0.0, 1.0) } else { 1.0 };
            w.refreshed_at = now;
        }
        w.avail_frac
    })
}

/// Returns true if the cached available-memory fraction is below `threshold` (e.g., 0.10 for 10%).
pub fn is_low_memory(threshold: f64) -> bool {
    available_memory_fraction() < threshold
}

/// Cooperative backoff: yields briefly if under the threshold.
/// Safe to call frequently — uses cached memory values internally.
pub fn maybe_throttle_low_memory(threshold: f64) {
    if is_low_memory(threshold) {
        std::thread::sleep(Duration::from_millis(25));
    }
}
