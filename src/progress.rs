use std::io::{self, Write};
use std::time::Instant;

/// Console feedback on stderr, prefixed with elapsed time. Silent when built
/// with `quiet`.
pub struct Progress {
    quiet: bool,
    started: Instant,
}

impl Progress {
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            started: Instant::now(),
        }
    }

    pub fn note(&self, msg: impl AsRef<str>) {
        if self.quiet {
            return;
        }
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "[{}] {}", self.elapsed(), msg.as_ref());
    }

    pub fn step(&self, label: &str, current: usize, total: usize) {
        if self.quiet {
            return;
        }
        let total = total.max(1);
        let current = current.min(total);
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "[{}] {label} {current}/{total}", self.elapsed());
    }

    fn elapsed(&self) -> String {
        let seconds = self.started.elapsed().as_secs();
        let h = seconds / 3600;
        let m = (seconds % 3600) / 60;
        let s = seconds % 60;
        if h > 0 {
            format!("{h:02}:{m:02}:{s:02}")
        } else {
            format!("{m:02}:{s:02}")
        }
    }
}
