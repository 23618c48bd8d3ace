use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use crate::level::Level;

/// Shared, runtime-adjustable minimum level.
///
/// Clones point at the same gate, so a level changed through one handle
/// (for instance the admin endpoint) applies to every logger built from it.
#[derive(Debug, Clone)]
pub struct AtomicLevel {
    inner: Arc<AtomicU8>,
}

impl AtomicLevel {
    pub fn new(level: Level) -> Self {
        Self {
            inner: Arc::new(AtomicU8::new(level as u8)),
        }
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.inner.load(Ordering::Relaxed))
    }

    pub fn set_level(&self, level: Level) {
        self.inner.store(level as u8, Ordering::Relaxed);
    }

    /// Returns true when entries at `level` pass the gate.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.level()
    }
}

impl Default for AtomicLevel {
    fn default() -> Self {
        Self::new(Level::Info)
    }
}

impl From<Level> for AtomicLevel {
    fn from(level: Level) -> Self {
        Self::new(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn default_gate_is_info() {
        let gate = AtomicLevel::default();
        assert_eq!(gate.level(), Level::Info);
        assert!(!gate.enabled(Level::Debug));
        assert!(gate.enabled(Level::Info));
        assert!(gate.enabled(Level::Fatal));
    }

    #[test]
    fn clones_share_updates() {
        let gate = AtomicLevel::new(Level::Warn);
        let other = gate.clone();
        other.set_level(Level::Debug);

        assert_eq!(gate.level(), Level::Debug);
        assert!(gate.enabled(Level::Debug));
    }

    #[test]
    fn concurrent_updates_leave_a_valid_level() {
        let gate = AtomicLevel::default();
        let handles: Vec<_> = Level::ALL
            .iter()
            .map(|&level| {
                let gate = gate.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        gate.set_level(level);
                        let _ = gate.enabled(Level::Error);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert!(Level::ALL.contains(&gate.level()));
    }
}
