/// Per-key log message throttling.
///
/// Data-quality problems (duplicate evidence IDs, unmatched realignments,
/// assemblies with no support) can occur millions of times over a run.
/// Callers ask `should_suppress(key)` before logging; the first
/// `MAX_EMITTED_PER_KEY` occurrences of a key are let through, the rest are
/// counted silently.
use dashmap::DashMap;

const MAX_EMITTED_PER_KEY: u64 = 100;

#[derive(Debug, Default)]
pub struct MessageThrottler {
    counts: DashMap<&'static str, u64>,
}

impl MessageThrottler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an occurrence of `key` and report whether its log message
    /// should be suppressed.
    pub fn should_suppress(&self, key: &'static str) -> bool {
        let mut entry = self.counts.entry(key).or_insert(0);
        *entry += 1;
        if *entry == MAX_EMITTED_PER_KEY {
            log::warn!("Suppressing further '{key}' messages");
        }
        *entry > MAX_EMITTED_PER_KEY
    }

    /// Number of occurrences recorded for `key`, including suppressed ones.
    pub fn occurrences(&self, key: &str) -> u64 {
        self.counts.get(key).map(|c| *c).unwrap_or(0)
    }
}
