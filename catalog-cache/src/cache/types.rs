//! Shared cache types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an entity or resource, used verbatim as a cache key
pub type Identifier = String;

/// Counters kept by every cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,

    /// Entries held at the time the snapshot was taken
    pub entries: usize,

    /// Writes, counting overwrites of an existing key
    pub inserts: u64,

    /// Entries dropped to stay within a capacity bound
    pub evictions: u64,
}

impl CacheStats {
    /// Hits plus misses
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of lookups answered from cache, 0.0 when nothing was looked up
    pub fn hit_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }

    /// Fraction of lookups that missed, 0.0 when nothing was looked up
    pub fn miss_rate(&self) -> f64 {
        match self.lookups() {
            0 => 0.0,
            lookups => self.misses as f64 / lookups as f64,
        }
    }

    pub(crate) fn record_hit(&mut self, enabled: bool) {
        if enabled {
            self.hits += 1;
        }
    }

    pub(crate) fn record_miss(&mut self, enabled: bool) {
        if enabled {
            self.misses += 1;
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {}/{} lookups hit ({:.1}%), {} inserted, {} evicted",
            self.entries,
            self.hits,
            self.lookups(),
            self.hit_rate() * 100.0,
            self.inserts,
            self.evictions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_are_fractions_of_lookups() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };

        assert_eq!(stats.lookups(), 4);
        assert_eq!(stats.hit_rate(), 0.75);
        assert_eq!(stats.miss_rate(), 0.25);
    }

    #[test]
    fn test_rates_without_lookups() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.miss_rate(), 0.0);
    }

    #[test]
    fn test_record_respects_metrics_switch() {
        let mut stats = CacheStats::default();
        stats.record_hit(false);
        stats.record_miss(false);
        assert_eq!(stats.lookups(), 0);

        stats.record_hit(true);
        stats.record_miss(true);
        assert_eq!((stats.hits, stats.misses), (1, 1));
    }

    #[test]
    fn test_display_summary() {
        let stats = CacheStats {
            hits: 9,
            misses: 1,
            entries: 6,
            inserts: 7,
            evictions: 1,
        };

        assert_eq!(
            stats.to_string(),
            "6 entries, 9/10 lookups hit (90.0%), 7 inserted, 1 evicted"
        );
    }
}
