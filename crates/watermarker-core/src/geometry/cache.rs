//! Process-lifetime cache of resolved margins, keyed by frame size.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{Margins, MarginsPx};
use crate::types::Dimensions;

/// Memoizes [`Margins::in_pixels`] per distinct (width, height).
///
/// Entries are never evicted. The lock is held while computing, so each key is
/// resolved at most once even under concurrent callers.
pub struct MarginCache {
    margins: Margins,
    resolved: Mutex<HashMap<Dimensions, MarginsPx>>,
}

impl MarginCache {
    pub fn new(margins: Margins) -> Self {
        Self {
            margins,
            resolved: Mutex::new(HashMap::new()),
        }
    }

    /// Margins in pixels for a frame of the given size.
    pub fn resolve(&self, dims: Dimensions) -> MarginsPx {
        let mut resolved = self
            .resolved
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *resolved
            .entry(dims)
            .or_insert_with(|| self.margins.in_pixels(dims))
    }

    /// Number of distinct frame sizes resolved so far.
    pub fn len(&self) -> usize {
        self.resolved
            .lock()
            .map(|resolved| resolved.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Margin;

    fn cache() -> MarginCache {
        MarginCache::new(Margins {
            nord: Margin::Percent(10),
            south: Margin::Pixels(5),
            east: Margin::Percent(50),
            west: Margin::Pixels(0),
        })
    }

    #[test]
    fn test_resolve_matches_direct_computation() {
        let cache = cache();
        let px = cache.resolve(Dimensions::new(400, 1000));
        assert_eq!(px.nord, 100);
        assert_eq!(px.south, 5);
        assert_eq!(px.east, 200);
        assert_eq!(px.west, 0);
    }

    #[test]
    fn test_shared_dimensions_share_an_entry() {
        let cache = cache();
        assert!(cache.is_empty());
        cache.resolve(Dimensions::new(1920, 1080));
        cache.resolve(Dimensions::new(1920, 1080));
        cache.resolve(Dimensions::new(1080, 1920));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_resolution() {
        let cache = std::sync::Arc::new(cache());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                std::thread::spawn(move || cache.resolve(Dimensions::new(640, 480)))
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().nord, 48);
        }
        assert_eq!(cache.len(), 1);
    }
}
