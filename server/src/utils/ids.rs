use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Hands out record ids from the wall clock in milliseconds, bumped so that
/// every id is strictly greater than the previous one.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_and_increasing() {
        let ids = IdGenerator::new();
        let generated: Vec<i64> = (0..1000).map(|_| ids.next_id()).collect();

        assert!(generated.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(generated.iter().collect::<HashSet<_>>().len(), 1000);
    }

    #[test]
    fn test_ids_follow_the_clock() {
        let before = Utc::now().timestamp_millis();
        let id = IdGenerator::new().next_id();
        assert!(id >= before);
    }
}
