use std::sync::atomic::{AtomicU64, Ordering};

/// Requests served by this replica since it started. Lives in memory only, a
/// restarted pod starts over at one.
#[derive(Debug, Default)]
pub(crate) struct RequestCounter {
    served: AtomicU64,
}

impl RequestCounter {
    pub(crate) fn new() -> Self {
        RequestCounter::default()
    }

    /// Counts one more request and returns its number.
    pub(crate) fn next(&self) -> u64 {
        self.served.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn numbers_start_at_one() {
        let counter = RequestCounter::new();

        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
    }

    #[test]
    fn concurrent_requests_get_distinct_numbers() {
        let counter = Arc::new(RequestCounter::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let counter = Arc::clone(&counter);
                thread::spawn(move || (0..100).map(|_| counter.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut numbers: Vec<u64> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        numbers.sort_unstable();
        numbers.dedup();

        assert_eq!(numbers.len(), 400);
        assert_eq!(numbers.last(), Some(&400));
    }
}
