use std::time::{Duration, Instant};

/// Collapses rapid repeats of one input symbol: a key is let through only
/// if it differs from the previously accepted key, or if the wait interval
/// has passed since that key was last accepted.
pub struct Throttler<K> {
    wait: Duration,
    last: Option<(K, Instant)>,
}

impl<K: PartialEq + Copy> Throttler<K> {
    pub fn new(wait: Duration) -> Self {
        Throttler { wait, last: None }
    }

    pub fn should_proceed(&mut self, key: K) -> bool {
        self.should_proceed_at(key, Instant::now())
    }

    fn should_proceed_at(&mut self, key: K, now: Instant) -> bool {
        let proceed = match self.last {
            Some((last_key, accepted_at)) if last_key == key => {
                now.duration_since(accepted_at) >= self.wait
            }
            _ => true,
        };
        if proceed {
            self.last = Some((key, now));
        }
        proceed
    }
}
