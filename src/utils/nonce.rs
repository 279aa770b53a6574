// src/utils/nonce.rs
use chrono::Utc;

/// Strictly increasing nonces for private requests, tracking wall-clock microseconds.
///
/// Kraken rejects any private call whose nonce is not greater than the last one
/// it saw for the key, so two orders inside the same microsecond must still get
/// distinct, ordered values.
#[derive(Debug, Default)]
pub struct NonceGenerator {
    last_issued: u64,
}

impl NonceGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self) -> u64 {
        let now = Utc::now().timestamp_micros().max(0) as u64;
        self.next_at(now)
    }

    /// Same as [`next`](Self::next) with an explicit clock reading.
    pub fn next_at(&mut self, now_micros: u64) -> u64 {
        let nonce = if now_micros <= self.last_issued {
            self.last_issued + 1
        } else {
            now_micros
        };
        self.last_issued = nonce;
        nonce
    }

    pub fn last_issued(&self) -> u64 {
        self.last_issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn tight_loop_is_strictly_increasing() {
        let mut nonces = NonceGenerator::new();
        let issued: Vec<u64> = (0..10_000).map(|_| nonces.next()).collect();
        assert!(issued.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn same_microsecond_bumps_by_one() {
        let mut nonces = NonceGenerator::new();
        assert_eq!(nonces.next_at(1_000), 1_000);
        assert_eq!(nonces.next_at(1_000), 1_001);
        assert_eq!(nonces.next_at(1_000), 1_002);
        // clock catches up
        assert_eq!(nonces.next_at(5_000), 5_000);
    }

    #[test]
    fn clock_going_backwards_never_lowers_nonce() {
        let mut nonces = NonceGenerator::new();
        nonces.next_at(9_000);
        assert_eq!(nonces.next_at(100), 9_001);
        assert_eq!(nonces.last_issued(), 9_001);
    }

    #[test]
    fn tracks_wall_clock() {
        let mut nonces = NonceGenerator::new();
        let before = Utc::now().timestamp_micros() as u64;
        let nonce = nonces.next();
        assert!(nonce >= before);
    }

    proptest! {
        #[test]
        fn any_clock_sequence_is_strictly_increasing(clock in proptest::collection::vec(0u64..1_000_000, 1..200)) {
            let mut nonces = NonceGenerator::new();
            let mut previous = 0u64;
            for reading in clock {
                let nonce = nonces.next_at(reading);
                prop_assert!(nonce > previous);
                prop_assert!(nonce >= reading);
                previous = nonce;
            }
        }
    }
}
