//! Clock and random implementations.

use crate::infrastructure::ports::{ClockPort, RandomPort};
use chrono::{DateTime, Utc};

/// System clock - uses real time.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockPort for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// System random - uses real randomness.
pub struct SystemRandom;

impl SystemRandom {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemRandom {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPort for SystemRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        use rand::Rng;
        if max <= min {
            return min;
        }
        rand::thread_rng().gen_range(min..=max)
    }
}

/// Fixed clock for testing.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Random source that replays a script of rolls, then repeats a fallback.
///
/// Each value is clamped into the requested range so a script written for
/// d20s cannot produce an impossible d4.
#[cfg(test)]
pub struct ScriptedRandom {
    rolls: std::sync::Mutex<std::collections::VecDeque<i32>>,
    fallback: i32,
}

#[cfg(test)]
impl ScriptedRandom {
    pub fn new(rolls: impl IntoIterator<Item = i32>) -> Self {
        Self {
            rolls: std::sync::Mutex::new(rolls.into_iter().collect()),
            fallback: 1,
        }
    }

    pub fn then_always(mut self, value: i32) -> Self {
        self.fallback = value;
        self
    }

    pub fn remaining(&self) -> usize {
        self.rolls.lock().unwrap().len()
    }
}

#[cfg(test)]
impl RandomPort for ScriptedRandom {
    fn gen_range(&self, min: i32, max: i32) -> i32 {
        let next = self.rolls.lock().unwrap().pop_front().unwrap_or(self.fallback);
        next.clamp(min, max.max(min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_random_stays_in_range() {
        let random = SystemRandom::new();
        for _ in 0..200 {
            let v = random.gen_range(1, 6);
            assert!((1..=6).contains(&v));
        }
        assert_eq!(random.gen_range(3, 3), 3);
    }

    #[test]
    fn scripted_random_replays_then_falls_back() {
        let random = ScriptedRandom::new([15, 30]).then_always(2);
        assert_eq!(random.gen_range(1, 20), 15);
        assert_eq!(random.gen_range(1, 20), 20);
        assert_eq!(random.remaining(), 0);
        assert_eq!(random.gen_range(1, 6), 2);
    }
}
