//! Shared rolling, clock and settings handle passed into rule code.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use oakhaven_domain::DiceFormula;

use crate::infrastructure::ports::{ClockPort, RandomPort};
use crate::infrastructure::settings::EngineSettings;

#[derive(Clone)]
pub struct RulesContext {
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    settings: Arc<EngineSettings>,
}

impl RulesContext {
    pub fn new(
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        settings: Arc<EngineSettings>,
    ) -> Self {
        Self {
            random,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Uniform integer in `[min, max]`.
    pub fn range(&self, min: i32, max: i32) -> i32 {
        self.random.gen_range(min, max)
    }

    pub fn roll(&self, formula: DiceFormula) -> i32 {
        formula.roll_total(|min, max| self.random.gen_range(min, max))
    }

    /// One die with `sides` faces.
    pub fn d(&self, sides: i32) -> i32 {
        self.random.gen_range(1, sides.max(1))
    }

    /// True with `percent` in 100 odds.
    pub fn chance(&self, percent: i32) -> bool {
        percent > 0 && self.d(100) <= percent
    }

    /// Pick one element uniformly.
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.range(0, items.len() as i32 - 1);
        items.get(index.max(0) as usize)
    }
}
