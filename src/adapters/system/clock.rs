use crate::ports::clock::Clock as ClockTrait;
use chrono::{DateTime, Utc};

/// Wall-clock implementation of Clock
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock;

impl ClockTrait for Clock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
