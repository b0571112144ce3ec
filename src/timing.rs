//! Phase timing
//!
//! Timestamps come from the monotonic clock at microsecond resolution.
//! Differences are normalized so the sub-second part always lies in
//! `[0, 1_000_000)`.

use nix::time::{clock_gettime, ClockId};
use serde::Serialize;
use std::fmt;
use std::time::Duration;

use crate::error::{BenchError, Result};

pub const USEC_PER_SEC: i64 = 1_000_000;

/// A point on the monotonic clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    secs: i64,
    usecs: i64,
}

impl Timestamp {
    pub fn now() -> Result<Self> {
        let ts = clock_gettime(ClockId::CLOCK_MONOTONIC)
            .map_err(|errno| BenchError::io("clock_gettime", "CLOCK_MONOTONIC", errno.into()))?;
        Ok(Self::from_parts(ts.tv_sec() as i64, ts.tv_nsec() as i64 / 1000))
    }

    pub fn from_parts(secs: i64, usecs: i64) -> Self {
        Self { secs, usecs }
    }
}

/// Elapsed time as whole seconds plus a microsecond remainder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Elapsed {
    pub secs: i64,
    pub usecs: i64,
}

impl Elapsed {
    /// Carry `usecs` into `secs` until the remainder is in range
    ///
    /// A negative total (a clock that went backwards) is reported as zero.
    pub fn normalize(secs: i64, usecs: i64) -> Self {
        let secs = secs.saturating_add(usecs.div_euclid(USEC_PER_SEC));
        let usecs = usecs.rem_euclid(USEC_PER_SEC);
        if secs < 0 {
            return Self::default();
        }
        Self { secs, usecs }
    }

    /// `stop - start`
    pub fn between(start: Timestamp, stop: Timestamp) -> Self {
        Self::normalize(
            stop.secs.saturating_sub(start.secs),
            stop.usecs.saturating_sub(start.usecs),
        )
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.secs as u64) + Duration::from_micros(self.usecs as u64)
    }
}

impl fmt::Display for Elapsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs, self.usecs)
    }
}

/// Open timer for one phase
#[derive(Debug, Clone, Copy)]
pub struct PhaseTimer {
    start: Timestamp,
}

impl PhaseTimer {
    pub fn start() -> Result<Self> {
        Ok(Self {
            start: Timestamp::now()?,
        })
    }

    /// Close the timer
    pub fn stop(self) -> Result<Elapsed> {
        Ok(Elapsed::between(self.start, Timestamp::now()?))
    }
}
