//! Time sources for the stability gate and orphan timestamps.
//!
//! Deadlines run on a monotonic [`Instant`]; `orphaned_at` is stamped with
//! wall-clock UTC. Tests drive both through [`ManualClock`].

use std::time::{Duration, Instant};

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;

/// A source of monotonic and wall-clock time.
pub trait Clock: Send + Sync {
	/// Monotonic time used for deadlines.
	fn now(&self) -> Instant;
	/// Wall-clock time used for persisted timestamps.
	fn utc_now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Instant {
		Instant::now()
	}

	fn utc_now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
	start: Instant,
	start_utc: DateTime<Utc>,
	elapsed: Mutex<Duration>,
}

impl ManualClock {
	/// Creates a clock frozen at the current instant.
	pub fn new() -> Self {
		Self::starting_at(Utc::now())
	}

	/// Creates a clock whose wall-clock reading starts at `start_utc`.
	pub fn starting_at(start_utc: DateTime<Utc>) -> Self {
		Self {
			start: Instant::now(),
			start_utc,
			elapsed: Mutex::new(Duration::ZERO),
		}
	}

	/// Moves the clock forward.
	pub fn advance(&self, by: Duration) {
		*self.elapsed.lock() += by;
	}

	/// Returns the time elapsed since the clock was created.
	pub fn elapsed(&self) -> Duration {
		*self.elapsed.lock()
	}
}

impl Default for ManualClock {
	fn default() -> Self {
		Self::new()
	}
}

impl Clock for ManualClock {
	fn now(&self) -> Instant {
		self.start + self.elapsed()
	}

	fn utc_now(&self) -> DateTime<Utc> {
		self.start_utc + TimeDelta::from_std(self.elapsed()).unwrap_or(TimeDelta::zero())
	}
}
