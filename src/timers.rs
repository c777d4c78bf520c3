//! Timer bookkeeping for the debounce and interval timing modes.
//!
//! [`TimerManager`] owns the per-element registries and is handed to the dispatcher explicitly.
//! The actual clock is a [`Scheduler`], which is [`WebScheduler`](`crate::web::WebScheduler`) in the browser
//! and [`ManualScheduler`] wherever time should only advance on request.

use crate::{config::TimingPolicy, Error};
use core::fmt::{self, Debug, Formatter};
use hashbrown::HashMap;
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};
use tracing::{instrument, trace};

/// A source of one-shot and repeating timers.
///
/// Durations are in milliseconds.
pub trait Scheduler {
	type Handle;

	/// Runs `task` once after `delay`. Can't be cancelled.
	///
	/// # Errors
	///
	/// Iff the timer couldn't be created.
	fn defer(&self, delay: u32, task: Box<dyn FnOnce()>) -> Result<(), Error>;

	/// Runs `task` once after `delay`, unless cancelled before.
	///
	/// # Errors
	///
	/// Iff the timer couldn't be created.
	fn timeout(&self, delay: u32, task: Box<dyn FnOnce()>) -> Result<Self::Handle, Error>;

	/// Runs `task` every `period` until cancelled. The first run is after one `period`.
	///
	/// # Errors
	///
	/// Iff the timer couldn't be created.
	fn interval(&self, period: u32, task: Box<dyn FnMut()>) -> Result<Self::Handle, Error>;

	/// Stops a timer. Cancelling a one-shot timer that already ran has no effect.
	fn cancel(&self, handle: Self::Handle);
}

/// Returned by [`TimerManager::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "`Arm::Now` means the task must be run by the caller"]
pub enum Arm {
	/// The task was scheduled and will run later.
	Later,
	/// The task was armed to repeat and its first run is due right away.
	///
	/// This isn't done inside [`TimerManager::schedule`] so that the caller can release any borrow of the manager first.
	Now,
}

/// Holds at most one debounce timer and one interval timer per key (element id).
///
/// Scheduling a new timer of either kind for a key cancels the previous one of the same kind.
/// Dropping the manager cancels all timers it still holds.
pub struct TimerManager<S: Scheduler> {
	scheduler: S,
	debounce: HashMap<String, S::Handle>,
	interval: HashMap<String, S::Handle>,
}

impl<S: Scheduler> TimerManager<S> {
	#[must_use]
	pub fn new(scheduler: S) -> Self {
		Self {
			scheduler,
			debounce: HashMap::new(),
			interval: HashMap::new(),
		}
	}

	#[must_use]
	pub fn scheduler(&self) -> &S {
		&self.scheduler
	}

	/// Applies `policy` to `task` for the element with id `key`.
	///
	/// # Errors
	///
	/// Iff the [`Scheduler`] fails to create a timer. A replaced timer is cancelled either way.
	#[instrument(skip(self, task))]
	pub fn schedule(&mut self, key: &str, policy: TimingPolicy, task: Rc<dyn Fn()>) -> Result<Arm, Error> {
		match policy {
			TimingPolicy::Debounce(delay) => {
				if let Some(previous) = self.debounce.remove(key) {
					trace!("Cancelling pending debounce timer.");
					self.scheduler.cancel(previous);
				}
				let handle = self.scheduler.timeout(delay, Box::new(move || task()))?;
				self.debounce.insert(key.to_owned(), handle);
				Ok(Arm::Later)
			}
			TimingPolicy::Interval(period) => {
				if let Some(previous) = self.interval.remove(key) {
					trace!("Cancelling running interval.");
					self.scheduler.cancel(previous);
				}
				let handle = self.scheduler.interval(period, Box::new(move || task()))?;
				self.interval.insert(key.to_owned(), handle);
				Ok(Arm::Now)
			}
			TimingPolicy::Delay(delay) => {
				self.scheduler.defer(delay, Box::new(move || task()))?;
				Ok(Arm::Later)
			}
		}
	}

	/// Stops the interval for `key`, if any. Returns whether there was one.
	pub fn cancel_interval(&mut self, key: &str) -> bool {
		self.interval.remove(key).map(|handle| self.scheduler.cancel(handle)).is_some()
	}

	/// Whether an interval is registered for `key`.
	#[must_use]
	pub fn has_interval(&self, key: &str) -> bool {
		self.interval.contains_key(key)
	}

	/// Whether a debounce timer is registered for `key`. It may already have fired.
	#[must_use]
	pub fn has_debounce(&self, key: &str) -> bool {
		self.debounce.contains_key(key)
	}

	pub fn cancel_all(&mut self) {
		for (_, handle) in self.debounce.drain().chain(self.interval.drain()) {
			self.scheduler.cancel(handle);
		}
	}
}

impl<S: Scheduler> Drop for TimerManager<S> {
	fn drop(&mut self) {
		self.cancel_all();
	}
}

impl<S: Scheduler> Debug for TimerManager<S> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("TimerManager")
			.field("debounce", &self.debounce.keys().collect::<Vec<_>>())
			.field("interval", &self.interval.keys().collect::<Vec<_>>())
			.finish_non_exhaustive()
	}
}

/// A [`Scheduler`] driven by hand through [`advance`](`ManualScheduler::advance`).
///
/// Clones share the same clock. Timers due at the same instant run in the order they were scheduled,
/// and tasks may schedule or cancel timers while running.
#[derive(Clone, Default)]
pub struct ManualScheduler(Rc<RefCell<ManualClock>>);

#[derive(Default)]
struct ManualClock {
	now: u64,
	next_id: u64,
	timers: BTreeMap<u64, ManualTimer>,
}

struct ManualTimer {
	due: u64,
	period: Option<u64>,
	task: Option<ManualTask>,
}

enum ManualTask {
	Once(Box<dyn FnOnce()>),
	Repeat(Box<dyn FnMut()>),
}

/// Identifies a timer created by a [`ManualScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManualHandle(u64);

impl ManualScheduler {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Milliseconds advanced so far.
	#[must_use]
	pub fn now(&self) -> u64 {
		self.0.borrow().now
	}

	/// Number of timers that haven't run yet or keep repeating.
	#[must_use]
	pub fn pending(&self) -> usize {
		self.0.borrow().timers.len()
	}

	/// Moves the clock forward by `millis`, running every timer that becomes due on the way.
	pub fn advance(&self, millis: u64) {
		let target = self.0.borrow().now.saturating_add(millis);
		loop {
			let (id, task) = {
				let mut clock = self.0.borrow_mut();
				let next = clock
					.timers
					.iter()
					.filter(|(_, timer)| timer.due <= target && timer.task.is_some())
					.min_by_key(|&(&id, timer)| (timer.due, id))
					.map(|(&id, timer)| (id, timer.due));
				let (id, due) = match next {
					Some(next) => next,
					None => break,
				};
				clock.now = due;
				match clock.timers.get_mut(&id).and_then(|timer| timer.task.take()) {
					Some(task) => (id, task),
					None => break,
				}
			};

			match task {
				ManualTask::Once(task) => {
					self.0.borrow_mut().timers.remove(&id);
					task();
				}
				ManualTask::Repeat(mut task) => {
					task();
					let mut clock = self.0.borrow_mut();
					// Absent iff cancelled while running.
					if let Some(timer) = clock.timers.get_mut(&id) {
						timer.due += timer.period.unwrap_or(1);
						timer.task = Some(ManualTask::Repeat(task));
					}
				}
			}
		}
		self.0.borrow_mut().now = target;
	}

	fn insert(&self, delay: u32, period: Option<u32>, task: ManualTask) -> ManualHandle {
		let mut clock = self.0.borrow_mut();
		let id = clock.next_id;
		clock.next_id += 1;
		let due = clock.now + u64::from(delay);
		clock.timers.insert(
			id,
			ManualTimer {
				due,
				period: period.map(|period| u64::from(period.max(1))),
				task: Some(task),
			},
		);
		ManualHandle(id)
	}
}

impl Scheduler for ManualScheduler {
	type Handle = ManualHandle;

	fn defer(&self, delay: u32, task: Box<dyn FnOnce()>) -> Result<(), Error> {
		self.insert(delay, None, ManualTask::Once(task));
		Ok(())
	}

	fn timeout(&self, delay: u32, task: Box<dyn FnOnce()>) -> Result<Self::Handle, Error> {
		Ok(self.insert(delay, None, ManualTask::Once(task)))
	}

	fn interval(&self, period: u32, task: Box<dyn FnMut()>) -> Result<Self::Handle, Error> {
		Ok(self.insert(period.max(1), Some(period), ManualTask::Repeat(task)))
	}

	fn cancel(&self, ManualHandle(id): Self::Handle) {
		self.0.borrow_mut().timers.remove(&id);
	}
}

impl Debug for ManualScheduler {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let clock = self.0.borrow();
		f.debug_struct("ManualScheduler").field("now", &clock.now).field("pending", &clock.timers.len()).finish()
	}
}
