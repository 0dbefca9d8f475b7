//! Selector/comparator tracking: change-gated callbacks with cleanup.

use std::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
	rc::Rc,
};

use tracing::{debug, trace};

use crate::{
	cell::{Subscription, ValueRef},
	cleanup::{Cleanup, IntoCleanup},
};

type Comparator<F> = Box<dyn Fn(&F, &F) -> bool>;

/// Configures [`ValueRef::track`] and [`ValueRef::track_selector`].
///
/// ```
/// use tendril::{TrackOptions, ValueCell};
///
/// let cell = ValueCell::new(1);
/// let _tracking = cell.track(
/// 	|value| println!("{value}"),
/// 	TrackOptions::new()
/// 		.skip_first_call()
/// 		.comparator(|last: &i32, next: &i32| last.abs() == next.abs()),
/// );
/// ```
pub struct TrackOptions<F> {
	pub(crate) skip_first_call: bool,
	pub(crate) comparator: Option<Comparator<F>>,
}

impl<F> Default for TrackOptions<F> {
	fn default() -> Self {
		Self {
			skip_first_call: false,
			comparator: None,
		}
	}
}

impl<F> Debug for TrackOptions<F> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("TrackOptions")
			.field("skip_first_call", &self.skip_first_call)
			.field("comparator", &self.comparator.as_ref().map(|_| "…"))
			.finish()
	}
}

impl<F> TrackOptions<F> {
	/// Runs the callback immediately, then on every change of the projection.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Don't run the callback on activation.
	///
	/// The initial projection is still recorded, so that the comparator has something to compare with.
	#[must_use]
	pub fn skip_first_call(mut self) -> Self {
		self.skip_first_call = true;
		self
	}

	/// Suppresses reactions for which `comparator(last, next)` is `true`.
	#[must_use]
	pub fn comparator(mut self, comparator: impl 'static + Fn(&F, &F) -> bool) -> Self {
		self.comparator = Some(Box::new(comparator));
		self
	}
}

struct Record<T: 'static, F> {
	projector: Box<dyn Fn(&Rc<T>) -> Rc<F>>,
	callback: Box<dyn Fn(&Rc<F>) -> Option<Cleanup>>,
	comparator: Option<Comparator<F>>,
	last: RefCell<Option<Rc<F>>>,
	active_cleanup: RefCell<Option<Cleanup>>,
	generation: Cell<u64>,
	torn_down: Cell<bool>,
}

impl<T: 'static, F> Record<T, F> {
	fn react(&self, value: &Rc<T>) {
		if self.torn_down.get() {
			return;
		}

		let projected = (self.projector)(value);
		if let Some(comparator) = &self.comparator {
			let last = self.last.borrow().clone();
			if last.map_or(false, |last| comparator(&last, &projected)) {
				trace!("reaction suppressed by comparator");
				return;
			}
		}

		*self.last.borrow_mut() = Some(Rc::clone(&projected));
		self.invoke(&projected);
	}

	fn invoke(&self, projected: &Rc<F>) {
		let generation = self.generation.get().wrapping_add(1);
		self.generation.set(generation);

		let previous = self.active_cleanup.borrow_mut().take();
		let next = (self.callback)(projected);
		if let Some(previous) = previous {
			previous.release();
		}

		// A nested reaction or a teardown during the callback supersedes this run.
		if self.torn_down.get() || self.generation.get() != generation {
			drop(next);
		} else {
			let stale = self.active_cleanup.replace(next);
			drop(stale);
		}
	}
}

trait TearDown {
	fn tear_down(&self);
}

impl<T: 'static, F> TearDown for Record<T, F> {
	fn tear_down(&self) {
		self.torn_down.set(true);
		let active = self.active_cleanup.borrow_mut().take();
		if let Some(active) = active {
			active.release();
		}
	}
}

/// A live tracking registration, created through [`ValueRef::track`] or [`ValueRef::track_selector`].
///
/// Dropping it releases the active cleanup (if any) and then unsubscribes.
#[must_use = "Trackings are torn down when dropped."]
pub struct Tracking {
	record: Rc<dyn TearDown>,
	subscription: Subscription,
}

impl Debug for Tracking {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Tracking")
			.field("subscription", &self.subscription)
			.finish_non_exhaustive()
	}
}

impl Tracking {
	pub(crate) fn new<T: 'static, F: 'static, C: 'static + IntoCleanup>(
		source: &ValueRef<T>,
		projector: impl 'static + Fn(&Rc<T>) -> Rc<F>,
		callback: impl 'static + Fn(&Rc<F>) -> C,
		options: TrackOptions<F>,
		baseline: Option<Rc<F>>,
	) -> Self {
		let TrackOptions {
			skip_first_call,
			comparator,
		} = options;

		let record = Rc::new(Record {
			projector: Box::new(projector),
			callback: Box::new(move |projected: &Rc<F>| callback(projected).into_cleanup()),
			comparator,
			last: RefCell::new(None),
			active_cleanup: RefCell::new(None),
			generation: Cell::new(0),
			torn_down: Cell::new(false),
		});

		let initial = match baseline {
			Some(baseline) => baseline,
			None => (record.projector)(&source.read()),
		};
		*record.last.borrow_mut() = Some(Rc::clone(&initial));

		let subscription = source.subscribe_shared({
			let record = Rc::clone(&record);
			move |value| record.react(value)
		});

		if !skip_first_call {
			record.invoke(&initial);
		}

		Self {
			record,
			subscription,
		}
	}

	/// Same as dropping the [`Tracking`].
	pub fn tear_down(self) {
		drop(self);
	}
}

impl Drop for Tracking {
	fn drop(&mut self) {
		self.record.tear_down();
		self.subscription.unsubscribe();
		debug!("tracking torn down");
	}
}
