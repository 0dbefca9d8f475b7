//! Projection and aggregation combinators.

use std::{
	any::Any,
	fmt::{self, Debug, Formatter},
	ops::Deref,
	rc::Rc,
};

use tracing::debug;

use crate::{
	cell::{Equality, ValueCell, ValueRef},
	source::{Source, Sources},
	tracking::{TrackOptions, Tracking},
};

/// A read-only cell kept in sync with its upstream sources.
///
/// Owns its upstream. Dropping a [`Derived`] stops the updates, even if clones of its [`ValueRef`] survive.
#[must_use = "Derived values stop updating when dropped."]
pub struct Derived<T: 'static> {
	// Declaration order is drop order: unsubscribe before releasing the upstream.
	feed: Vec<Tracking>,
	value: ValueRef<T>,
	_upstream: Box<dyn Any>,
}

impl<T> Deref for Derived<T> {
	type Target = ValueRef<T>;

	fn deref(&self) -> &Self::Target {
		&self.value
	}
}

impl<T: Debug> Debug for Derived<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Derived")
			.field("value", &self.value)
			.field("feed", &self.feed.len())
			.finish_non_exhaustive()
	}
}

impl<T> Derived<T> {
	/// A read-only handle to the derived value.
	#[must_use]
	pub fn to_ref(&self) -> ValueRef<T> {
		self.value.clone()
	}
}

/// Projects `source` through `selector`.
///
/// The result starts out as `selector(current)` and is rewritten after each accepted change of `source`.
/// Writes of [`PartialEq`]-equal projections are dropped, so subscribers of the result only see actual changes.
///
/// ```
/// use tendril::{select, ValueCell};
///
/// let cell = ValueCell::new((1, "a"));
/// let first = select(cell.to_ref(), |&(n, _)| n);
/// assert_eq!(first.get(), 1);
///
/// cell.set((2, "a"));
/// assert_eq!(first.get(), 2);
/// ```
pub fn select<S: Source, F: 'static + PartialEq>(
	source: S,
	selector: impl 'static + Fn(&S::Value) -> F,
) -> Derived<F> {
	select_with(source, selector, None)
}

/// Like [`select`], but projections for which `comparator(last, next)` is `true` aren't written at all.
pub fn select_by<S: Source, F: 'static + PartialEq>(
	source: S,
	selector: impl 'static + Fn(&S::Value) -> F,
	comparator: impl 'static + Fn(&F, &F) -> bool,
) -> Derived<F> {
	select_with(source, selector, Some(Box::new(comparator)))
}

fn select_with<S: Source, F: 'static + PartialEq>(
	source: S,
	selector: impl 'static + Fn(&S::Value) -> F,
	comparator: Option<Box<dyn Fn(&F, &F) -> bool>>,
) -> Derived<F> {
	let initial = Rc::new(selector(&source.as_value_ref().read()));
	let cell = ValueCell::from_shared(Rc::clone(&initial), Equality::partial_eq());
	let value = cell.to_ref();

	let tracking = Tracking::new(
		source.as_value_ref(),
		move |current: &Rc<S::Value>| Rc::new(selector(current)),
		move |selected: &Rc<F>| {
			cell.change_shared(Rc::clone(selected));
		},
		TrackOptions {
			skip_first_call: true,
			comparator,
		},
		Some(initial),
	);

	Derived {
		feed: vec![tracking],
		value,
		_upstream: Box::new(source),
	}
}

/// Aggregates `sources` into one cell holding all their current values.
///
/// Any accepted change of any source re-reads *all* sources and writes the fresh snapshot.
/// Every snapshot counts as a new value, so each upstream change notifies once.
///
/// ```
/// use tendril::{combine, ValueCell};
///
/// let count = ValueCell::new(1);
/// let label = ValueCell::new("x");
/// let both = combine((count.to_ref(), label.to_ref()));
/// assert_eq!(both.get_clone(), (1, "x"));
///
/// count.set(2);
/// assert_eq!(both.get_clone(), (2, "x"));
/// ```
pub fn combine<S: Sources>(sources: S) -> Derived<S::Values> {
	let sources = Rc::new(sources);
	let cell = ValueCell::new_distinct(sources.read_all());
	let value = cell.to_ref();

	let on_change: Rc<dyn Fn()> = Rc::new({
		let sources = Rc::downgrade(&sources);
		move || {
			if let Some(sources) = sources.upgrade() {
				cell.set(sources.read_all());
			}
		}
	});
	let feed = sources.on_each_change(&on_change);
	debug!(sources = feed.len(), "combined sources");

	Derived {
		feed,
		value,
		_upstream: Box::new(sources),
	}
}

/// [`select`]s from [`combine`]d `sources` through `reducer`.
pub fn reduce<S: Sources, F: 'static + PartialEq>(
	sources: S,
	reducer: impl 'static + Fn(&S::Values) -> F,
) -> Derived<F> {
	select(combine(sources), reducer)
}

/// Like [`reduce`], but reduced values for which `comparator(last, next)` is `true` aren't written at all.
pub fn reduce_by<S: Sources, F: 'static + PartialEq>(
	sources: S,
	reducer: impl 'static + Fn(&S::Values) -> F,
	comparator: impl 'static + Fn(&F, &F) -> bool,
) -> Derived<F> {
	select_by(combine(sources), reducer, comparator)
}
