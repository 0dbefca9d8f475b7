//! Mirrors external state containers into cells.

use std::{
	fmt::{self, Debug, Formatter},
	ops::Deref,
};

use tendril::{Source, ValueCell, ValueRef};
use tracing::debug;

/// A state container with its own change notifications.
pub trait ExternalStore {
	/// The store's state type.
	type State: 'static;

	/// The current state.
	fn state(&self) -> Self::State;

	/// Registers `listener`, which the store must call with the new state after each change.
	///
	/// Returns the matching unsubscribe action.
	fn subscribe(&self, listener: Box<dyn Fn(&Self::State)>) -> Box<dyn FnOnce()>;
}

/// A cell holding a selected slice of an [`ExternalStore`]'s state.
///
/// Unsubscribes from the store when dropped.
#[must_use = "Bridges unsubscribe from the store when dropped."]
pub struct Bridged<T: 'static> {
	unsubscribe: Option<Box<dyn FnOnce()>>,
	value: ValueRef<T>,
}

impl<T: Debug> Debug for Bridged<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Bridged")
			.field("value", &self.value)
			.finish_non_exhaustive()
	}
}

impl<T> Deref for Bridged<T> {
	type Target = ValueRef<T>;

	fn deref(&self) -> &Self::Target {
		&self.value
	}
}

impl<T: 'static> Source for Bridged<T> {
	type Value = T;

	fn as_value_ref(&self) -> &ValueRef<T> {
		&self.value
	}
}

impl<T> Drop for Bridged<T> {
	fn drop(&mut self) {
		if let Some(unsubscribe) = self.unsubscribe.take() {
			unsubscribe();
			debug!("unbridged external store");
		}
	}
}

/// Mirrors `selector(state)` of `store` into a cell.
///
/// Store notifications that select an equal value don't reach the cell's subscribers.
pub fn bridge<S: ExternalStore, F: 'static + PartialEq>(
	store: &S,
	selector: impl 'static + Fn(&S::State) -> F,
) -> Bridged<F> {
	let cell = ValueCell::new(selector(&store.state()));
	let value = cell.to_ref();
	let unsubscribe = store.subscribe(Box::new(move |state: &S::State| cell.set(selector(state))));
	debug!("bridged external store");
	Bridged {
		unsubscribe: Some(unsubscribe),
		value,
	}
}
