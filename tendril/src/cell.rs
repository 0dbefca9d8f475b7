//! Value cells, their subscriber registries and the change protocol.

use std::{
	cell::{Cell, RefCell},
	fmt::{self, Debug, Formatter},
	ops::Deref,
	rc::{Rc, Weak},
};

use tap::Pipe;
use tracing::trace;

use crate::{
	cleanup::IntoCleanup,
	tracking::{TrackOptions, Tracking},
};

/// Identifies one registration within a single cell's registry.
///
/// Ids are handed out in ascending order and never reused within one registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct SubscriberId(u64);

pub(crate) type Listener<T> = Rc<dyn Fn(&Rc<T>)>;

/// The ordered listeners of one cell.
pub(crate) struct Registry<T> {
	next_id: u64,
	listeners: Vec<(SubscriberId, Listener<T>)>,
}

impl<T> Registry<T> {
	pub(crate) const fn new() -> Self {
		Self {
			next_id: 0,
			listeners: Vec::new(),
		}
	}

	pub(crate) fn insert(&mut self, listener: Listener<T>) -> SubscriberId {
		let id = SubscriberId(self.next_id);
		self.next_id += 1;
		self.listeners.push((id, listener));
		id
	}

	/// Removes exactly the registration `id`.
	///
	/// The listener is handed back so that it can be dropped *after* the registry borrow ends.
	/// Dropping it may tear down further subscriptions, possibly on this same registry.
	pub(crate) fn remove(&mut self, id: SubscriberId) -> Option<Listener<T>> {
		let index = self
			.listeners
			.binary_search_by_key(&id, |(candidate, _)| *candidate)
			.ok()?;
		Some(self.listeners.remove(index).1)
	}

	/// The listeners to invoke for one notification pass.
	pub(crate) fn snapshot(&self) -> Vec<Listener<T>> {
		self.listeners
			.iter()
			.map(|(_, listener)| Rc::clone(listener))
			.collect()
	}

	pub(crate) fn len(&self) -> usize {
		self.listeners.len()
	}
}

/// The equality policy of a [`ValueCell`].
///
/// A write that the policy considers equal to the current value is dropped entirely:
/// the cell is not mutated and no subscriber runs.
pub struct Equality<T> {
	comparator: Option<Box<dyn Fn(&T, &T) -> bool>>,
	name: &'static str,
}

impl<T: 'static> Equality<T> {
	/// Compares through [`PartialEq`].
	#[must_use]
	pub fn partial_eq() -> Self
	where
		T: PartialEq,
	{
		Self {
			comparator: Some(Box::new(<T as PartialEq>::eq)),
			name: "Equality::partial_eq()",
		}
	}

	/// Compares through `comparator`, which receives `(current, next)`.
	#[must_use]
	pub fn by(comparator: impl 'static + Fn(&T, &T) -> bool) -> Self {
		Self {
			comparator: Some(Box::new(comparator)),
			name: "Equality::by(…)",
		}
	}

	/// Treats every written value as distinct, so each write notifies.
	#[must_use]
	pub fn never() -> Self {
		Self {
			comparator: None,
			name: "Equality::never()",
		}
	}

	fn holds(&self, current: &T, next: &T) -> bool {
		self.comparator
			.as_ref()
			.map_or(false, |comparator| comparator(current, next))
	}
}

impl<T> Debug for Equality<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.name)
	}
}

struct Shared<T> {
	value: RefCell<Rc<T>>,
	equality: Equality<T>,
	registry: RefCell<Registry<T>>,
}

impl<T> Shared<T> {
	fn notify(&self, value: &Rc<T>) {
		let snapshot = self.registry.borrow().snapshot();
		trace!(listeners = snapshot.len(), "propagating change");
		for listener in snapshot {
			listener(value);
		}
	}
}

/// Type-erased removal, so that [`Subscription`] needn't carry the value type.
pub(crate) trait Unsubscribe {
	fn unsubscribe(&self, id: SubscriberId);
}

impl<T> Unsubscribe for Shared<T> {
	fn unsubscribe(&self, id: SubscriberId) {
		let removed = self.registry.borrow_mut().remove(id);
		drop(removed);
	}
}

/// A registration in one cell's subscriber registry.
///
/// Dropping a [`Subscription`] removes exactly the listener it registered.
/// Use [`Subscription::leak`] to keep the listener for the rest of the cell's life instead.
#[must_use = "Subscriptions are cancelled when dropped."]
pub struct Subscription {
	shared: Weak<dyn Unsubscribe>,
	id: Cell<Option<SubscriberId>>,
}

impl Subscription {
	/// Removes the listener. Calling this again (or dropping afterwards) has no effect.
	///
	/// A notification pass that is already in progress still reaches the listener.
	pub fn unsubscribe(&self) {
		if let Some(id) = self.id.take() {
			if let Some(shared) = self.shared.upgrade() {
				shared.unsubscribe(id);
			}
		}
	}

	/// Whether the listener is still registered (as far as this handle is concerned).
	#[must_use]
	pub fn is_active(&self) -> bool {
		self.id.get().is_some() && self.shared.strong_count() > 0
	}

	/// Gives up the ability to unsubscribe. The listener stays until the cell is dropped.
	pub fn leak(self) {
		self.id.set(None);
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		self.unsubscribe();
	}
}

impl Debug for Subscription {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("active", &self.is_active())
			.finish_non_exhaustive()
	}
}

/// A read-only handle to a reactive value.
///
/// Cheap to clone; all clones observe the same value and share one subscriber registry.
pub struct ValueRef<T: 'static> {
	shared: Rc<Shared<T>>,
}

impl<T> Clone for ValueRef<T> {
	fn clone(&self) -> Self {
		Self {
			shared: Rc::clone(&self.shared),
		}
	}
}

impl<T: Debug> Debug for ValueRef<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("ValueRef")
			.field("value", &self.read())
			.field("subscribers", &self.subscriber_count())
			.finish()
	}
}

impl<T> ValueRef<T> {
	/// Returns the current value.
	///
	/// No borrow is held, so this is fine to call from anywhere, including from within a notification.
	#[must_use]
	pub fn read(&self) -> Rc<T> {
		Rc::clone(&self.shared.value.borrow())
	}

	/// Returns a copy of the current value.
	#[must_use]
	pub fn get(&self) -> T
	where
		T: Copy,
	{
		*self.read()
	}

	/// Returns a clone of the current value.
	#[must_use]
	pub fn get_clone(&self) -> T
	where
		T: Clone,
	{
		T::clone(&self.read())
	}

	/// Appends `listener` to the registry. It runs after each accepted write, never immediately.
	pub fn subscribe(&self, listener: impl 'static + Fn(&T)) -> Subscription {
		self.subscribe_shared(move |value: &Rc<T>| listener(value))
	}

	/// Like [`subscribe`](`ValueRef::subscribe`), but hands out the shared value itself.
	pub fn subscribe_shared(&self, listener: impl 'static + Fn(&Rc<T>)) -> Subscription {
		let id = self.shared.registry.borrow_mut().insert(Rc::new(listener));
		Subscription {
			shared: Rc::downgrade(&self.shared) as Weak<dyn Unsubscribe>,
			id: Cell::new(Some(id)),
		}
	}

	/// Tracks the whole value.
	///
	/// See [`track_selector`](`ValueRef::track_selector`).
	pub fn track<C: 'static + IntoCleanup>(
		&self,
		callback: impl 'static + Fn(&T) -> C,
		options: TrackOptions<T>,
	) -> Tracking {
		Tracking::new(
			self,
			|value: &Rc<T>| Rc::clone(value),
			move |value: &Rc<T>| callback(value),
			options,
			None,
		)
	}

	/// Runs `callback` whenever the projection `selector` of this value changes.
	///
	/// Unless [`TrackOptions::skip_first_call`] is set, `callback` runs once immediately.
	/// Each run may return a [`Cleanup`](`crate::Cleanup`), which is released right after the next run
	/// and when the returned [`Tracking`] is torn down.
	///
	/// If a comparator is configured, it gates runs against the last recorded projection.
	pub fn track_selector<F: 'static, C: 'static + IntoCleanup>(
		&self,
		selector: impl 'static + Fn(&T) -> F,
		callback: impl 'static + Fn(&F) -> C,
		options: TrackOptions<F>,
	) -> Tracking {
		Tracking::new(
			self,
			move |value: &Rc<T>| Rc::new(selector(value)),
			move |projected: &Rc<F>| callback(projected),
			options,
			None,
		)
	}

	/// The number of currently registered listeners.
	#[must_use]
	pub fn subscriber_count(&self) -> usize {
		self.shared.registry.borrow().len()
	}

	/// Whether both handles refer to the same cell.
	#[must_use]
	pub fn ptr_eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.shared, &other.shared)
	}

	/// Creates a handle that doesn't keep the cell alive.
	#[must_use]
	pub fn downgrade(&self) -> WeakValueRef<T> {
		WeakValueRef {
			shared: Rc::downgrade(&self.shared),
		}
	}
}

/// A non-owning [`ValueRef`].
pub struct WeakValueRef<T: 'static> {
	shared: Weak<Shared<T>>,
}

impl<T> Clone for WeakValueRef<T> {
	fn clone(&self) -> Self {
		Self {
			shared: Weak::clone(&self.shared),
		}
	}
}

impl<T> Debug for WeakValueRef<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("WeakValueRef").finish_non_exhaustive()
	}
}

impl<T> WeakValueRef<T> {
	/// Recovers a [`ValueRef`], if the cell is still alive.
	#[must_use]
	pub fn upgrade(&self) -> Option<ValueRef<T>> {
		self.shared.upgrade().map(|shared| ValueRef { shared })
	}
}

/// A writable reactive value.
///
/// Dereferences to [`ValueRef`] for reading, subscribing and tracking.
///
/// Every write goes through the same protocol:
///
/// 1. The cell's [`Equality`] compares the current value with the next one.
///    If they are equal, the write is dropped: no mutation, no notification.
/// 2. Otherwise the value is replaced and each registered listener runs, synchronously and in registration order.
///    Listeners added or removed while this happens only affect later writes.
///
/// Writes from within listeners are fine and cascade synchronously.
///
/// # Panics
///
/// Panics in caller-supplied closures propagate to the caller of the write.
/// A panicking comparator leaves the cell unchanged. A panicking listener stops the current
/// notification pass, after the value was already replaced.
pub struct ValueCell<T: 'static>(ValueRef<T>);

impl<T> Clone for ValueCell<T> {
	fn clone(&self) -> Self {
		Self(self.0.clone())
	}
}

impl<T: Debug> Debug for ValueCell<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_tuple("ValueCell").field(&self.0).finish()
	}
}

impl<T> Deref for ValueCell<T> {
	type Target = ValueRef<T>;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl<T: PartialEq + Default> Default for ValueCell<T> {
	fn default() -> Self {
		Self::new(T::default())
	}
}

impl<T> ValueCell<T> {
	/// A cell that drops writes of [`PartialEq`]-equal values.
	pub fn new(initial_value: T) -> Self
	where
		T: PartialEq,
	{
		Self::with_equality(initial_value, Equality::partial_eq())
	}

	/// Like [`new`](`ValueCell::new`), but `produce` runs (exactly once) to create the initial value.
	pub fn new_with(produce: impl FnOnce() -> T) -> Self
	where
		T: PartialEq,
	{
		Self::new(produce())
	}

	/// A cell that drops writes for which `comparator(current, next)` is `true`.
	pub fn with_comparator(initial_value: T, comparator: impl 'static + Fn(&T, &T) -> bool) -> Self {
		Self::with_equality(initial_value, Equality::by(comparator))
	}

	/// A cell that notifies on every write.
	pub fn new_distinct(initial_value: T) -> Self {
		Self::with_equality(initial_value, Equality::never())
	}

	/// A cell with an explicit [`Equality`] policy.
	pub fn with_equality(initial_value: T, equality: Equality<T>) -> Self {
		Self::from_shared(Rc::new(initial_value), equality)
	}

	pub(crate) fn from_shared(initial_value: Rc<T>, equality: Equality<T>) -> Self {
		Shared {
			value: RefCell::new(initial_value),
			equality,
			registry: RefCell::new(Registry::new()),
		}
		.pipe(Rc::new)
		.pipe(|shared| Self(ValueRef { shared }))
	}

	/// Cheaply clones a read-only handle.
	#[must_use]
	pub fn to_ref(&self) -> ValueRef<T> {
		self.0.clone()
	}

	/// Drops write access.
	#[must_use]
	pub fn into_ref(self) -> ValueRef<T> {
		self.0
	}

	/// Writes `new_value`, unless it's equal to the current value.
	pub fn set(&self, new_value: T) {
		self.change(new_value).ok();
	}

	/// Writes `new_value`, unless it's equal to the current value.
	///
	/// # Returns
	///
	/// `Ok(previous)` if the value was replaced (and subscribers were notified),
	/// or `Err(new_value)` if the write was dropped.
	pub fn change(&self, new_value: T) -> Result<Rc<T>, T> {
		if self.is_current(&new_value) {
			return Err(new_value);
		}
		Ok(self.commit(Rc::new(new_value)))
	}

	/// Writes the result of `update`, which receives the value as of right before this write.
	pub fn update(&self, update: impl FnOnce(&T) -> T) {
		let next = update(&self.read());
		self.set(next);
	}

	/// Like [`update`](`ValueCell::update`), but `update` may fail.
	///
	/// # Errors
	///
	/// Iff `update` fails. The cell is left untouched in that case.
	pub fn try_update<E>(&self, update: impl FnOnce(&T) -> Result<T, E>) -> Result<(), E> {
		let next = update(&self.read())?;
		self.set(next);
		Ok(())
	}

	/// Writes an already-shared value. Returns whether it was accepted.
	pub(crate) fn change_shared(&self, new_value: Rc<T>) -> bool {
		if self.is_current(&new_value) {
			false
		} else {
			self.commit(new_value);
			true
		}
	}

	fn is_current(&self, candidate: &T) -> bool {
		let current = self.read();
		let equal = self.0.shared.equality.holds(&current, candidate);
		if equal {
			trace!("write dropped by equality policy");
		}
		equal
	}

	fn commit(&self, next: Rc<T>) -> Rc<T> {
		let shared = &self.0.shared;
		let previous = shared.value.replace(Rc::clone(&next));
		shared.notify(&next);
		previous
	}
}
