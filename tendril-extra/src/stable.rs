//! Keyed-item stabilization.
//!
//! Each element of a changing list is converted into an item cell and an index cell when it's
//! first encountered. Its node is built exactly once from those cells. After that, the element
//! is only ever written into the cells, so nodes observe changes instead of being rebuilt.
//! Writing an unchanged element is a no-op, so it doesn't reach the node at all.

use std::{
	cell::RefCell,
	fmt::{self, Debug, Formatter},
	hash::Hash,
	mem,
	rc::Rc,
};

use indexmap::IndexMap;
use tap::Tap;
use tendril::{TrackOptions, Tracking, ValueCell, ValueRef};
use tracing::debug;

/// One stabilized element.
pub struct StableItem<T: 'static, N> {
	item: ValueCell<T>,
	index: ValueCell<usize>,
	node: N,
}

impl<T: Debug, N: Debug> Debug for StableItem<T, N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("StableItem")
			.field("item", &self.item)
			.field("index", &self.index)
			.field("node", &self.node)
			.finish()
	}
}

impl<T: PartialEq, N> StableItem<T, N> {
	/// Wraps `item` and `index` in cells and builds the node from read-only handles to them.
	pub fn new(item: T, index: usize, build: impl FnOnce(ValueRef<T>, ValueRef<usize>) -> N) -> Self {
		let item = ValueCell::new(item);
		let index = ValueCell::new(index);
		let node = build(item.to_ref(), index.to_ref());
		Self { item, index, node }
	}

	/// Writes the element and its position. Unchanged values don't notify.
	pub fn update(&self, item: T, index: usize) {
		self.item.set(item);
		self.index.set(index);
	}

	/// The node built for this element.
	pub fn node(&self) -> &N {
		&self.node
	}

	/// The element as of the last update.
	pub fn item(&self) -> &ValueRef<T> {
		&self.item
	}

	/// The position as of the last update.
	pub fn index(&self) -> &ValueRef<usize> {
		&self.index
	}

	/// Discards the cells and returns the node.
	pub fn into_node(self) -> N {
		self.node
	}
}

/// [`StableItem`]s by key, in list order.
pub struct StableList<K, T: 'static, N> {
	items: IndexMap<K, StableItem<T, N>>,
}

impl<K, T, N> Default for StableList<K, T, N> {
	fn default() -> Self {
		Self {
			items: IndexMap::new(),
		}
	}
}

impl<K: Debug, T: Debug, N: Debug> Debug for StableList<K, T, N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.items.iter()).finish()
	}
}

impl<K: Hash + Eq, T: PartialEq, N> StableList<K, T, N> {
	/// An empty list.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Reconciles the list with `items`.
	///
	/// Elements whose key is already present are written into their existing [`StableItem`].
	/// New keys are built through `build`. Keys that don't appear in `items` are dropped, along with their nodes.
	///
	/// Keys should be unique. If one repeats, the later element replaces the earlier one in place.
	pub fn sync(
		&mut self,
		items: impl IntoIterator<Item = T>,
		key: impl Fn(&T) -> K,
		mut build: impl FnMut(ValueRef<T>, ValueRef<usize>) -> N,
	) {
		let mut previous = mem::take(&mut self.items);
		let mut built = 0_usize;
		for (index, item) in items.into_iter().enumerate() {
			let key = key(&item);
			let stable = if let Some(stable) = previous.swap_remove(&key) {
				stable.update(item, index);
				stable
			} else {
				built += 1;
				StableItem::new(item, index, &mut build)
			};
			self.items.insert(key, stable);
		}
		debug!(
			len = self.items.len(),
			built,
			dropped = previous.len(),
			"synchronised stable list"
		);
	}

	/// The nodes, in list order.
	pub fn nodes(&self) -> impl '_ + Iterator<Item = &N> {
		self.items.values().map(StableItem::node)
	}

	/// Looks up an element by key.
	pub fn get(&self, key: &K) -> Option<&StableItem<T, N>> {
		self.items.get(key)
	}

	/// The number of elements.
	#[must_use]
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Whether the list is empty.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

impl<K: 'static + Hash + Eq, T: 'static + PartialEq + Clone, N: 'static> StableList<K, T, N> {
	/// Keeps a [`StableList`] synchronised with `source` for as long as the returned [`FollowedList`] lives.
	///
	/// # Panics
	///
	/// Panics if `source` changes while the list is borrowed through [`FollowedList::list`],
	/// or if `build` (or a subscriber of an item cell) writes to `source`.
	pub fn follow(
		source: &ValueRef<Vec<T>>,
		key: impl 'static + Fn(&T) -> K,
		build: impl 'static + FnMut(ValueRef<T>, ValueRef<usize>) -> N,
	) -> FollowedList<K, T, N> {
		let build = RefCell::new(build);
		let list = Rc::new(RefCell::new(Self::new()))
			.tap(|list| list.borrow_mut().sync(source.get_clone(), &key, &mut *build.borrow_mut()));

		let tracking = source.track(
			{
				let list = Rc::downgrade(&list);
				move |items: &Vec<T>| {
					if let Some(list) = list.upgrade() {
						list.borrow_mut()
							.sync(items.iter().cloned(), &key, &mut *build.borrow_mut());
					}
				}
			},
			TrackOptions::new().skip_first_call(),
		);

		FollowedList {
			tracking,
			list,
		}
	}
}

/// A [`StableList`] that follows a cell.
#[must_use = "Followed lists stop following when dropped."]
pub struct FollowedList<K, T: 'static, N> {
	tracking: Tracking,
	list: Rc<RefCell<StableList<K, T, N>>>,
}

impl<K: Debug, T: Debug, N: Debug> Debug for FollowedList<K, T, N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("FollowedList")
			.field("tracking", &self.tracking)
			.field("list", &self.list)
			.finish()
	}
}

impl<K, T, N> FollowedList<K, T, N> {
	/// Borrows the current list.
	///
	/// # Panics
	///
	/// Panics if called from within `build` or an item cell subscriber during synchronisation.
	pub fn list(&self) -> std::cell::Ref<'_, StableList<K, T, N>> {
		self.list.borrow()
	}
}
