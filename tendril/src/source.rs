//! What the combinators accept as input.

use std::rc::Rc;

use crate::{
	cell::{ValueCell, ValueRef},
	derived::Derived,
	tracking::{TrackOptions, Tracking},
};

/// A single reactive value that combinators can read and track.
pub trait Source: 'static {
	/// The observed value type.
	type Value: 'static;

	/// The underlying read-only handle.
	fn as_value_ref(&self) -> &ValueRef<Self::Value>;
}

impl<T: 'static> Source for ValueRef<T> {
	type Value = T;

	fn as_value_ref(&self) -> &ValueRef<T> {
		self
	}
}

impl<T: 'static> Source for ValueCell<T> {
	type Value = T;

	fn as_value_ref(&self) -> &ValueRef<T> {
		self
	}
}

impl<T: 'static> Source for Derived<T> {
	type Value = T;

	fn as_value_ref(&self) -> &ValueRef<T> {
		self
	}
}

/// A fixed group of [`Source`]s, read and tracked together.
///
/// Implemented for tuples of up to 12 sources, for [`Vec`]s and for arrays.
pub trait Sources: 'static {
	/// A snapshot of every source's current value.
	type Values: 'static;

	/// Reads every source, in order.
	fn read_all(&self) -> Self::Values;

	/// Calls `on_change` after each accepted change of any source, for as long as the returned trackings live.
	fn on_each_change(&self, on_change: &Rc<dyn Fn()>) -> Vec<Tracking>;
}

fn track_changes<T: 'static>(source: &ValueRef<T>, on_change: &Rc<dyn Fn()>) -> Tracking {
	let on_change = Rc::clone(on_change);
	source.track_selector(
		|_| (),
		move |_: &()| on_change(),
		TrackOptions::new().skip_first_call(),
	)
}

macro_rules! impl_sources_for_tuple {
	($($name:ident $index:tt),+) => {
		impl<$($name: Source),+> Sources for ($($name,)+)
		where
			$($name::Value: Clone),+
		{
			type Values = ($($name::Value,)+);

			fn read_all(&self) -> Self::Values {
				($(self.$index.as_value_ref().get_clone(),)+)
			}

			fn on_each_change(&self, on_change: &Rc<dyn Fn()>) -> Vec<Tracking> {
				vec![$(track_changes(self.$index.as_value_ref(), on_change)),+]
			}
		}
	};
}

impl_sources_for_tuple!(A 0);
impl_sources_for_tuple!(A 0, B 1);
impl_sources_for_tuple!(A 0, B 1, C 2);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3, E 4);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10);
impl_sources_for_tuple!(A 0, B 1, C 2, D 3, E 4, F 5, G 6, H 7, I 8, J 9, K 10, L 11);

impl<S: Source> Sources for Vec<S>
where
	S::Value: Clone,
{
	type Values = Vec<S::Value>;

	fn read_all(&self) -> Self::Values {
		self.iter()
			.map(|source| source.as_value_ref().get_clone())
			.collect()
	}

	fn on_each_change(&self, on_change: &Rc<dyn Fn()>) -> Vec<Tracking> {
		self.iter()
			.map(|source| track_changes(source.as_value_ref(), on_change))
			.collect()
	}
}

impl<S: Source, const N: usize> Sources for [S; N]
where
	S::Value: Clone,
{
	type Values = [S::Value; N];

	fn read_all(&self) -> Self::Values {
		std::array::from_fn(|i| self[i].as_value_ref().get_clone())
	}

	fn on_each_change(&self, on_change: &Rc<dyn Fn()>) -> Vec<Tracking> {
		self.iter()
			.map(|source| track_changes(source.as_value_ref(), on_change))
			.collect()
	}
}
