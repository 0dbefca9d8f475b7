#![warn(clippy::pedantic)]
#![warn(unreachable_pub)]

//! Adapters and method syntax for [`tendril`] cells.

#[cfg(feature = "bridge")]
pub mod bridge;

#[cfg(feature = "future")]
pub mod future;

#[cfg(feature = "stable")]
pub mod stable;

/// Method-call syntax for the [`tendril`] combinators.
///
/// ```
/// use tendril::ValueCell;
/// use tendril_extra::prelude::*;
///
/// let cell = ValueCell::new(2);
/// let squared = cell.to_ref().select(|n: &i32| n * n);
/// assert_eq!(squared.get(), 4);
/// ```
pub mod prelude {
	use ext_trait::extension;
	use tendril::{Derived, Effect, IntoCleanup, Source, Sources};

	/// Combinators over one [`Source`].
	#[extension(pub trait SourceExt)]
	impl<S: Source> S {
		/// See [`tendril::select`].
		fn select<F: 'static + PartialEq>(
			self,
			selector: impl 'static + Fn(&S::Value) -> F,
		) -> Derived<F> {
			tendril::select(self, selector)
		}

		/// See [`tendril::select_by`].
		fn select_by<F: 'static + PartialEq>(
			self,
			selector: impl 'static + Fn(&S::Value) -> F,
			comparator: impl 'static + Fn(&F, &F) -> bool,
		) -> Derived<F> {
			tendril::select_by(self, selector, comparator)
		}
	}

	/// Combinators over a group of [`Sources`].
	#[extension(pub trait SourcesExt)]
	impl<S: Sources> S {
		/// See [`tendril::combine`].
		fn combine(self) -> Derived<S::Values> {
			tendril::combine(self)
		}

		/// See [`tendril::reduce`].
		fn reduce<F: 'static + PartialEq>(
			self,
			reducer: impl 'static + Fn(&S::Values) -> F,
		) -> Derived<F> {
			tendril::reduce(self, reducer)
		}

		/// See [`tendril::reduce_by`].
		fn reduce_by<F: 'static + PartialEq>(
			self,
			reducer: impl 'static + Fn(&S::Values) -> F,
			comparator: impl 'static + Fn(&F, &F) -> bool,
		) -> Derived<F> {
			tendril::reduce_by(self, reducer, comparator)
		}

		/// See [`Effect::new`].
		fn effect<C: 'static + IntoCleanup>(
			self,
			callback: impl 'static + Fn(&S::Values) -> C,
		) -> Effect {
			Effect::new(self, callback)
		}
	}
}
