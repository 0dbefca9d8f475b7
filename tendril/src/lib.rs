#![warn(clippy::pedantic)]
#![warn(missing_docs)]
#![warn(unreachable_pub)]

//! Fine-grained reactive values for single-threaded code.
//!
//! A [`ValueCell`] holds one value and a registry of subscribers.
//! Writes that its [`Equality`] policy considers no-ops are dropped without notifying anyone;
//! all other writes synchronously notify every subscriber, in registration order.
//!
//! On top of that:
//!
//! - [`ValueRef::track_selector`] runs a callback when a projection of the value changes,
//!   optionally gated by a comparator and with a [`Cleanup`] released once the next run has returned.
//! - [`select`], [`combine`] and [`reduce`] derive read-only cells from one or more [`Source`]s.
//! - [`Effect`] runs a side effect over several sources at once.
//!
//! Everything here is `!Send`. Handles are reference-counted and cheap to clone.
//!
//! ```
//! use tendril::{reduce, ValueCell};
//!
//! let price = ValueCell::new(3);
//! let quantity = ValueCell::new(2);
//! let total = reduce((price.to_ref(), quantity.to_ref()), |&(price, quantity)| price * quantity);
//! assert_eq!(total.get(), 6);
//!
//! quantity.set(5);
//! assert_eq!(total.get(), 15);
//! ```

mod cell;
pub use cell::{Equality, Subscription, ValueCell, ValueRef, WeakValueRef};

mod cleanup;
pub use cleanup::{Cleanup, IntoCleanup};

mod tracking;
pub use tracking::{TrackOptions, Tracking};

mod source;
pub use source::{Source, Sources};

mod derived;
pub use derived::{combine, reduce, reduce_by, select, select_by, Derived};

mod effect;
pub use effect::Effect;

/// Shadows each identifier with a [`Clone::clone`] of itself.
///
/// Handy right before a `move` closure.
#[macro_export]
macro_rules! shadow_clone {
	($($ident:ident),*$(,)?) => {
		$(let $ident = ::core::clone::Clone::clone(&$ident);)*
	};
}
