use std::{
	any::Any,
	fmt::{self, Debug, Formatter},
};

use crate::{
	cleanup::IntoCleanup,
	derived::combine,
	source::Sources,
	tracking::{TrackOptions, Tracking},
};

/// A side effect over several sources.
///
/// The callback runs immediately and then after each accepted change of any source, with all current values.
/// The cleanup it returns is released right after the next run and when the [`Effect`] is dropped.
///
/// ```
/// use std::{cell::RefCell, rc::Rc};
/// use tendril::{shadow_clone, Cleanup, Effect, ValueCell};
///
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let a = ValueCell::new(1);
/// let b = ValueCell::new(10);
///
/// let effect = Effect::new((a.to_ref(), b.to_ref()), {
/// 	shadow_clone!(log);
/// 	move |&(a, b)| {
/// 		log.borrow_mut().push(format!("run {}", a + b));
/// 		shadow_clone!(log);
/// 		Cleanup::new(move || log.borrow_mut().push(format!("drop {}", a + b)))
/// 	}
/// });
/// a.set(2);
/// drop(effect);
///
/// assert_eq!(*log.borrow(), ["run 11", "run 12", "drop 11", "drop 12"]);
/// ```
#[must_use = "Effects are cancelled when dropped."]
pub struct Effect {
	tracking: Tracking,
	_combined: Box<dyn Any>,
}

impl Debug for Effect {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Effect")
			.field("tracking", &self.tracking)
			.finish_non_exhaustive()
	}
}

impl Effect {
	/// Starts the effect. `callback` runs once before this returns.
	pub fn new<S: Sources, C: 'static + IntoCleanup>(
		sources: S,
		callback: impl 'static + Fn(&S::Values) -> C,
	) -> Self {
		let combined = combine(sources);
		let tracking = combined.track(callback, TrackOptions::new());
		Self {
			tracking,
			_combined: Box::new(combined),
		}
	}

	/// Same as dropping the [`Effect`].
	pub fn stop(self) {
		drop(self);
	}
}
