use std::fmt::{self, Debug, Formatter};

/// A deferred release action returned from a tracking callback.
///
/// Runs at most once: either explicitly through [`Cleanup::release`] or when dropped.
#[must_use = "Cleanups run immediately when dropped."]
pub struct Cleanup(Option<Box<dyn FnOnce()>>);

impl Cleanup {
	/// Wraps `release`.
	pub fn new(release: impl 'static + FnOnce()) -> Self {
		Self(Some(Box::new(release)))
	}

	/// Runs the release action now.
	pub fn release(mut self) {
		self.run();
	}

	fn run(&mut self) {
		if let Some(release) = self.0.take() {
			release();
		}
	}
}

impl Drop for Cleanup {
	fn drop(&mut self) {
		self.run();
	}
}

impl Debug for Cleanup {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Cleanup")
			.field("pending", &self.0.is_some())
			.finish()
	}
}

/// What a tracking callback may return.
pub trait IntoCleanup {
	/// [`None`] means there is nothing to release.
	fn into_cleanup(self) -> Option<Cleanup>;
}

impl IntoCleanup for () {
	fn into_cleanup(self) -> Option<Cleanup> {
		None
	}
}

impl IntoCleanup for Cleanup {
	fn into_cleanup(self) -> Option<Cleanup> {
		Some(self)
	}
}

impl IntoCleanup for Option<Cleanup> {
	fn into_cleanup(self) -> Option<Cleanup> {
		self
	}
}
