//! `Stream`/`Future` adapters.

use std::{
	fmt::{self, Debug, Formatter},
	pin::Pin,
	rc::Rc,
	task::{Context, Poll},
};

use futures_channel::mpsc::{self, UnboundedReceiver};
use futures_lite::{Stream, StreamExt as _};
use tendril::{Source, Subscription};

/// A [`Stream`] of the values accepted by one cell, in write order.
///
/// Values are buffered until polled. The stream ends once the cell is gone.
#[must_use = "Streams do nothing unless polled."]
pub struct Changes<T: 'static> {
	receiver: UnboundedReceiver<Rc<T>>,
	subscription: Subscription,
}

impl<T> Debug for Changes<T> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Changes")
			.field("subscription", &self.subscription)
			.finish_non_exhaustive()
	}
}

impl<T> Stream for Changes<T> {
	type Item = Rc<T>;

	fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
		Pin::new(&mut self.receiver).poll_next(cx)
	}
}

/// Subscribes to `source`. The current value is not part of the stream.
pub fn changes<S: Source>(source: &S) -> Changes<S::Value> {
	let (sender, receiver) = mpsc::unbounded();
	let subscription = source.as_value_ref().subscribe_shared(move |value| {
		// The receiver may be gone already, which is fine.
		sender.unbounded_send(Rc::clone(value)).ok();
	});
	Changes {
		receiver,
		subscription,
	}
}

/// Resolves to the first value of `source` (current or later) that satisfies `predicate`.
///
/// The future owns `source`, so it stays pending until a matching value is written.
/// [`None`] means the change stream ended early.
pub async fn wait_for<S: Source>(
	source: S,
	mut predicate: impl FnMut(&S::Value) -> bool,
) -> Option<Rc<S::Value>> {
	let mut changes = changes(&source);
	let current = source.as_value_ref().read();
	if predicate(&current) {
		return Some(current);
	}
	changes.find(|value| predicate(value)).await
}
