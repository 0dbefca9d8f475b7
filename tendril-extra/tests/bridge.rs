#![cfg(feature = "bridge")]

use std::{cell::RefCell, rc::Rc};

use tendril::{select, shadow_clone};
use tendril_extra::bridge::{bridge, ExternalStore};

use _validator::Validator;

type State = (i32, &'static str);
type Listener = Rc<dyn Fn(&State)>;

#[derive(Clone, Default)]
struct Store {
	state: Rc<RefCell<State>>,
	listeners: Rc<RefCell<Vec<(usize, Listener)>>>,
	next_id: Rc<RefCell<usize>>,
}

impl Store {
	fn dispatch(&self, state: State) {
		*self.state.borrow_mut() = state;
		let listeners = self
			.listeners
			.borrow()
			.iter()
			.map(|(_, listener)| Rc::clone(listener))
			.collect::<Vec<_>>();
		for listener in listeners {
			listener(&state);
		}
	}

	fn listener_count(&self) -> usize {
		self.listeners.borrow().len()
	}
}

impl ExternalStore for Store {
	type State = State;

	fn state(&self) -> State {
		*self.state.borrow()
	}

	fn subscribe(&self, listener: Box<dyn Fn(&State)>) -> Box<dyn FnOnce()> {
		let id = {
			let mut next_id = self.next_id.borrow_mut();
			*next_id += 1;
			*next_id
		};
		self.listeners.borrow_mut().push((id, Rc::from(listener)));

		let listeners = Rc::clone(&self.listeners);
		Box::new(move || listeners.borrow_mut().retain(|(other, _)| *other != id))
	}
}

#[test]
fn bridged_cells_follow_the_store() {
	let v = Validator::new();

	let store = Store::default();
	store.dispatch((1, "a"));

	let count = bridge(&store, |&(count, _)| count);
	assert_eq!(count.get(), 1);
	assert_eq!(store.listener_count(), 1);
	let _sub = count.subscribe({
		shadow_clone!(v);
		move |&n| v.push(n)
	});

	store.dispatch((1, "b"));
	v.expect([]);

	store.dispatch((2, "b"));
	v.expect([2]);
	assert_eq!(count.get(), 2);

	drop(count);
	assert_eq!(store.listener_count(), 0);

	store.dispatch((3, "b"));
	v.expect([]);
}

#[test]
fn bridged_cells_are_sources() {
	let store = Store::default();
	let label = select(bridge(&store, |&(_, label)| label), |label| label.len());
	assert_eq!(label.get(), 0);

	store.dispatch((0, "four"));
	assert_eq!(label.get(), 4);

	drop(label);
	assert_eq!(store.listener_count(), 0);
}
