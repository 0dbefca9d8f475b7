use tendril::{combine, reduce, reduce_by, select, select_by, shadow_clone, ValueCell};

use _validator::Validator;

#[test]
fn select_projects_and_filters() {
	let v = Validator::new();

	let cell = ValueCell::new((1, "a"));
	let first = select(cell.to_ref(), |&(n, _)| n);
	assert_eq!(first.get(), 1);
	let _sub = first.subscribe({
		shadow_clone!(v);
		move |&n| v.push(n)
	});

	cell.set((1, "b"));
	v.expect([]);
	assert_eq!(first.get(), 1);

	cell.set((2, "b"));
	v.expect([2]);
	assert_eq!(first.get(), 2);
}

#[test]
fn select_by_gates_with_the_comparator() {
	let v = Validator::new();

	let cell = ValueCell::new(1);
	let rough = select_by(
		cell.to_ref(),
		|&n| n,
		|last: &i32, next: &i32| (last - next).abs() < 10,
	);
	let _sub = rough.subscribe({
		shadow_clone!(v);
		move |&n| v.push(n)
	});

	cell.set(5);
	v.expect([]);
	assert_eq!(rough.get(), 1);

	cell.set(15);
	v.expect([15]);

	cell.set(20);
	v.expect([]);
	assert_eq!(rough.get(), 15);
}

#[test]
fn combine_re_reads_all_sources() {
	let v = Validator::new();

	let count = ValueCell::new(1);
	let label = ValueCell::new("x");
	let combined = combine((count.to_ref(), label.to_ref()));
	assert_eq!(combined.get_clone(), (1, "x"));
	let _sub = combined.subscribe({
		shadow_clone!(v);
		move |&values| v.push(values)
	});

	count.set(2);
	v.expect([(2, "x")]);

	label.set("x");
	v.expect([]);

	label.set("y");
	v.expect([(2, "y")]);
}

#[test]
fn combine_accepts_collections() {
	let cells = [ValueCell::new(1), ValueCell::new(2), ValueCell::new(3)];

	let array = combine(cells.clone());
	let vec = combine(cells.to_vec());
	assert_eq!(array.get(), [1, 2, 3]);
	assert_eq!(vec.get_clone(), [1, 2, 3]);

	cells[1].set(20);
	assert_eq!(array.get(), [1, 20, 3]);
	assert_eq!(vec.get_clone(), [1, 20, 3]);
}

#[test]
fn reduce_aggregates() {
	let v = Validator::new();

	let a = ValueCell::new(1);
	let b = ValueCell::new(2);
	let c = ValueCell::new(3);
	let sum = reduce((a.to_ref(), b.to_ref(), c.to_ref()), |&(a, b, c)| a + b + c);
	assert_eq!(sum.get(), 6);
	let _sub = sum.subscribe({
		shadow_clone!(v);
		move |&n| v.push(n)
	});

	a.set(2);
	v.expect([7]);

	a.set(3);
	b.set(1);
	v.expect([8, 7]);
}

#[test]
fn reduce_drops_unchanged_results() {
	let v = Validator::new();

	let a = ValueCell::new(1);
	let b = ValueCell::new(5);
	let max = reduce((a.to_ref(), b.to_ref()), |&(a, b)| a.max(b));
	let _sub = max.subscribe({
		shadow_clone!(v);
		move |&n| v.push(n)
	});

	a.set(2);
	v.expect([]);

	a.set(7);
	v.expect([7]);

	b.set(6);
	v.expect([]);
	assert_eq!(max.get(), 7);
}

#[test]
fn reduce_by_gates_the_final_value() {
	let v = Validator::new();

	let a = ValueCell::new(1);
	let b = ValueCell::new(1);
	let parity = reduce_by(
		(a.to_ref(), b.to_ref()),
		|&(a, b)| a + b,
		|last: &i32, next: &i32| last % 2 == next % 2,
	);
	let _sub = parity.subscribe({
		shadow_clone!(v);
		move |&n| v.push(n)
	});

	a.set(3);
	v.expect([]);
	assert_eq!(parity.get(), 2);

	b.set(2);
	v.expect([5]);
}

#[test]
fn derived_values_chain() {
	let cell = ValueCell::new(3);
	let doubled = select(cell.to_ref(), |n| n * 2);
	let described = select(doubled, |n| format!("{n}"));
	assert_eq!(described.get_clone(), "6");

	cell.set(4);
	assert_eq!(described.get_clone(), "8");
}

#[test]
fn dropping_a_derived_value_stops_updates() {
	let cell = ValueCell::new(1);
	let doubled = select(cell.to_ref(), |n| n * 2);
	let combined = combine((cell.to_ref(),));
	assert_eq!(cell.subscriber_count(), 2);

	let doubled_ref = doubled.to_ref();
	let combined_ref = combined.to_ref();
	drop((doubled, combined));
	assert_eq!(cell.subscriber_count(), 0);

	cell.set(5);
	assert_eq!(doubled_ref.get(), 2);
	assert_eq!(combined_ref.get(), (1,));
}
