use tendril::{shadow_clone, Cleanup, Effect, ValueCell};

use _validator::Validator;

#[test]
fn effects_run_immediately_and_on_change() {
	let v = Validator::new();

	let a = ValueCell::new(1);
	let b = ValueCell::new("x");
	let effect = Effect::new((a.to_ref(), b.to_ref()), {
		shadow_clone!(v);
		move |&(a, b)| {
			v.push(format!("run {a}{b}"));
			shadow_clone!(v);
			Cleanup::new(move || v.push(format!("clean {a}{b}")))
		}
	});
	v.expect(["run 1x".to_string()]);

	a.set(1);
	v.expect([]);

	b.set("y");
	v.expect(["run 1y".to_string(), "clean 1x".to_string()]);

	a.set(2);
	v.expect(["run 2y".to_string(), "clean 1y".to_string()]);

	effect.stop();
	v.expect(["clean 2y".to_string()]);
	assert_eq!(a.subscriber_count(), 0);
	assert_eq!(b.subscriber_count(), 0);

	a.set(3);
	v.expect([]);
}

#[test]
fn effects_over_collections() {
	let v = Validator::new();

	let cells = vec![ValueCell::new(1), ValueCell::new(2)];
	let _effect = Effect::new(cells.clone(), {
		shadow_clone!(v);
		move |values: &Vec<i32>| v.push(values.iter().sum::<i32>())
	});
	v.expect([3]);

	cells[0].set(5);
	v.expect([7]);
}
