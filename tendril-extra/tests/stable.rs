#![cfg(feature = "stable")]

use tendril::{shadow_clone, Subscription, ValueCell, ValueRef};
use tendril_extra::stable::{StableItem, StableList};

use _validator::Validator;

#[derive(Debug, Clone, PartialEq)]
struct Row {
	id: u32,
	text: &'static str,
}

const fn row(id: u32, text: &'static str) -> Row {
	Row { id, text }
}

fn build(v: &Validator<String>) -> impl 'static + FnMut(ValueRef<Row>, ValueRef<usize>) -> Vec<Subscription> {
	let v = v.clone();
	move |item, index| {
		let id = item.read().id;
		v.push(format!("build {id}"));
		vec![
			item.subscribe({
				shadow_clone!(v);
				move |row: &Row| v.push(format!("item {} {}", row.id, row.text))
			}),
			index.subscribe({
				shadow_clone!(v);
				move |&index: &usize| v.push(format!("index {id} {index}"))
			}),
		]
	}
}

#[test]
fn items_are_built_once_and_then_updated() {
	let v = Validator::new();

	let built = StableItem::new(row(1, "a"), 0, build(&v));
	v.expect(["build 1".to_string()]);

	built.update(row(1, "a"), 0);
	v.expect([]);

	built.update(row(1, "b"), 0);
	v.expect(["item 1 b".to_string()]);

	built.update(row(1, "b"), 3);
	v.expect(["index 1 3".to_string()]);
	assert_eq!(built.index().get(), 3);
	assert_eq!(built.item().get_clone(), row(1, "b"));
	assert_eq!(built.node().len(), 2);
}

#[test]
fn sync_retains_builds_and_drops_by_key() {
	let v = Validator::new();
	let mut build = build(&v);

	let mut list = StableList::new();
	assert!(list.is_empty());

	list.sync([row(1, "a"), row(2, "b")], |row| row.id, &mut build);
	v.expect(["build 1".to_string(), "build 2".to_string()]);
	assert_eq!(list.len(), 2);

	list.sync([row(2, "b"), row(1, "changed")], |row| row.id, &mut build);
	v.expect([
		"index 2 0".to_string(),
		"item 1 changed".to_string(),
		"index 1 1".to_string(),
	]);
	assert_eq!(
		list.nodes().map(Vec::len).collect::<Vec<_>>(),
		[2, 2]
	);
	assert_eq!(list.get(&1).map(|item| item.index().get()), Some(1));

	list.sync([row(2, "b")], |row| row.id, &mut build);
	v.expect([]);
	assert_eq!(list.len(), 1);
	assert!(list.get(&1).is_none());

	list.sync([row(1, "a"), row(2, "b")], |row| row.id, &mut build);
	v.expect(["build 1".to_string(), "index 2 1".to_string()]);
	assert_eq!(list.len(), 2);
}

#[test]
fn followed_lists_track_their_source() {
	let v = Validator::new();

	let rows = ValueCell::new(vec![row(1, "a")]);
	let followed = StableList::follow(&rows.to_ref(), |row| row.id, build(&v));
	v.expect(["build 1".to_string()]);
	assert_eq!(followed.list().len(), 1);

	rows.set(vec![row(1, "a"), row(2, "b")]);
	v.expect(["build 2".to_string()]);
	assert_eq!(followed.list().len(), 2);

	rows.update(|rows| rows.iter().rev().cloned().collect());
	v.expect(["index 2 0".to_string(), "index 1 1".to_string()]);

	drop(followed);
	assert_eq!(rows.subscriber_count(), 0);

	rows.set(vec![]);
	v.expect([]);
}
