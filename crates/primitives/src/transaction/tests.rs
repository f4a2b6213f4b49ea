use proptest::prelude::*;

use super::*;
use crate::Rope;
use crate::edit::EditError;

#[test]
fn test_from_edits_insert() {
	let doc = Rope::from("hello");
	let cs = ChangeSet::from_edits(doc.len_chars(), &[Edit::insert(0, "say ")]).unwrap();
	assert_eq!(cs.len(), 5);
	assert_eq!(cs.len_after(), 9);
	assert_eq!(cs.applied(&doc).to_string(), "say hello");
}

#[test]
fn test_from_edits_replace_and_delete() {
	let doc = Rope::from("hello world");
	let cs = ChangeSet::from_edits(doc.len_chars(), &[Edit::replace(0, 5, "hi"), Edit::delete(5, 6)]).unwrap();
	assert_eq!(cs.applied(&doc).to_string(), "hiworld");
	assert_eq!(cs.len_after(), 7);
}

#[test]
fn test_from_edits_adjacent_allowed() {
	let doc = Rope::from("abcd");
	let cs = ChangeSet::from_edits(doc.len_chars(), &[Edit::replace(0, 2, "x"), Edit::insert(2, "y")]).unwrap();
	assert_eq!(cs.applied(&doc).to_string(), "xycd");
}

#[test]
fn test_from_edits_rejects_bad_input() {
	assert_eq!(
		ChangeSet::from_edits(3, &[Edit::delete(2, 5)]),
		Err(EditError::OutOfBounds { end: 5, len: 3 })
	);
	assert_eq!(
		ChangeSet::from_edits(10, &[Edit::delete(4, 6), Edit::delete(5, 7)]),
		Err(EditError::Overlapping { at: 5 })
	);
	assert_eq!(
		ChangeSet::from_edits(10, &[Edit {
			start: 6,
			end: 4,
			replacement: String::new(),
		}]),
		Err(EditError::Reversed { start: 6, end: 4 })
	);
}

#[test]
fn test_empty_changeset_is_identity() {
	let cs = ChangeSet::from_edits(10, &[]).unwrap();
	assert!(cs.is_empty());
	assert_eq!(cs.map_pos(7, Bias::Left), 7);
	assert_eq!(cs.len_after(), 10);
}

#[test]
fn test_map_pos_insert_bias() {
	let cs = ChangeSet::from_edits(10, &[Edit::insert(5, "abc")]).unwrap();
	assert_eq!(cs.map_pos(4, Bias::Left), 4);
	assert_eq!(cs.map_pos(5, Bias::Left), 5);
	assert_eq!(cs.map_pos(5, Bias::Right), 8);
	assert_eq!(cs.map_pos(6, Bias::Left), 9);
	assert_eq!(cs.map_pos(10, Bias::Left), 13);
}

#[test]
fn test_map_pos_delete_collapses() {
	let cs = ChangeSet::from_edits(10, &[Edit::delete(2, 6)]).unwrap();
	assert_eq!(cs.map_pos(1, Bias::Left), 1);
	assert_eq!(cs.map_pos(2, Bias::Left), 2);
	assert_eq!(cs.map_pos(4, Bias::Right), 2);
	assert_eq!(cs.map_pos(6, Bias::Left), 2);
	assert_eq!(cs.map_pos(8, Bias::Left), 4);
}

#[test]
fn test_map_pos_replace_boundaries() {
	let cs = ChangeSet::from_edits(12, &[Edit::replace(5, 10, "ab")]).unwrap();
	assert_eq!(cs.map_pos(5, Bias::Left), 5);
	assert_eq!(cs.map_pos(5, Bias::Right), 7);
	assert_eq!(cs.map_pos(10, Bias::Left), 7);
	assert_eq!(cs.map_pos(11, Bias::Left), 8);
}

proptest! {
	#[test]
	fn prop_map_pos_stays_in_bounds(
		len in 0usize..200,
		at in 0usize..200,
		del in 0usize..50,
		ins in "[a-z]{0,20}",
		pos in 0usize..200,
	) {
		let at = at.min(len);
		let end = (at + del).min(len);
		let pos = pos.min(len);
		let cs = ChangeSet::from_edits(len, &[Edit::replace(at, end, ins)]).unwrap();
		prop_assert!(cs.map_pos(pos, Bias::Left) <= cs.len_after());
		prop_assert!(cs.map_pos(pos, Bias::Right) <= cs.len_after());
		prop_assert!(cs.map_pos(pos, Bias::Left) <= cs.map_pos(pos, Bias::Right));
	}
}
