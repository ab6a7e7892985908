//! List Rebinding Tests
//!
//! A computed property can follow objects other than its own record. These
//! tests swap an observable list out from under a bound property and check
//! that subscriptions move with it.

use resonant::{ObservableList, Value};
use resonant_integration_tests::ChangeLog;
use resonant_integration_tests::fixtures::task_board;
use rstest::rstest;

#[rstest]
fn test_count_is_zero_while_no_list_is_held() {
	let board = task_board(Value::Null);

	assert_eq!(board.get("task_count"), Value::from(0));

	let tasks = ObservableList::from_values(["a", "b"]);
	board.set("tasks", &tasks);
	assert_eq!(board.get("task_count"), Value::from(2));

	// Unbound reads never leave subscriptions behind.
	assert!(!tasks.is_bound());
	assert!(!board.is_bound());
}

#[rstest]
fn test_task_count_follows_the_current_list() {
	let tasks = ObservableList::from_values(["dishes", "laundry"]);
	let board = task_board(&tasks);
	let log = ChangeLog::attach(&board, "task_count");

	assert_eq!(board.get("task_count"), Value::from(2));
	tasks.push("sweep");
	assert_eq!(board.get("task_count"), Value::from(3));
	assert_eq!(log.pairs(), vec![(Value::from(3), Value::from(2))]);
}

#[rstest]
fn test_swapping_the_list_moves_the_subscriptions() {
	let original = ObservableList::from_values(["dishes", "laundry", "sweep"]);
	let board = task_board(&original);
	let log = ChangeLog::attach(&board, "task_count");
	assert!(original.is_bound());

	let replacement = ObservableList::from_values(["mow"]);
	board.set("tasks", &replacement);

	assert_eq!(board.get("task_count"), Value::from(1));
	assert!(!original.is_bound());
	assert!(replacement.is_bound());

	// The old list no longer reaches the property; the new one does.
	original.push("ignored");
	assert_eq!(board.get("task_count"), Value::from(1));
	replacement.push("water plants");
	assert_eq!(board.get("task_count"), Value::from(2));

	assert_eq!(log.new_values(), vec![Value::from(1), Value::from(2)]);
}

#[rstest]
fn test_unbound_read_leaves_no_subscriptions_behind() {
	let tasks = ObservableList::from_values([1, 2, 3]);
	let board = task_board(&tasks);

	assert_eq!(board.get("task_count"), Value::from(3));
	assert!(!tasks.is_bound());
	assert!(!board.is_bound());
}

#[rstest]
fn test_clearing_the_list_property_counts_zero() {
	let tasks = ObservableList::from_values(["dishes"]);
	let board = task_board(&tasks);
	let log = ChangeLog::attach(&board, "task_count");

	board.set("tasks", Value::Null);

	assert_eq!(board.get("task_count"), Value::from(0));
	assert!(!tasks.is_bound());
	assert_eq!(log.pairs(), vec![(Value::from(0), Value::from(1))]);
}
