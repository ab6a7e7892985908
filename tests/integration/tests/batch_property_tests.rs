//! Property-based tests for batch coalescing
//!
//! Uses proptest to verify:
//! 1. Arbitrary write bursts deliver at most one event per property
//! 2. The one event carries the latest value and the pre-batch old value
//! 3. Derived properties end every batch consistent with their sources
//! 4. Nesting depth never changes what a batch delivers

use proptest::prelude::*;
use resonant::{Batch, Record, Value, batch_depth};
use resonant_integration_tests::ChangeLog;
use resonant_integration_tests::fixtures;
use rstest::rstest;
use serial_test::serial;

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	/// Property: a burst of writes coalesces to at most one event per
	/// property, carrying `(latest new, first old)`.
	#[rstest]
	#[serial(batch)]
	fn test_writes_coalesce_per_property(
		writes in prop::collection::vec((0usize..3, -8i64..8), 0..24)
	) {
		let names = ["a", "b", "c"];
		let record = Record::builder()
			.field("a", 0)
			.field("b", 0)
			.field("c", 0)
			.build()
			.unwrap();
		let logs: Vec<ChangeLog> = names
			.iter()
			.map(|name| ChangeLog::attach(&record, *name))
			.collect();

		Batch::run(|| {
			for (slot, value) in &writes {
				record.set(names[*slot], *value);
			}
		});

		for (name, log) in names.into_iter().zip(&logs) {
			let final_value = record.get(name);
			prop_assert!(log.len() <= 1, "{} delivered {} events", name, log.len());
			match log.pairs().first() {
				Some((new, old)) => {
					prop_assert_eq!(new, &final_value);
					prop_assert_eq!(old, &Value::from(0));
					prop_assert_ne!(new, old);
				}
				// No event means the property never left its old value.
				None => prop_assert_eq!(final_value, Value::from(0)),
			}
		}
	}
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(32))]

	/// Property: however its sources are written, a derived property ends
	/// the batch consistent with them and reports at most one change.
	#[rstest]
	#[serial(batch)]
	fn test_derived_property_is_consistent_after_a_batch(
		firsts in prop::collection::vec("[A-Za-z]{1,8}", 1..6),
		lasts in prop::collection::vec("[A-Za-z]{1,8}", 1..6),
	) {
		let record = fixtures::person();
		let log = ChangeLog::attach(&record, "full_name");

		Batch::run(|| {
			for first in &firsts {
				record.set("first", first.as_str());
			}
			for last in &lasts {
				record.set("last", last.as_str());
			}
		});

		let expected = format!("{} {}", record.get("first"), record.get("last"));
		prop_assert_eq!(record.get("full_name"), Value::from(expected.as_str()));
		prop_assert!(log.len() <= 1);
		match log.pairs().first() {
			Some((new, old)) => {
				prop_assert_eq!(new, &Value::from(expected.as_str()));
				prop_assert_eq!(old, &Value::from("Justin Meyer"));
			}
			None => prop_assert_eq!(expected.as_str(), "Justin Meyer"),
		}
	}
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(16))]

	/// Property: delivery happens exactly once, at the outermost close,
	/// whatever the nesting depth.
	#[rstest]
	#[serial(batch)]
	fn test_nesting_depth_does_not_change_delivery(depth in 1usize..5) {
		let record = Record::builder().field("age", 0).build().unwrap();
		let log = ChangeLog::attach(&record, "age");

		let mut guards: Vec<Batch> = (0..depth).map(|_| Batch::new()).collect();
		record.set("age", 1);
		record.set("age", 2);

		while let Some(guard) = guards.pop() {
			prop_assert!(log.is_empty());
			prop_assert_eq!(batch_depth(), guards.len() + 1);
			drop(guard);
		}

		prop_assert_eq!(batch_depth(), 0);
		prop_assert_eq!(log.pairs(), vec![(Value::from(2), Value::from(0))]);
	}
}
