//! Assignment Channel Tests
//!
//! Writing a computed property never touches its value directly. These
//! tests cover the two ways a definition can react: listening for custom
//! events dispatched on the record, and listening on the property's own
//! assignment channel.

use resonant::{Record, Source, Value};
use resonant_integration_tests::ChangeLog;
use resonant_integration_tests::fixtures::{locator, locator_with_setter};
use rstest::rstest;

#[rstest]
fn test_city_follows_dispatched_events() {
	let record = locator();
	let log = ChangeLog::attach(&record, "city");

	record.dispatch("city_set", ["Chicago"]);

	assert_eq!(record.get("city"), Value::from("Chicago"));
	assert_eq!(log.pairs(), vec![(Value::from("Chicago"), Value::Null)]);
}

#[rstest]
fn test_state_change_resets_city() {
	let record = locator();
	let log = ChangeLog::attach(&record, "city");

	record.dispatch("city_set", ["Chicago"]);
	record.set("state", "WI");

	assert!(record.get("city").is_null());
	assert_eq!(
		log.pairs(),
		vec![
			(Value::from("Chicago"), Value::Null),
			(Value::Null, Value::from("Chicago")),
		]
	);
}

#[rstest]
fn test_assignment_reaches_a_listening_definition() {
	let record = locator_with_setter();
	let log = ChangeLog::attach(&record, "city");

	record.set("city", "San Jose");

	assert_eq!(record.get("city"), Value::from("San Jose"));
	assert_eq!(log.pairs(), vec![(Value::from("San Jose"), Value::Null)]);
}

#[rstest]
fn test_assignment_is_inert_without_a_listening_definition() {
	// The plain locator never subscribes to its assignment channel, so a
	// write records the raw value and otherwise does nothing.
	let record = locator();
	let log = ChangeLog::attach(&record, "city");

	record.set("city", "San Jose");

	assert!(record.get("city").is_null());
	assert!(log.is_empty());
}

#[rstest]
fn test_channel_keeps_the_raw_value_across_resets() {
	let record = locator_with_setter();
	let log = ChangeLog::attach(&record, "city");

	record.set("city", "San Jose");
	record.set("state", "CA");
	assert!(record.get("city").is_null());

	// The channel has no equality gate, so re-assigning the remembered
	// value still runs the definition and raises a change.
	record.set("city", "San Jose");
	assert_eq!(record.get("city"), Value::from("San Jose"));
	assert_eq!(
		log.pairs(),
		vec![
			(Value::from("San Jose"), Value::Null),
			(Value::Null, Value::from("San Jose")),
			(Value::from("San Jose"), Value::Null),
		]
	);
}

#[rstest]
fn test_same_named_field_seeds_the_channel() {
	// A plain field sharing the computed property's name becomes the
	// channel's initial value instead of a second property.
	let record = Record::builder()
		.field("city", "Peoria")
		.field("state", "IL")
		.computed("city", |_record, context| {
			context.resolve(context.last_set().get());
			let resolver = context.clone();
			context.listen_to(Source::LastSet, move |_event, args| {
				resolver.resolve(args.first().cloned().unwrap_or_default());
			});
			let resolver = context.clone();
			context.listen_to("state", move |_event, _args| resolver.resolve(Value::Null));
		})
		.build()
		.unwrap();

	assert_eq!(record.get("city"), Value::from("Peoria"));

	let log = ChangeLog::attach(&record, "city");
	assert_eq!(record.get("city"), Value::from("Peoria"));

	// A dependency change overrides the seed: assignment is not sticky.
	record.set("state", "CA");
	assert!(record.get("city").is_null());

	// A fresh assignment wins again, until the next dependency change.
	record.set("city", "San Jose");
	assert_eq!(record.get("city"), Value::from("San Jose"));
	record.set("state", "OR");
	assert!(record.get("city").is_null());

	assert_eq!(
		log.new_values(),
		vec![Value::Null, Value::from("San Jose"), Value::Null]
	);
}
