//! Record Resolution Tests
//!
//! Exercises the two resolution modes of computed properties through the
//! public facade: fresh definition runs while unbound, cached values and
//! change events while bound.

use resonant::{Record, Source, Value};
use resonant_integration_tests::ChangeLog;
use resonant_integration_tests::fixtures::{name_change_counter, person};
use rstest::rstest;

#[rstest]
fn test_unbound_reads_run_the_definition_from_scratch() {
	let record = name_change_counter();

	record.set("name", "Justin");
	assert_eq!(record.get("name_changes"), Value::from(0));

	// The write landed while nothing was listening, so every read still
	// starts from a fresh run.
	record.set("name", "Payal");
	assert_eq!(record.get("name_changes"), Value::from(0));
}

#[rstest]
fn test_bound_property_accumulates_between_reads() {
	let record = name_change_counter();
	let log = ChangeLog::attach(&record, "name_changes");

	record.set("name", "Justin");
	record.set("name", "Payal");
	assert_eq!(record.get("name_changes"), Value::from(2));
	assert_eq!(
		log.pairs(),
		vec![
			(Value::from(1), Value::from(0)),
			(Value::from(2), Value::from(1)),
		]
	);

	// Removing the only listener unbinds the property again.
	assert!(record.off("name_changes", log.listener()));
	assert!(!record.is_bound());
	assert_eq!(record.get("name_changes"), Value::from(0));
}

#[rstest]
fn test_unbound_read_tracks_current_sources() {
	let record = person();

	assert_eq!(record.get("full_name"), Value::from("Justin Meyer"));
	record.set("first", "Ramiya");
	assert_eq!(record.get("full_name"), Value::from("Ramiya Meyer"));
	assert!(!record.is_bound());
}

#[rstest]
fn test_binding_does_not_raise_a_baseline_event() {
	let record = person();
	let log = ChangeLog::attach(&record, "full_name");

	// The bind-time run only establishes the cached value.
	assert!(log.is_empty());
	assert_eq!(record.get("full_name"), Value::from("Justin Meyer"));
}

#[rstest]
fn test_bound_property_raises_changes_as_sources_move() {
	let record = person();
	let log = ChangeLog::attach(&record, "full_name");

	record.set("first", "Ramiya");
	record.set("last", "Shah");

	assert_eq!(
		log.pairs(),
		vec![
			(Value::from("Ramiya Meyer"), Value::from("Justin Meyer")),
			(Value::from("Ramiya Shah"), Value::from("Ramiya Meyer")),
		]
	);
}

#[rstest]
fn test_no_events_after_the_last_listener_leaves() {
	let record = person();
	let log = ChangeLog::attach(&record, "full_name");

	record.set("first", "Ramiya");
	assert_eq!(log.len(), 1);

	assert!(record.off("full_name", log.listener()));
	record.set("first", "Justin");

	assert_eq!(log.len(), 1);
	assert_eq!(record.get("full_name"), Value::from("Justin Meyer"));
}

#[rstest]
fn test_computed_chains_bind_transitively() {
	let record = Record::builder()
		.field("base", 1)
		.computed("double", |record, context| {
			let resolver = context.clone();
			let this = record.clone();
			context.listen_to("base", move |_event, _args| {
				resolver.resolve(this.get("base").as_int().unwrap_or(0) * 2);
			});
			context.resolve(record.get("base").as_int().unwrap_or(0) * 2);
		})
		.computed("quadruple", |record, context| {
			let resolver = context.clone();
			context.listen_to("double", move |_event, args| {
				resolver.resolve(args.first().and_then(Value::as_int).unwrap_or(0) * 2);
			});
			context.resolve(record.get("double").as_int().unwrap_or(0) * 2);
		})
		.build()
		.unwrap();
	let log = ChangeLog::attach(&record, "quadruple");

	// The dependency subscription counts as a listener, so one external
	// listener at the top binds the whole chain.
	record.set("base", 5);
	assert_eq!(record.get("quadruple"), Value::from(20));
	assert_eq!(record.get("double"), Value::from(10));
	assert_eq!(log.pairs(), vec![(Value::from(20), Value::from(4))]);

	assert!(record.off("quadruple", log.listener()));
	assert!(!record.is_bound());
}

#[rstest]
fn test_cross_record_dependencies_bind_the_other_record() {
	let author = person();
	let held = author.clone();
	let post = Record::builder()
		.computed("byline", move |_record, context| {
			context.resolve(format!("by {}", held.get("full_name")));
			let resolver = context.clone();
			context.listen_to(Source::external(&held, "full_name"), move |_event, args| {
				resolver.resolve(format!("by {}", args[0]));
			});
		})
		.build()
		.unwrap();

	assert_eq!(post.get("byline"), Value::from("by Justin Meyer"));
	assert!(!author.is_bound());

	let log = ChangeLog::attach(&post, "byline");
	assert!(author.is_bound());

	author.set("first", "Ramiya");
	assert_eq!(post.get("byline"), Value::from("by Ramiya Meyer"));
	assert_eq!(
		log.pairs(),
		vec![(Value::from("by Ramiya Meyer"), Value::from("by Justin Meyer"))]
	);

	assert!(post.off("byline", log.listener()));
	assert!(!author.is_bound());
}

#[rstest]
fn test_property_that_never_resolves_reads_null() {
	let record = Record::builder()
		.computed("pending", |_record, _context| {})
		.build()
		.unwrap();

	assert!(record.get("pending").is_null());
	record.on("pending", |_event, _args| {});
	assert!(record.get("pending").is_null());
}

#[rstest]
fn test_resolving_the_same_value_is_silent() {
	let record = Record::builder()
		.field("n", 2)
		.computed("parity", |record, context| {
			let update = {
				let this = record.clone();
				let resolver = context.clone();
				move || resolver.resolve(this.get("n").as_int().unwrap_or(0).rem_euclid(2))
			};
			update();
			context.listen_to("n", move |_event, _args| update());
		})
		.build()
		.unwrap();
	let log = ChangeLog::attach(&record, "parity");

	// The source moves but the derived value does not.
	record.set("n", 4);
	assert!(log.is_empty());

	record.set("n", 5);
	assert_eq!(log.pairs(), vec![(Value::from(1), Value::from(0))]);
}
