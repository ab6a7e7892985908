//! # Resonant
//!
//! Observable records for Rust: loosely typed property bags that raise
//! change events, computed properties that resolve their own values
//! through explicit dependency subscriptions, and batch transactions that
//! coalesce bursts of writes into single events.
//!
//! ## The model
//!
//! A [`Record`] holds plain fields and computed properties. A computed
//! property is defined by a function that receives the record and a
//! [`Resolver`] context; the function subscribes to whatever the property
//! depends on ([`Source`]) and calls [`Resolver::resolve`] whenever it has
//! a value. The same definition serves two modes:
//!
//! - **Unbound.** Nothing listens to the property. Each read runs the
//!   definition from scratch and throws its subscriptions away. There is
//!   no cache and no stale state.
//! - **Bound.** Somebody listens. The definition runs once against a
//!   persistent context; from then on its subscriptions keep the cached
//!   value current, and each new resolved value raises a change event.
//!
//! The switch between modes is driven purely by listener bookkeeping:
//! the first listener binds, the last one to leave unbinds.
//!
//! ## Batching
//!
//! A [`Batch`] holds back external notification while state settles.
//! Inside a batch, dependency subscriptions still run synchronously, so
//! derived values never lag; external listeners instead get one coalesced
//! event per property when the batch closes, pairing the latest new value
//! with the pre-batch old value. A property that ends the batch where it
//! started raises nothing.
//!
//! ## Quick example
//!
//! ```
//! use resonant::prelude::*;
//!
//! let person = Record::builder()
//! 	.field("first", "Justin")
//! 	.field("last", "Meyer")
//! 	.computed("full_name", |record, context| {
//! 		let update = {
//! 			let this = record.clone();
//! 			let resolver = context.clone();
//! 			move || {
//! 				resolver.resolve(format!("{} {}", this.get("first"), this.get("last")));
//! 			}
//! 		};
//! 		update();
//! 		let refresh = update.clone();
//! 		context.listen_to("first", move |_event, _args| refresh());
//! 		context.listen_to("last", move |_event, _args| update());
//! 	})
//! 	.build()
//! 	.unwrap();
//!
//! assert_eq!(person.get("full_name"), Value::from("Justin Meyer"));
//!
//! person.on("full_name", |_event, args| {
//! 	println!("full_name is now {}", args[0]);
//! });
//! Batch::run(|| {
//! 	person.set("first", "Ramiya");
//! 	person.set("last", "Shah");
//! });
//! assert_eq!(person.get("full_name"), Value::from("Ramiya Shah"));
//! ```

// Re-export the engine surface
pub use resonant_core::{
	Batch, DefineError, Emitter, EqualityFn, Event, EventName, LastSet, ListenerId,
	ObservableList, Record, RecordBuilder, Resolver, Source, Value, batch_depth, start_batch,
	stop_batch,
};

/// Re-export of the types most call sites need.
pub mod prelude {
	pub use resonant_core::prelude::*;
}
