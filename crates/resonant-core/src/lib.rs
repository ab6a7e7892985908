//! # Resonant Core
//!
//! A reactive record model: observable records whose computed properties
//! resolve their own values through explicit dependency subscriptions, and
//! a batching layer that coalesces bursts of writes into single change
//! events.
//!
//! The moving parts:
//!
//! - [`Record`]: a bag of named properties raising `[new, old]` change
//!   events, built through [`RecordBuilder`].
//! - [`Resolver`]: the context a computed property's definition function
//!   uses to subscribe to dependencies ([`Source`]) and report values.
//!   While nobody listens to the property, every read runs the definition
//!   from scratch and discards the subscriptions; the first listener runs
//!   it once against a persistent context that keeps resolving as
//!   dependencies fire.
//! - [`Batch`]: a thread-local transaction. Writes inside a batch still
//!   update derived state synchronously, but external listeners see one
//!   coalesced event per property, pairing the latest new value with the
//!   old value from before the batch.
//! - [`ObservableList`]: a shared list raising `length` events, usable as
//!   a property value and as an external dependency.
//!
//! # Examples
//!
//! ```
//! use resonant_core::{Batch, Record, Value};
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
//! let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
//! let log = seen.clone();
//! person.on("full_name", move |_event, args| log.borrow_mut().push(args.to_vec()));
//!
//! Batch::run(|| {
//! 	person.set("first", "Ramiya");
//! 	person.set("last", "Shah");
//! });
//!
//! // Two writes, one event.
//! assert_eq!(
//! 	*seen.borrow(),
//! 	vec![vec![Value::from("Ramiya Shah"), Value::from("Justin Meyer")]]
//! );
//! ```

mod computed;
mod error;
mod event;
mod list;
mod queue;
mod record;
mod resolver;
mod source;
mod value;

pub use error::DefineError;
pub use event::{Event, EventName, ListenerId};
pub use list::ObservableList;
pub use queue::{Batch, batch_depth, start_batch, stop_batch};
pub use record::{EqualityFn, Record, RecordBuilder};
pub use resolver::{LastSet, Resolver};
pub use source::{Emitter, Source};
pub use value::Value;

/// Re-export of the types most call sites need.
pub mod prelude {
	pub use super::{
		Batch, DefineError, Event, EventName, ListenerId, ObservableList, Record, RecordBuilder,
		Resolver, Source, Value,
	};
}
