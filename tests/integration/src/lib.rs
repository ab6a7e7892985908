//! Integration test utilities for Resonant
//!
//! This crate provides shared record fixtures and observation helpers
//! for integration testing across the Resonant crates.

use std::cell::RefCell;
use std::rc::Rc;

use resonant::{EventName, ListenerId, Record, Value};


/// Captures every change event delivered to one property.
///
/// Attaching the log registers an external listener, so attaching to a
/// computed property also moves it into bound mode.
pub struct ChangeLog {
	pairs: Rc<RefCell<Vec<(Value, Value)>>>,
	listener: ListenerId,
}

impl ChangeLog {
	/// Starts logging `[new, old]` pairs for a property of `record`.
	pub fn attach(record: &Record, property: impl Into<EventName>) -> Self {
		let pairs = Rc::new(RefCell::new(Vec::new()));
		let sink = Rc::clone(&pairs);
		let listener = record.on(property, move |_event, args| {
			sink.borrow_mut().push((
				args.first().cloned().unwrap_or_default(),
				args.get(1).cloned().unwrap_or_default(),
			));
		});
		Self { pairs, listener }
	}

	/// The id of the listener backing this log, for `record.off` calls.
	pub fn listener(&self) -> ListenerId {
		self.listener
	}

	/// Every `(new, old)` pair seen so far.
	pub fn pairs(&self) -> Vec<(Value, Value)> {
		self.pairs.borrow().clone()
	}

	/// The new values seen so far, in delivery order.
	pub fn new_values(&self) -> Vec<Value> {
		self.pairs.borrow().iter().map(|(new, _old)| new.clone()).collect()
	}

	pub fn len(&self) -> usize {
		self.pairs.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.pairs.borrow().is_empty()
	}
}
