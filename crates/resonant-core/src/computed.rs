//! Computed properties.
//!
//! A computed property owns a definition function and runs it in one of
//! two modes. While nothing listens to the property it has no state of its
//! own: every read runs the definition against a throwaway context and the
//! subscriptions made during the run are torn down immediately. The first
//! listener moves the property into bound mode, where the definition runs
//! once against a persistent context whose subscriptions stay live and
//! push new values into a cache. When the last listener leaves, the
//! context is torn down and the property falls back to unbound mode.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::event::{EventName, EventTarget, Phase};
use crate::record::Record;
use crate::resolver::Resolver;
use crate::value::Value;

/// A definition function: reads the owning record and reports values
/// through the resolver context.
pub(crate) type Definition = Rc<dyn Fn(&Record, &Resolver)>;

/// Event name on the private assignment channel target.
pub(crate) const LAST_SET: EventName = EventName::custom("lastset");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BindingState {
	Unbound,
	Bound,
}

pub(crate) struct ComputedProperty {
	name: EventName,
	definition: Definition,
	state: Cell<BindingState>,
	/// Cached value while bound; reset on every bind.
	current: RefCell<Value>,
	/// True while the bind-time definition run is on the stack. The run's
	/// resolves establish a baseline and must not raise change events.
	initial_run: Cell<bool>,
	/// The persistent context while bound.
	context: RefCell<Option<Resolver>>,
	/// Latest explicitly assigned value.
	last_set: RefCell<Value>,
	/// Private target the assignment channel delivers through. Only
	/// resolver contexts subscribe to it; it never carries notify
	/// listeners.
	last_set_target: EventTarget,
}

impl ComputedProperty {
	pub(crate) fn new(name: EventName, definition: Definition, seed: Value) -> Self {
		Self {
			name,
			definition,
			state: Cell::new(BindingState::Unbound),
			current: RefCell::new(Value::Null),
			initial_run: Cell::new(false),
			context: RefCell::new(None),
			last_set: RefCell::new(seed),
			last_set_target: EventTarget::new(),
		}
	}

	pub(crate) fn name(&self) -> &EventName {
		&self.name
	}

	pub(crate) fn state(&self) -> BindingState {
		self.state.get()
	}

	pub(crate) fn current(&self) -> Value {
		self.current.borrow().clone()
	}

	/// Stores a newly resolved value, returning the previous one.
	pub(crate) fn replace_current(&self, value: Value) -> Value {
		std::mem::replace(&mut *self.current.borrow_mut(), value)
	}

	pub(crate) fn in_initial_run(&self) -> bool {
		self.initial_run.get()
	}

	pub(crate) fn last_set_value(&self) -> Value {
		self.last_set.borrow().clone()
	}

	pub(crate) fn last_set_target(&self) -> &EventTarget {
		&self.last_set_target
	}

	/// Moves the property into bound mode: runs the definition once
	/// against a persistent context. No-op when already bound.
	pub(crate) fn bind(self: &Rc<Self>, record: &Record) {
		if self.state.get() == BindingState::Bound {
			return;
		}
		self.state.set(BindingState::Bound);
		tracing::debug!(property = %self.name, "binding computed property");

		*self.current.borrow_mut() = Value::Null;
		let context = Resolver::live(record, self);
		*self.context.borrow_mut() = Some(context.clone());
		self.initial_run.set(true);
		(self.definition)(record, &context);
		self.initial_run.set(false);
	}

	/// Tears down the persistent context and falls back to unbound mode.
	pub(crate) fn unbind(&self) {
		if self.state.get() == BindingState::Unbound {
			return;
		}
		// Flip state first: releasing subscriptions below can re-enter
		// through the owning record's listener bookkeeping.
		self.state.set(BindingState::Unbound);
		let context = self.context.borrow_mut().take();
		if let Some(context) = context {
			context.teardown();
		}
		tracing::debug!(property = %self.name, "computed property unbound");
	}

	/// Runs the definition against a throwaway context and returns the
	/// value it resolved. Subscriptions made during the run are released
	/// before this returns.
	pub(crate) fn read_unbound(self: &Rc<Self>, record: &Record) -> Value {
		let context = Resolver::throwaway(record, self);
		(self.definition)(record, &context);
		let value = context.resolved_value();
		context.teardown();
		tracing::trace!(property = %self.name, "unbound read resolved");
		value
	}

	/// Records an explicit assignment and pushes it down the assignment
	/// channel. The assignment itself raises no property change event;
	/// only a definition listening to the channel can turn it into one.
	pub(crate) fn assign(&self, raw: Value) {
		*self.last_set.borrow_mut() = raw.clone();
		tracing::trace!(property = %self.name, "property assigned through the last-set channel");
		self.last_set_target.deliver(Phase::Derive, &LAST_SET, &[raw]);
	}
}

/// Dropping a bound property releases whatever its context subscribed to,
/// so listeners registered on other objects do not outlive the record.
impl Drop for ComputedProperty {
	fn drop(&mut self) {
		let context = self.context.borrow_mut().take();
		if let Some(context) = context {
			context.teardown();
		}
	}
}
