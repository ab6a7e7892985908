//! Observable records.
//!
//! A [`Record`] is a bag of named properties that raises a change event,
//! named after the property, whenever a property's value moves. Plain
//! properties hold values directly. Computed properties own a definition
//! function and derive their value from other state; their binding
//! lifecycle is driven entirely by listener bookkeeping here, so user code
//! never has to bind or unbind anything by hand.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::computed::{BindingState, ComputedProperty, Definition};
use crate::error::DefineError;
use crate::event::{Callback, Event, EventName, EventTarget, ListenerId, Phase};
use crate::resolver::Resolver;
use crate::value::Value;

/// Change-detection policy: returns true when two values should be
/// considered the same, suppressing the change event.
pub type EqualityFn = fn(&Value, &Value) -> bool;

/// A record of observable properties.
///
/// Handles are reference counted; clones share the same record. Reading an
/// undefined property yields [`Value::Null`], and writing one defines it
/// on the fly.
///
/// # Examples
///
/// ```
/// use resonant_core::{Record, Value};
///
/// let person = Record::builder()
/// 	.field("first", "Justin")
/// 	.build()
/// 	.unwrap();
///
/// let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
/// let log = seen.clone();
/// person.on("first", move |_event, args| log.borrow_mut().push(args.to_vec()));
///
/// person.set("first", "Ramiya");
/// assert_eq!(
/// 	*seen.borrow(),
/// 	vec![vec![Value::from("Ramiya"), Value::from("Justin")]]
/// );
/// assert!(person.get("middle").is_null());
/// ```
#[derive(Clone)]
pub struct Record {
	inner: Rc<RecordInner>,
}

pub(crate) struct RecordInner {
	target: EventTarget,
	slots: RefCell<HashMap<EventName, Slot>>,
	equality: EqualityFn,
}

impl RecordInner {
	pub(crate) fn target(&self) -> &EventTarget {
		&self.target
	}
}

enum Slot {
	Plain(Value),
	Computed(Rc<ComputedProperty>),
}

impl Record {
	/// Starts a record definition.
	pub fn builder() -> RecordBuilder {
		RecordBuilder::new()
	}

	/// An empty record with no defined properties. Every write is an
	/// expando definition.
	pub fn new() -> Self {
		Self {
			inner: Rc::new(RecordInner {
				target: EventTarget::new(),
				slots: RefCell::new(HashMap::new()),
				equality: Value::strict_eq,
			}),
		}
	}

	/// Reads a property.
	///
	/// Plain properties return their value. A bound computed property
	/// returns its cached value; an unbound one runs its definition for
	/// this read and tears the run's subscriptions down again before
	/// returning. Undefined properties read as [`Value::Null`].
	pub fn get(&self, name: &str) -> Value {
		enum Read {
			Missing,
			Plain(Value),
			Computed(Rc<ComputedProperty>),
		}
		let read = {
			let slots = self.inner.slots.borrow();
			match slots.get(name) {
				None => Read::Missing,
				Some(Slot::Plain(value)) => Read::Plain(value.clone()),
				Some(Slot::Computed(computed)) => Read::Computed(Rc::clone(computed)),
			}
		};
		match read {
			Read::Missing => Value::Null,
			Read::Plain(value) => value,
			Read::Computed(computed) => match computed.state() {
				BindingState::Bound => computed.current(),
				BindingState::Unbound => computed.read_unbound(self),
			},
		}
	}

	/// Writes a property.
	///
	/// Writing a plain property raises a change event with `[new, old]`
	/// arguments unless the record's equality policy says the value did
	/// not move. Writing an undefined name defines a plain property and
	/// raises a change with `Null` as the old value. Writing a computed
	/// property does not touch its value directly: the raw value is
	/// recorded on the property's assignment channel, and only a
	/// definition listening to [`Source::LastSet`](crate::Source::LastSet)
	/// can turn it into a change.
	pub fn set(&self, name: impl Into<EventName>, value: impl Into<Value>) {
		let name = name.into();
		let value = value.into();

		enum Write {
			Changed(Value),
			Unchanged,
			Assigned(Rc<ComputedProperty>),
			Defined,
		}
		let write = {
			let mut slots = self.inner.slots.borrow_mut();
			match slots.get_mut(name.as_str()) {
				Some(Slot::Plain(stored)) => {
					let old = std::mem::replace(stored, value.clone());
					if (self.inner.equality)(&value, &old) {
						Write::Unchanged
					} else {
						Write::Changed(old)
					}
				}
				Some(Slot::Computed(computed)) => Write::Assigned(Rc::clone(computed)),
				None => {
					slots.insert(name.clone(), Slot::Plain(value.clone()));
					Write::Defined
				}
			}
		};
		match write {
			Write::Changed(old) => self.inner.target.dispatch_change(&name, value, old),
			Write::Unchanged => {}
			Write::Assigned(computed) => computed.assign(value),
			Write::Defined => {
				tracing::trace!(property = %name, "expando property defined");
				self.inner.target.dispatch_change(&name, value, Value::Null);
			}
		}
	}

	/// Registers an external listener for a property change or custom
	/// event. The first listener on a computed property moves it into
	/// bound mode.
	pub fn on<F>(&self, name: impl Into<EventName>, handler: F) -> ListenerId
	where
		F: Fn(&Event, &[Value]) + 'static,
	{
		self.attach_listener(name.into(), Phase::Notify, Rc::new(handler))
	}

	/// Removes a listener registered with [`on`](Self::on). When the last
	/// listener of a computed property leaves, the property unbinds.
	pub fn off(&self, name: &str, id: ListenerId) -> bool {
		self.release_listener(name, id)
	}

	/// Raises a custom event on this record with an arbitrary payload.
	pub fn dispatch(&self, name: impl Into<EventName>, payload: impl IntoIterator<Item = impl Into<Value>>) {
		let name = name.into();
		let payload: Vec<Value> = payload.into_iter().map(Into::into).collect();
		tracing::trace!(event = %name, "dispatching custom event");
		self.inner.target.dispatch_event(&name, payload);
	}

	/// Whether anything is listening to this record, on any event.
	pub fn is_bound(&self) -> bool {
		self.inner.target.is_bound()
	}

	pub(crate) fn attach_listener(&self, name: EventName, phase: Phase, callback: Callback) -> ListenerId {
		let id = self.inner.target.add(name.clone(), phase, callback);
		let computed = {
			let slots = self.inner.slots.borrow();
			match slots.get(name.as_str()) {
				Some(Slot::Computed(computed)) => Some(Rc::clone(computed)),
				_ => None,
			}
		};
		if let Some(computed) = computed {
			// 0 to 1 listener transition; bind is a no-op when already bound.
			computed.bind(self);
		}
		id
	}

	pub(crate) fn release_listener(&self, name: &str, id: ListenerId) -> bool {
		if !self.inner.target.remove(name, id) {
			return false;
		}
		let computed = {
			let slots = self.inner.slots.borrow();
			match slots.get(name) {
				Some(Slot::Computed(computed)) => Some(Rc::clone(computed)),
				_ => None,
			}
		};
		if let Some(computed) = computed {
			if self.inner.target.listener_count(name) == 0 {
				computed.unbind();
			}
		}
		true
	}

	pub(crate) fn target(&self) -> &EventTarget {
		&self.inner.target
	}

	pub(crate) fn equality(&self) -> EqualityFn {
		self.inner.equality
	}

	pub(crate) fn downgrade(&self) -> Weak<RecordInner> {
		Rc::downgrade(&self.inner)
	}

	pub(crate) fn from_inner(inner: Rc<RecordInner>) -> Self {
		Self { inner }
	}
}

impl Default for Record {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for Record {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut names: Vec<String> = self
			.inner
			.slots
			.borrow()
			.keys()
			.map(|name| name.as_str().to_string())
			.collect();
		names.sort();
		f.debug_struct("Record")
			.field("properties", &names)
			.field("bound", &self.is_bound())
			.finish()
	}
}

/// Builder for record definitions.
///
/// Property names are validated when [`build`](Self::build) runs: empty
/// names and names defined twice are rejected. A plain field and a
/// computed property may share a name; the field's initial value then
/// seeds the computed property's assignment channel instead of defining a
/// second property.
pub struct RecordBuilder {
	fields: Vec<(EventName, Value)>,
	computed: Vec<(EventName, Definition)>,
	equality: EqualityFn,
}

impl RecordBuilder {
	fn new() -> Self {
		Self {
			fields: Vec::new(),
			computed: Vec::new(),
			equality: Value::strict_eq,
		}
	}

	/// Defines a plain property with an initial value.
	pub fn field(mut self, name: impl Into<EventName>, initial: impl Into<Value>) -> Self {
		self.fields.push((name.into(), initial.into()));
		self
	}

	/// Defines a computed property.
	///
	/// The definition runs fresh on every read while the property is
	/// unbound, and once, against a persistent context, when the first
	/// listener arrives.
	///
	/// # Examples
	///
	/// ```
	/// use resonant_core::{Record, Value};
	///
	/// let person = Record::builder()
	/// 	.field("first", "Justin")
	/// 	.field("last", "Meyer")
	/// 	.computed("full_name", |record, context| {
	/// 		let update = {
	/// 			let this = record.clone();
	/// 			let resolver = context.clone();
	/// 			move || resolver.resolve(format!("{} {}", this.get("first"), this.get("last")))
	/// 		};
	/// 		update();
	/// 		let refresh = update.clone();
	/// 		context.listen_to("first", move |_event, _args| refresh());
	/// 		context.listen_to("last", move |_event, _args| update());
	/// 	})
	/// 	.build()
	/// 	.unwrap();
	///
	/// assert_eq!(person.get("full_name"), Value::from("Justin Meyer"));
	/// person.set("first", "Ramiya");
	/// assert_eq!(person.get("full_name"), Value::from("Ramiya Meyer"));
	/// ```
	pub fn computed<F>(mut self, name: impl Into<EventName>, definition: F) -> Self
	where
		F: Fn(&Record, &Resolver) + 'static,
	{
		self.computed.push((name.into(), Rc::new(definition)));
		self
	}

	/// Replaces the strict-equality change detection with a custom
	/// policy. The policy applies to plain writes and resolved values
	/// alike.
	pub fn equality(mut self, equality: EqualityFn) -> Self {
		self.equality = equality;
		self
	}

	/// Validates the definition and builds the record.
	pub fn build(self) -> Result<Record, DefineError> {
		let RecordBuilder {
			fields,
			computed,
			equality,
		} = self;

		let mut seeds: HashMap<EventName, Value> = HashMap::new();
		for (name, initial) in fields {
			if name.as_str().is_empty() {
				return Err(DefineError::EmptyName);
			}
			if seeds.insert(name.clone(), initial).is_some() {
				return Err(DefineError::DuplicateProperty(name.as_str().to_string()));
			}
		}

		let mut slots: HashMap<EventName, Slot> = HashMap::new();
		for (name, definition) in computed {
			if name.as_str().is_empty() {
				return Err(DefineError::EmptyName);
			}
			let seed = seeds.remove(name.as_str()).unwrap_or_default();
			let property = Rc::new(ComputedProperty::new(name.clone(), definition, seed));
			if slots.insert(name.clone(), Slot::Computed(property)).is_some() {
				return Err(DefineError::DuplicateProperty(name.as_str().to_string()));
			}
		}
		for (name, initial) in seeds {
			slots.insert(name, Slot::Plain(initial));
		}

		Ok(Record {
			inner: Rc::new(RecordInner {
				target: EventTarget::new(),
				slots: RefCell::new(slots),
				equality,
			}),
		})
	}
}
