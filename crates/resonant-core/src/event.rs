//! Event names, listener registration and two-phase delivery.
//!
//! Every observable object owns an [`EventTarget`]: a table of listeners
//! keyed by event name. Listeners are registered in one of two phases.
//! [`Phase::Derive`] listeners keep derived state current and always run
//! synchronously, even inside a batch. [`Phase::Notify`] listeners are the
//! outward-facing ones registered through `on()`; during a batch their
//! delivery is deferred to the batch queue so that several writes collapse
//! into one notification.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::queue;
use crate::value::Value;

/// Internal storage for event names, supporting both static and owned strings.
/// Zero-cost for string literals, reference-counted for dynamic names.
#[derive(Debug, Clone)]
enum EventNameInner {
	Static(&'static str),
	Owned(Rc<str>),
}

/// The name of a property change event or a custom event.
///
/// Property change events carry the property's name; custom events can use
/// any name a record chooses to dispatch.
///
/// # Examples
///
/// ```
/// use resonant_core::EventName;
///
/// let length = EventName::custom("length");
/// let dynamic = EventName::from_string(format!("city_{}", "set"));
/// assert_eq!(length.as_str(), "length");
/// assert_ne!(length, dynamic);
/// ```
#[derive(Debug, Clone)]
pub struct EventName(EventNameInner);

impl EventName {
	/// Creates an event name from a string literal without allocating.
	pub const fn custom(name: &'static str) -> Self {
		Self(EventNameInner::Static(name))
	}

	/// Creates an event name from an owned string.
	pub fn from_string(name: impl Into<Rc<str>>) -> Self {
		Self(EventNameInner::Owned(name.into()))
	}

	pub fn as_str(&self) -> &str {
		match &self.0 {
			EventNameInner::Static(s) => s,
			EventNameInner::Owned(s) => s,
		}
	}
}

impl PartialEq for EventName {
	fn eq(&self, other: &Self) -> bool {
		self.as_str() == other.as_str()
	}
}

impl Eq for EventName {}

impl std::hash::Hash for EventName {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.as_str().hash(state);
	}
}

/// Lets listener tables keyed by `EventName` be queried with a plain `&str`.
impl std::borrow::Borrow<str> for EventName {
	fn borrow(&self) -> &str {
		self.as_str()
	}
}

impl fmt::Display for EventName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.as_str())
	}
}

impl From<&'static str> for EventName {
	fn from(name: &'static str) -> Self {
		Self::custom(name)
	}
}

impl From<String> for EventName {
	fn from(name: String) -> Self {
		Self::from_string(name)
	}
}

impl AsRef<str> for EventName {
	fn as_ref(&self) -> &str {
		self.as_str()
	}
}

/// The event handed to listeners when they fire.
///
/// For a property change the arguments are `[new, old]`; for a custom
/// event they are whatever payload the dispatcher supplied.
#[derive(Debug, Clone)]
pub struct Event {
	name: EventName,
}

impl Event {
	pub(crate) fn new(name: EventName) -> Self {
		Self { name }
	}

	pub fn name(&self) -> &EventName {
		&self.name
	}
}

/// Handle returned by listener registration, used to unregister.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

thread_local! {
	static NEXT_LISTENER_ID: Cell<u64> = Cell::new(1);
}

fn next_listener_id() -> ListenerId {
	NEXT_LISTENER_ID.with(|next| {
		let id = next.get();
		next.set(id + 1);
		ListenerId(id)
	})
}

/// Delivery phase of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Phase {
	/// Dependency bookkeeping; runs synchronously on every dispatch.
	Derive,
	/// External observation; deferred and coalesced while a batch is open.
	Notify,
}

pub(crate) type Callback = Rc<dyn Fn(&Event, &[Value])>;

struct HandlerEntry {
	id: ListenerId,
	phase: Phase,
	callback: Callback,
}

/// Identity of an event target, derived from its allocation.
///
/// Stable for as long as any handle to the target is alive, which the
/// batch queue guarantees by holding a handle in every pending slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TargetId(usize);

/// Listener table shared by clones of an observable handle.
#[derive(Clone)]
pub(crate) struct EventTarget {
	inner: Rc<TargetInner>,
}

struct TargetInner {
	handlers: RefCell<HashMap<EventName, Vec<HandlerEntry>>>,
}

impl EventTarget {
	pub(crate) fn new() -> Self {
		Self {
			inner: Rc::new(TargetInner {
				handlers: RefCell::new(HashMap::new()),
			}),
		}
	}

	pub(crate) fn id(&self) -> TargetId {
		TargetId(Rc::as_ptr(&self.inner) as *const () as usize)
	}

	pub(crate) fn add(&self, name: EventName, phase: Phase, callback: Callback) -> ListenerId {
		let id = next_listener_id();
		self.inner
			.handlers
			.borrow_mut()
			.entry(name)
			.or_default()
			.push(HandlerEntry {
				id,
				phase,
				callback,
			});
		id
	}

	/// Removes one listener. Returns `false` when the id was not registered
	/// under that event name.
	pub(crate) fn remove(&self, name: &str, id: ListenerId) -> bool {
		let mut handlers = self.inner.handlers.borrow_mut();
		let Some(entries) = handlers.get_mut(name) else {
			return false;
		};
		let before = entries.len();
		entries.retain(|entry| entry.id != id);
		let removed = entries.len() != before;
		if entries.is_empty() {
			handlers.remove(name);
		}
		removed
	}

	fn contains(&self, name: &str, id: ListenerId) -> bool {
		self.inner
			.handlers
			.borrow()
			.get(name)
			.is_some_and(|entries| entries.iter().any(|entry| entry.id == id))
	}

	/// Number of listeners registered for one event name, across phases.
	pub(crate) fn listener_count(&self, name: &str) -> usize {
		self.inner
			.handlers
			.borrow()
			.get(name)
			.map_or(0, Vec::len)
	}

	/// Whether anything at all is listening to this target.
	pub(crate) fn is_bound(&self) -> bool {
		self.inner
			.handlers
			.borrow()
			.values()
			.any(|entries| !entries.is_empty())
	}

	/// Invokes the listeners of one phase, in registration order.
	///
	/// The handler list is snapshotted before invocation so listeners may
	/// register or unregister freely while the event runs. Each snapshotted
	/// listener is re-checked against the live table right before its call:
	/// a listener removed by an earlier handler of the same event must not
	/// fire.
	pub(crate) fn deliver(&self, phase: Phase, name: &EventName, args: &[Value]) {
		let snapshot: Vec<(ListenerId, Callback)> = {
			let handlers = self.inner.handlers.borrow();
			match handlers.get(name.as_str()) {
				Some(entries) => entries
					.iter()
					.filter(|entry| entry.phase == phase)
					.map(|entry| (entry.id, Rc::clone(&entry.callback)))
					.collect(),
				None => return,
			}
		};
		if snapshot.is_empty() {
			return;
		}

		let event = Event::new(name.clone());
		for (id, callback) in snapshot {
			if self.contains(name.as_str(), id) {
				callback(&event, args);
			}
		}
	}

	/// Dispatches a property change carrying `[new, old]` arguments.
	///
	/// Derive listeners run immediately. Notify listeners run immediately
	/// too unless a batch is open, in which case the change is recorded in
	/// the batch queue and delivered, coalesced, when the batch closes.
	pub(crate) fn dispatch_change(&self, name: &EventName, new: Value, old: Value) {
		self.deliver(Phase::Derive, name, &[new.clone(), old.clone()]);
		if queue::batch_active() {
			queue::enqueue_change(self, name, new, old);
		} else {
			self.deliver(Phase::Notify, name, &[new, old]);
		}
	}

	/// Dispatches a custom event with an arbitrary payload.
	///
	/// Unlike changes, queued payloads are never coalesced; each dispatch
	/// is delivered exactly once.
	pub(crate) fn dispatch_event(&self, name: &EventName, payload: Vec<Value>) {
		self.deliver(Phase::Derive, name, &payload);
		if queue::batch_active() {
			queue::enqueue_event(self, name, payload);
		} else {
			self.deliver(Phase::Notify, name, &payload);
		}
	}
}

impl fmt::Debug for EventTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EventTarget")
			.field("id", &self.id())
			.field("bound", &self.is_bound())
			.finish()
	}
}
