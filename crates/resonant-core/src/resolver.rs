//! Resolver contexts.
//!
//! The definition function of a computed property never talks to the
//! record's listener tables directly; it goes through a [`Resolver`]. The
//! context carries the subscriptions the definition makes, reports values
//! through [`resolve`](Resolver::resolve), and knows whether it belongs to
//! a bound property (subscriptions persist, resolves raise change events)
//! or to a one-off unbound read (subscriptions are torn down as soon as
//! the read returns and resolves only record the result).
//!
//! Contexts hold their record and computed property weakly. The strong
//! edges all point the other way, from observable objects through their
//! handler tables into the context, so tearing a context down is what
//! breaks the chain.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::computed::{ComputedProperty, LAST_SET};
use crate::event::{Callback, Event, EventName, EventTarget, ListenerId, Phase, TargetId};
use crate::list::ListInner;
use crate::record::{Record, RecordInner};
use crate::source::{Emitter, Source};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextState {
	/// Persistent context of a bound property.
	Live,
	/// Context of a one-off unbound read.
	Throwaway,
	/// Torn down; every operation is a logged no-op.
	Dead,
}

/// The context a definition function resolves through.
///
/// Cloning is cheap and clones share the same context, which is how
/// dependency handlers keep resolving after the definition returns.
///
/// # Examples
///
/// A counter that only advances while somebody is listening:
///
/// ```
/// use resonant_core::{Record, Value};
///
/// let person = Record::builder()
/// 	.field("name", Value::Null)
/// 	.computed("name_changes", |_record, context| {
/// 		context.resolve(0);
/// 		let count = std::cell::Cell::new(0_i64);
/// 		let resolver = context.clone();
/// 		context.listen_to("name", move |_event, _args| {
/// 			count.set(count.get() + 1);
/// 			resolver.resolve(count.get());
/// 		});
/// 	})
/// 	.build()
/// 	.unwrap();
///
/// // Unbound: every read starts from scratch.
/// person.set("name", "Justin");
/// assert_eq!(person.get("name_changes"), Value::from(0));
///
/// person.on("name_changes", |_event, _args| {});
/// person.set("name", "Payal");
/// assert_eq!(person.get("name_changes"), Value::from(1));
/// ```
#[derive(Clone)]
pub struct Resolver {
	inner: Rc<ResolverInner>,
}

struct ResolverInner {
	record: Weak<RecordInner>,
	computed: Weak<ComputedProperty>,
	state: Cell<ContextState>,
	/// Latest value passed to `resolve`.
	resolved: RefCell<Value>,
	subscriptions: RefCell<Vec<Subscription>>,
}

struct Subscription {
	object: SubscribedObject,
	name: EventName,
	id: ListenerId,
}

impl Subscription {
	fn release(self) {
		self.object.release(&self.name, self.id);
	}
}

/// A subscription target resolved to a strong handle, used only for the
/// duration of one `listen_to` or `stop_listening` call.
enum ResolvedTarget {
	Object(Emitter),
	LastSet(EventTarget),
}

impl ResolvedTarget {
	fn target_id(&self) -> TargetId {
		match self {
			ResolvedTarget::Object(emitter) => emitter.target_id(),
			ResolvedTarget::LastSet(target) => target.id(),
		}
	}

	fn attach(&self, name: EventName, callback: Callback) -> ListenerId {
		match self {
			ResolvedTarget::Object(emitter) => emitter.attach(name, Phase::Derive, callback),
			ResolvedTarget::LastSet(target) => target.add(name, Phase::Derive, callback),
		}
	}

	fn downgrade(self) -> SubscribedObject {
		match self {
			ResolvedTarget::Object(Emitter::Record(record)) => {
				SubscribedObject::Record(record.downgrade())
			}
			ResolvedTarget::Object(Emitter::List(list)) => {
				SubscribedObject::List(list.downgrade())
			}
			ResolvedTarget::LastSet(target) => SubscribedObject::LastSet(target),
		}
	}
}

/// What a subscription remembers about its object. Records and lists are
/// held weakly so a context never keeps its own record, or any other
/// observable, alive; an object that died took its handler table with it.
enum SubscribedObject {
	Record(Weak<RecordInner>),
	List(Weak<ListInner>),
	LastSet(EventTarget),
}

impl SubscribedObject {
	fn target_id(&self) -> Option<TargetId> {
		match self {
			SubscribedObject::Record(record) => {
				record.upgrade().map(|inner| inner.target().id())
			}
			SubscribedObject::List(list) => list.upgrade().map(|inner| inner.target().id()),
			SubscribedObject::LastSet(target) => Some(target.id()),
		}
	}

	fn release(&self, name: &EventName, id: ListenerId) {
		match self {
			SubscribedObject::Record(record) => {
				// Route through the record so unbind bookkeeping runs when
				// this was the last listener on a computed property.
				if let Some(inner) = record.upgrade() {
					Record::from_inner(inner).release_listener(name.as_str(), id);
				}
			}
			SubscribedObject::List(list) => {
				if let Some(inner) = list.upgrade() {
					inner.target().remove(name.as_str(), id);
				}
			}
			SubscribedObject::LastSet(target) => {
				target.remove(name.as_str(), id);
			}
		}
	}
}

impl Resolver {
	pub(crate) fn live(record: &Record, computed: &Rc<ComputedProperty>) -> Self {
		Self::new(record, computed, ContextState::Live)
	}

	pub(crate) fn throwaway(record: &Record, computed: &Rc<ComputedProperty>) -> Self {
		Self::new(record, computed, ContextState::Throwaway)
	}

	fn new(record: &Record, computed: &Rc<ComputedProperty>, state: ContextState) -> Self {
		Self {
			inner: Rc::new(ResolverInner {
				record: record.downgrade(),
				computed: Rc::downgrade(computed),
				state: Cell::new(state),
				resolved: RefCell::new(Value::Null),
				subscriptions: RefCell::new(Vec::new()),
			}),
		}
	}

	fn record(&self) -> Option<Record> {
		self.inner.record.upgrade().map(Record::from_inner)
	}

	fn computed(&self) -> Option<Rc<ComputedProperty>> {
		self.inner.computed.upgrade()
	}

	/// Reports the computed property's value.
	///
	/// On a bound context this updates the property's cache and, outside
	/// the bind-time baseline run, raises a change event carrying
	/// `[new, old]` whenever the record's equality policy says the value
	/// moved. On a throwaway context it only records the result of the
	/// read. On a torn-down context it logs a warning and does nothing.
	pub fn resolve(&self, value: impl Into<Value>) {
		let value = value.into();
		match self.inner.state.get() {
			ContextState::Dead => {
				tracing::warn!("resolve on a torn-down resolver context, ignoring");
			}
			ContextState::Throwaway => {
				*self.inner.resolved.borrow_mut() = value;
			}
			ContextState::Live => {
				*self.inner.resolved.borrow_mut() = value.clone();
				let (Some(record), Some(computed)) = (self.record(), self.computed()) else {
					tracing::trace!("owning record is gone, dropping resolved value");
					return;
				};
				let old = computed.replace_current(value.clone());
				if computed.in_initial_run() {
					return;
				}
				if !(record.equality())(&value, &old) {
					record.target().dispatch_change(computed.name(), value, old);
				}
			}
		}
	}

	/// Subscribes the context to a dependency.
	///
	/// The handler runs synchronously on every dispatch of the resolved
	/// event, even while a batch is open. For property changes it receives
	/// `[new, old]`, for custom events the dispatched payload, and for
	/// [`Source::LastSet`] the single assigned value.
	pub fn listen_to<F>(&self, source: impl Into<Source>, handler: F)
	where
		F: Fn(&Event, &[Value]) + 'static,
	{
		if self.inner.state.get() == ContextState::Dead {
			tracing::warn!("listen_to on a torn-down resolver context, ignoring");
			return;
		}
		let Some((target, name)) = self.resolve_source(source.into()) else {
			return;
		};
		let callback: Callback = Rc::new(handler);
		let id = target.attach(name.clone(), callback);
		self.inner.subscriptions.borrow_mut().push(Subscription {
			object: target.downgrade(),
			name,
			id,
		});
	}

	/// Drops the subscriptions this context holds on one source.
	///
	/// Matching is by resolved identity, so `Property("x")` and
	/// `Event("x")` name the same subscriptions. Unknown sources are
	/// ignored.
	pub fn stop_listening(&self, source: impl Into<Source>) {
		if self.inner.state.get() == ContextState::Dead {
			tracing::warn!("stop_listening on a torn-down resolver context, ignoring");
			return;
		}
		let Some((target, name)) = self.resolve_source(source.into()) else {
			return;
		};
		let wanted = target.target_id();
		self.release_matching(|subscription| {
			subscription.name == name && subscription.object.target_id() == Some(wanted)
		});
	}

	/// Drops every subscription this context holds on one object,
	/// whatever the event.
	pub fn stop_listening_to(&self, object: impl Into<Emitter>) {
		if self.inner.state.get() == ContextState::Dead {
			tracing::warn!("stop_listening_to on a torn-down resolver context, ignoring");
			return;
		}
		let wanted = object.into().target_id();
		self.release_matching(|subscription| subscription.object.target_id() == Some(wanted));
	}

	/// Read handle for the owning property's explicit-assignment channel.
	pub fn last_set(&self) -> LastSet {
		LastSet {
			computed: self.inner.computed.clone(),
		}
	}

	fn resolve_source(&self, source: Source) -> Option<(ResolvedTarget, EventName)> {
		match source {
			Source::Property(name) | Source::Event(name) => {
				let Some(record) = self.record() else {
					tracing::warn!(event = %name, "owning record is gone, dependency ignored");
					return None;
				};
				Some((ResolvedTarget::Object(Emitter::Record(record)), name))
			}
			Source::External(emitter, name) => Some((ResolvedTarget::Object(emitter), name)),
			Source::LastSet => {
				let Some(computed) = self.computed() else {
					tracing::warn!("owning computed property is gone, dependency ignored");
					return None;
				};
				Some((
					ResolvedTarget::LastSet(computed.last_set_target().clone()),
					LAST_SET,
				))
			}
		}
	}

	fn release_matching(&self, matches: impl Fn(&Subscription) -> bool) {
		// Collect first: releasing can cascade into other records'
		// listener bookkeeping and must not run under our borrow.
		let removed = {
			let mut subscriptions = self.inner.subscriptions.borrow_mut();
			let mut removed = Vec::new();
			let mut index = 0;
			while index < subscriptions.len() {
				if matches(&subscriptions[index]) {
					removed.push(subscriptions.remove(index));
				} else {
					index += 1;
				}
			}
			removed
		};
		for subscription in removed {
			subscription.release();
		}
	}

	/// Tears the context down: marks it dead and releases every
	/// subscription. Idempotent.
	pub(crate) fn teardown(&self) {
		if self.inner.state.get() == ContextState::Dead {
			return;
		}
		self.inner.state.set(ContextState::Dead);
		let subscriptions = std::mem::take(&mut *self.inner.subscriptions.borrow_mut());
		tracing::trace!(count = subscriptions.len(), "tearing down resolver context");
		for subscription in subscriptions {
			subscription.release();
		}
	}

	pub(crate) fn resolved_value(&self) -> Value {
		self.inner.resolved.borrow().clone()
	}
}

impl fmt::Debug for Resolver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Resolver")
			.field("state", &self.inner.state.get())
			.field("subscriptions", &self.inner.subscriptions.borrow().len())
			.finish()
	}
}

/// Read handle for a computed property's latest explicit assignment.
///
/// Obtained through [`Resolver::last_set`]; commonly captured by a
/// definition that wants assignments to win over other dependencies.
#[derive(Debug, Clone)]
pub struct LastSet {
	computed: Weak<ComputedProperty>,
}

impl LastSet {
	/// The latest assigned value. Before any assignment this is the seed
	/// from a same-named plain field in the definition, or `Null`.
	pub fn get(&self) -> Value {
		self.computed
			.upgrade()
			.map(|computed| computed.last_set_value())
			.unwrap_or_default()
	}
}
