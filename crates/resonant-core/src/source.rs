//! Dependency sources for resolver contexts.
//!
//! A [`Source`] names one thing a computed property depends on. Sources
//! are resolved to a concrete (object, event) pair at subscription time;
//! the variants exist so call sites say what they mean, not because the
//! variants subscribe differently. `Property("x")` and `Event("x")` on the
//! owning record resolve to the same pair.

use crate::event::{Callback, EventName, ListenerId, Phase, TargetId};
use crate::list::ObservableList;
use crate::record::Record;

/// One dependency of a computed property.
///
/// # Examples
///
/// ```
/// use resonant_core::{ObservableList, Source};
///
/// let tasks = ObservableList::new();
/// let on_own_property = Source::property("first");
/// let on_own_event = Source::event("city_set");
/// let on_other_object = Source::external(&tasks, "length");
/// let on_assignment = Source::LastSet;
/// # let _ = (on_own_property, on_own_event, on_other_object, on_assignment);
/// ```
#[derive(Debug, Clone)]
pub enum Source {
	/// A property change on the record that owns the computed property.
	Property(EventName),
	/// A custom event dispatched on the owning record.
	Event(EventName),
	/// An event on some other observable object.
	External(Emitter, EventName),
	/// The owning computed property's explicit-assignment channel. The
	/// handler receives `[assigned]` each time the property is written.
	LastSet,
}

impl Source {
	pub fn property(name: impl Into<EventName>) -> Self {
		Source::Property(name.into())
	}

	pub fn event(name: impl Into<EventName>) -> Self {
		Source::Event(name.into())
	}

	pub fn external(object: impl Into<Emitter>, name: impl Into<EventName>) -> Self {
		Source::External(object.into(), name.into())
	}
}

/// A bare name is shorthand for a property on the owning record.
impl From<&'static str> for Source {
	fn from(name: &'static str) -> Self {
		Source::Property(name.into())
	}
}

impl From<String> for Source {
	fn from(name: String) -> Self {
		Source::Property(name.into())
	}
}

impl From<EventName> for Source {
	fn from(name: EventName) -> Self {
		Source::Property(name)
	}
}

/// An observable object that can appear in [`Source::External`].
#[derive(Debug, Clone)]
pub enum Emitter {
	Record(Record),
	List(ObservableList),
}

impl Emitter {
	/// Whether anything is currently listening to the object.
	pub fn is_bound(&self) -> bool {
		match self {
			Emitter::Record(record) => record.is_bound(),
			Emitter::List(list) => list.is_bound(),
		}
	}

	pub(crate) fn target_id(&self) -> TargetId {
		match self {
			Emitter::Record(record) => record.target().id(),
			Emitter::List(list) => list.target().id(),
		}
	}

	/// Registers a listener, running bind bookkeeping when the object is a
	/// record so that listening to another record's computed property
	/// moves that property into bound mode too.
	pub(crate) fn attach(&self, name: EventName, phase: Phase, callback: Callback) -> ListenerId {
		match self {
			Emitter::Record(record) => record.attach_listener(name, phase, callback),
			Emitter::List(list) => list.target().add(name, phase, callback),
		}
	}
}

impl From<&Record> for Emitter {
	fn from(record: &Record) -> Self {
		Emitter::Record(record.clone())
	}
}

impl From<Record> for Emitter {
	fn from(record: Record) -> Self {
		Emitter::Record(record)
	}
}

impl From<&ObservableList> for Emitter {
	fn from(list: &ObservableList) -> Self {
		Emitter::List(list.clone())
	}
}

impl From<ObservableList> for Emitter {
	fn from(list: ObservableList) -> Self {
		Emitter::List(list)
	}
}
