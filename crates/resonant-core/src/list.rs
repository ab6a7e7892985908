//! Observable lists.
//!
//! An [`ObservableList`] is a shared, growable sequence of [`Value`]s that
//! raises a `length` change event whenever its length moves. Handles are
//! reference counted; cloning a handle aliases the same list, and list
//! values compare by identity, mirroring how records treat every other
//! reference type.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::event::{Event, EventName, EventTarget, ListenerId, Phase};
use crate::value::Value;

/// A shared observable sequence.
///
/// # Examples
///
/// ```
/// use resonant_core::{ObservableList, Value};
///
/// let tasks = ObservableList::from_values(["dishes", "laundry"]);
/// assert_eq!(tasks.len(), 2);
///
/// let seen = std::rc::Rc::new(std::cell::Cell::new(0));
/// let count = seen.clone();
/// tasks.on("length", move |_event, args| {
/// 	count.set(args[0].as_int().unwrap_or(0));
/// });
///
/// tasks.push("sweep");
/// assert_eq!(seen.get(), 3);
/// ```
#[derive(Clone)]
pub struct ObservableList {
	inner: Rc<ListInner>,
}

pub(crate) struct ListInner {
	target: EventTarget,
	items: RefCell<Vec<Value>>,
}

impl ListInner {
	pub(crate) fn target(&self) -> &EventTarget {
		&self.target
	}
}

impl ObservableList {
	/// Name of the change event raised when the list's length moves.
	/// Its arguments are `[new_length, old_length]`.
	pub const LENGTH: EventName = EventName::custom("length");

	pub fn new() -> Self {
		Self {
			inner: Rc::new(ListInner {
				target: EventTarget::new(),
				items: RefCell::new(Vec::new()),
			}),
		}
	}

	pub fn from_values(values: impl IntoIterator<Item = impl Into<Value>>) -> Self {
		let list = Self::new();
		list.inner
			.items
			.borrow_mut()
			.extend(values.into_iter().map(Into::into));
		list
	}

	pub fn len(&self) -> usize {
		self.inner.items.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.inner.items.borrow().is_empty()
	}

	pub fn get(&self, index: usize) -> Option<Value> {
		self.inner.items.borrow().get(index).cloned()
	}

	/// Snapshot of the current items.
	pub fn items(&self) -> Vec<Value> {
		self.inner.items.borrow().clone()
	}

	/// Appends a value and raises a `length` change event.
	pub fn push(&self, value: impl Into<Value>) {
		let new_len = {
			let mut items = self.inner.items.borrow_mut();
			items.push(value.into());
			items.len()
		};
		self.inner
			.target
			.dispatch_change(&Self::LENGTH, Value::from(new_len), Value::from(new_len - 1));
	}

	/// Removes and returns the last value, raising a `length` change event
	/// when the list was not empty.
	pub fn pop(&self) -> Option<Value> {
		let (popped, new_len) = {
			let mut items = self.inner.items.borrow_mut();
			let popped = items.pop()?;
			(popped, items.len())
		};
		self.inner
			.target
			.dispatch_change(&Self::LENGTH, Value::from(new_len), Value::from(new_len + 1));
		Some(popped)
	}

	/// Registers an external listener. For `length` events the handler
	/// receives `[new_length, old_length]`.
	pub fn on<F>(&self, name: impl Into<EventName>, handler: F) -> ListenerId
	where
		F: Fn(&Event, &[Value]) + 'static,
	{
		self.inner
			.target
			.add(name.into(), Phase::Notify, Rc::new(handler))
	}

	/// Removes a listener registered with [`on`](Self::on).
	pub fn off(&self, name: &str, id: ListenerId) -> bool {
		self.inner.target.remove(name, id)
	}

	/// Whether anything is currently listening to this list.
	pub fn is_bound(&self) -> bool {
		self.inner.target.is_bound()
	}

	pub(crate) fn target(&self) -> &EventTarget {
		&self.inner.target
	}

	/// Weak handle for subscription bookkeeping that must not keep the
	/// list alive.
	pub(crate) fn downgrade(&self) -> Weak<ListInner> {
		Rc::downgrade(&self.inner)
	}

	/// Identity comparison: two handles to the same underlying list.
	pub(crate) fn same_list(a: &Self, b: &Self) -> bool {
		Rc::ptr_eq(&a.inner, &b.inner)
	}
}

impl Default for ObservableList {
	fn default() -> Self {
		Self::new()
	}
}

/// Handles compare by identity, not by content.
impl PartialEq for ObservableList {
	fn eq(&self, other: &Self) -> bool {
		Self::same_list(self, other)
	}
}

impl fmt::Debug for ObservableList {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.items()).finish()
	}
}

impl<T: Into<Value>> FromIterator<T> for ObservableList {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		Self::from_values(iter)
	}
}
