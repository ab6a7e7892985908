//! Batch transactions.
//!
//! A batch coalesces every notify-phase delivery that happens while it is
//! open. For each (target, event) pair the queue keeps one pending slot
//! recording the old value from the first write and the new value from the
//! latest write; closing the outermost batch delivers at most one change
//! event per slot, in the order the slots were first touched. A pair whose
//! latest value settled back to where it started delivers nothing.
//!
//! Derive-phase listeners are not routed through the queue at all, so
//! derived state stays current while a batch is open.
//!
//! Batch state is thread local. A batch opened on one thread has no effect
//! on dispatches made from another.

use std::cell::RefCell;
use std::collections::HashMap;
use std::marker::PhantomData;

use crate::event::{EventName, EventTarget, Phase, TargetId};
use crate::value::Value;

type SlotKey = (TargetId, EventName);

struct PendingSlot {
	target: EventTarget,
	name: EventName,
	/// `(first old, latest new)` for coalesced change events.
	change: Option<(Value, Value)>,
	/// Custom event payloads queue discretely, one delivery each.
	events: Vec<Vec<Value>>,
}

struct BatchQueue {
	depth: usize,
	flushing: bool,
	cursor: usize,
	order: Vec<SlotKey>,
	slots: HashMap<SlotKey, PendingSlot>,
}

impl BatchQueue {
	fn new() -> Self {
		Self {
			depth: 0,
			flushing: false,
			cursor: 0,
			order: Vec::new(),
			slots: HashMap::new(),
		}
	}
}

thread_local! {
	static QUEUE: RefCell<BatchQueue> = RefCell::new(BatchQueue::new());
}

/// Opens a batch on the current thread. Batches nest; only closing the
/// outermost one flushes the queue.
///
/// Prefer [`Batch`], which cannot leak an open batch on early return.
pub fn start_batch() {
	QUEUE.with(|queue| {
		let mut queue = queue.borrow_mut();
		queue.depth += 1;
		if queue.depth == 1 {
			tracing::debug!("batch opened");
		}
	});
}

/// Closes one nesting level. Closing the outermost level flushes every
/// pending slot. Calling without a matching [`start_batch`] logs a warning
/// and does nothing.
pub fn stop_batch() {
	let should_flush = QUEUE.with(|queue| {
		let mut queue = queue.borrow_mut();
		if queue.depth == 0 {
			tracing::warn!("stop_batch called without a matching start_batch");
			return false;
		}
		queue.depth -= 1;
		if queue.depth == 0 {
			tracing::debug!(pending = queue.order.len(), "batch closed");
		}
		queue.depth == 0 && !queue.flushing
	});
	if should_flush {
		flush();
	}
}

/// Current batch nesting depth on this thread.
pub fn batch_depth() -> usize {
	QUEUE.with(|queue| queue.borrow().depth)
}

/// True while dispatches should be routed into the queue: inside an open
/// batch, or while the queue itself is mid-flush so that changes raised by
/// notify listeners are drained in the same pass.
pub(crate) fn batch_active() -> bool {
	QUEUE.with(|queue| {
		let queue = queue.borrow();
		queue.depth > 0 || queue.flushing
	})
}

pub(crate) fn enqueue_change(target: &EventTarget, name: &EventName, new: Value, old: Value) {
	QUEUE.with(|queue| {
		let mut queue = queue.borrow_mut();
		let queue = &mut *queue;
		let key = (target.id(), name.clone());
		if let Some(slot) = queue.slots.get_mut(&key) {
			match &mut slot.change {
				// Keep the very first old value, overwrite the new one.
				Some((_first_old, latest_new)) => *latest_new = new,
				None => slot.change = Some((old, new)),
			}
			return;
		}
		queue.order.push(key.clone());
		queue.slots.insert(
			key,
			PendingSlot {
				target: target.clone(),
				name: name.clone(),
				change: Some((old, new)),
				events: Vec::new(),
			},
		);
	});
}

pub(crate) fn enqueue_event(target: &EventTarget, name: &EventName, payload: Vec<Value>) {
	QUEUE.with(|queue| {
		let mut queue = queue.borrow_mut();
		let queue = &mut *queue;
		let key = (target.id(), name.clone());
		if let Some(slot) = queue.slots.get_mut(&key) {
			slot.events.push(payload);
			return;
		}
		queue.order.push(key.clone());
		queue.slots.insert(
			key,
			PendingSlot {
				target: target.clone(),
				name: name.clone(),
				change: None,
				events: vec![payload],
			},
		);
	});
}

/// Drains the queue in first-touched order.
///
/// Slots appended while the flush runs, for example by a notify listener
/// that writes another property, are drained in the same pass. The queue
/// never borrows its own state across a listener call.
fn flush() {
	QUEUE.with(|queue| queue.borrow_mut().flushing = true);
	loop {
		let step = QUEUE.with(|queue| {
			let mut queue = queue.borrow_mut();
			if queue.cursor >= queue.order.len() {
				queue.order.clear();
				queue.slots.clear();
				queue.cursor = 0;
				queue.flushing = false;
				return None;
			}
			let key = queue.order[queue.cursor].clone();
			queue.cursor += 1;
			Some(queue.slots.remove(&key))
		});
		match step {
			None => break,
			Some(None) => continue,
			Some(Some(slot)) => deliver_slot(slot),
		}
	}
}

fn deliver_slot(slot: PendingSlot) {
	let PendingSlot {
		target,
		name,
		change,
		events,
	} = slot;
	if let Some((first_old, latest_new)) = change {
		if Value::strict_eq(&latest_new, &first_old) {
			tracing::trace!(event = %name, "coalesced change settled on its starting value, dropped");
		} else {
			tracing::trace!(event = %name, "delivering coalesced change");
			target.deliver(Phase::Notify, &name, &[latest_new, first_old]);
		}
	}
	for payload in events {
		target.deliver(Phase::Notify, &name, &payload);
	}
}

/// Guard that holds a batch open for as long as it lives.
///
/// Dropping the guard closes the batch on every exit path, including early
/// returns and unwinding, so listener delivery cannot be deferred forever
/// by a forgotten [`stop_batch`].
///
/// # Examples
///
/// ```
/// use resonant_core::{Batch, Record, Value};
///
/// let person = Record::builder()
/// 	.field("first", "Justin")
/// 	.field("last", "Meyer")
/// 	.build()
/// 	.unwrap();
///
/// let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
/// let log = seen.clone();
/// person.on("first", move |_event, args| log.borrow_mut().push(args.to_vec()));
///
/// Batch::run(|| {
/// 	person.set("first", "Ramiya");
/// 	person.set("first", "Ramiya S");
/// });
///
/// // Two writes, one event: latest new value, first old value.
/// assert_eq!(
/// 	*seen.borrow(),
/// 	vec![vec![Value::from("Ramiya S"), Value::from("Justin")]]
/// );
/// ```
pub struct Batch {
	// Batches are per thread; the guard must not cross threads either.
	_thread_bound: PhantomData<*const ()>,
}

impl Batch {
	/// Opens a batch that stays open until the guard is dropped.
	pub fn new() -> Self {
		start_batch();
		Self {
			_thread_bound: PhantomData,
		}
	}

	/// Runs `body` inside a batch.
	pub fn run<R>(body: impl FnOnce() -> R) -> R {
		let _batch = Batch::new();
		body()
	}
}

impl Drop for Batch {
	fn drop(&mut self) {
		stop_batch();
	}
}
