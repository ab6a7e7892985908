//! Dynamic property values.
//!
//! Record properties are loosely typed: a property can hold a scalar, a
//! string or an [`ObservableList`] handle, and can change kind over its
//! lifetime. [`Value`] is the closed set of shapes a property can take,
//! together with the strict equality used to decide whether a write is a
//! real change.

use std::fmt;

use crate::list::ObservableList;

/// A single property value.
///
/// `Value` is cheap to clone: scalars are copied, strings are cloned and
/// list values clone the shared handle, so two clones of a list value
/// refer to the same underlying list.
///
/// # Examples
///
/// ```
/// use resonant_core::Value;
///
/// let name = Value::from("Justin");
/// assert_eq!(name.as_str(), Some("Justin"));
/// assert!(Value::Null.is_null());
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
	/// The absent value. Reading an undefined property yields `Null`.
	#[default]
	Null,
	Bool(bool),
	Int(i64),
	Float(f64),
	Str(String),
	/// A shared handle to an observable list.
	List(ObservableList),
}

impl Value {
	/// Strict equality in the host-language sense.
	///
	/// Numbers compare across `Int` and `Float` by numeric value, strings
	/// by content, and lists by identity: two list values are equal only
	/// when they are handles to the same underlying list. `Null` equals
	/// only `Null`.
	///
	/// The function signature matches [`EqualityFn`](crate::EqualityFn),
	/// so `Value::strict_eq` is also the default change-detection policy
	/// for records.
	///
	/// # Examples
	///
	/// ```
	/// use resonant_core::{ObservableList, Value};
	///
	/// assert!(Value::strict_eq(&Value::Int(2), &Value::Float(2.0)));
	/// assert!(!Value::strict_eq(&Value::Null, &Value::Int(0)));
	///
	/// let tasks = ObservableList::new();
	/// let same = Value::List(tasks.clone());
	/// let other = Value::List(ObservableList::new());
	/// assert!(Value::strict_eq(&Value::List(tasks), &same));
	/// assert!(!Value::strict_eq(&same, &other));
	/// ```
	pub fn strict_eq(left: &Value, right: &Value) -> bool {
		match (left, right) {
			(Value::Null, Value::Null) => true,
			(Value::Bool(a), Value::Bool(b)) => a == b,
			(Value::Int(a), Value::Int(b)) => a == b,
			(Value::Float(a), Value::Float(b)) => a == b,
			(Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
				*a as f64 == *b
			}
			(Value::Str(a), Value::Str(b)) => a == b,
			(Value::List(a), Value::List(b)) => ObservableList::same_list(a, b),
			_ => false,
		}
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(i) => Some(*i),
			_ => None,
		}
	}

	/// Returns the numeric value of an `Int` or `Float`.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Int(i) => Some(*i as f64),
			Value::Float(f) => Some(*f),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(s) => Some(s),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&ObservableList> {
		match self {
			Value::List(l) => Some(l),
			_ => None,
		}
	}
}

/// Equality by [`Value::strict_eq`]. Note that `Float(f64::NAN)` is not
/// equal to itself, so `Value` is intentionally not `Eq`.
impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		Value::strict_eq(self, other)
	}
}

impl fmt::Display for Value {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Value::Null => write!(f, "null"),
			Value::Bool(b) => write!(f, "{b}"),
			Value::Int(i) => write!(f, "{i}"),
			Value::Float(x) => write!(f, "{x}"),
			Value::Str(s) => write!(f, "{s}"),
			Value::List(l) => {
				write!(f, "[")?;
				for (index, item) in l.items().into_iter().enumerate() {
					if index > 0 {
						write!(f, ", ")?;
					}
					write!(f, "{item}")?;
				}
				write!(f, "]")
			}
		}
	}
}

impl From<bool> for Value {
	fn from(value: bool) -> Self {
		Value::Bool(value)
	}
}

impl From<i64> for Value {
	fn from(value: i64) -> Self {
		Value::Int(value)
	}
}

impl From<i32> for Value {
	fn from(value: i32) -> Self {
		Value::Int(value.into())
	}
}

impl From<usize> for Value {
	fn from(value: usize) -> Self {
		Value::Int(value as i64)
	}
}

impl From<f64> for Value {
	fn from(value: f64) -> Self {
		Value::Float(value)
	}
}

impl From<&str> for Value {
	fn from(value: &str) -> Self {
		Value::Str(value.to_string())
	}
}

impl From<String> for Value {
	fn from(value: String) -> Self {
		Value::Str(value)
	}
}

impl From<ObservableList> for Value {
	fn from(value: ObservableList) -> Self {
		Value::List(value)
	}
}

impl From<&ObservableList> for Value {
	fn from(value: &ObservableList) -> Self {
		Value::List(value.clone())
	}
}

/// `None` maps to [`Value::Null`].
impl<T: Into<Value>> From<Option<T>> for Value {
	fn from(value: Option<T>) -> Self {
		match value {
			Some(inner) => inner.into(),
			None => Value::Null,
		}
	}
}
