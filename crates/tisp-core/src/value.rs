//! Runtime values and the capabilities they implement.
//!
//! The variant set is closed. Primitive operations ask a value for a
//! capability (`as_ordered`, `as_callable`, ...) instead of matching on every
//! variant, and report a typed error when the capability is missing.

use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::arguments::Arguments;
use crate::dictionary::Dictionary;
use crate::error::Error;
use crate::function::{Eval, Function, Native};
use crate::list::List;
use crate::thunk::Thunk;

#[derive(Clone)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(Arc<str>),
    List(List),
    Dictionary(Dictionary),
    Function(Function),
    Native(Native),
    Error(Error),
    /// A deferred external action; forced only through `Thunk::force_effect`.
    Effect(Thunk),
}

/// Total order within one variant.
pub trait Ordered {
    fn compare(&self, other: &Value) -> Result<Ordering, Error>;
}

pub trait Callable {
    fn call(&self, args: Arguments) -> Eval;
}

pub trait Stringable {
    fn string(&self) -> Result<String, Error>;
}

pub trait Dumpable {
    fn dump(&self) -> Result<String, Error>;
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::List(_) => "list",
            Value::Dictionary(_) => "dict",
            Value::Function(_) | Value::Native(_) => "function",
            Value::Error(_) => "error",
            Value::Effect(_) => "effect",
        }
    }

    pub fn as_ordered(&self) -> Option<&dyn Ordered> {
        match self {
            Value::Bool(b) => Some(b),
            Value::Number(n) => Some(n),
            Value::String(s) => Some(s),
            Value::List(l) => Some(l),
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&dyn Callable> {
        match self {
            Value::Function(f) => Some(f),
            Value::Native(f) => Some(f),
            Value::List(l) => Some(l),
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_stringable(&self) -> Option<&dyn Stringable> {
        match self {
            Value::Bool(b) => Some(b),
            Value::Number(n) => Some(n),
            Value::String(s) => Some(s),
            Value::List(l) => Some(l),
            Value::Dictionary(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dumpable(&self) -> Option<&dyn Dumpable> {
        match self {
            Value::String(s) => Some(s),
            Value::Function(f) => Some(f),
            Value::Native(f) => Some(f),
            Value::Effect(e) => Some(e),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s.into())
    }
}

impl From<List> for Value {
    fn from(l: List) -> Self {
        Value::List(l)
    }
}

impl From<Dictionary> for Value {
    fn from(d: Dictionary) -> Self {
        Value::Dictionary(d)
    }
}

impl From<Error> for Value {
    fn from(e: Error) -> Self {
        Value::Error(e)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Number(n) => write!(f, "Number({n})"),
            Value::String(s) => write!(f, "String({s:?})"),
            Value::List(_) => f.write_str("List(..)"),
            Value::Dictionary(d) => write!(f, "Dictionary(size={})", d.size()),
            Value::Function(func) => write!(f, "Function({})", func.name()),
            Value::Native(func) => write!(f, "Native({})", func.name()),
            Value::Error(e) => write!(f, "Error({e})"),
            Value::Effect(_) => f.write_str("Effect(..)"),
        }
    }
}

/// Orders two values of the same ordered variant.
pub fn compare(a: &Value, b: &Value) -> Result<Ordering, Error> {
    match (a, b) {
        (Value::Error(e), _) | (_, Value::Error(e)) => Err(e.clone()),
        _ => a.as_ordered().ok_or_else(|| Error::not_comparable(a))?.compare(b),
    }
}

/// Structural equality. Distinct ordered variants are simply unequal.
pub fn equal(a: &Value, b: &Value) -> Result<bool, Error> {
    match (a, b) {
        (Value::Error(e), _) | (_, Value::Error(e)) => Err(e.clone()),
        (Value::List(x), Value::List(y)) => x.equal(y),
        (Value::Dictionary(x), Value::Dictionary(y)) => x.equal(y),
        _ => {
            if a.as_ordered().is_none() {
                return Err(Error::not_comparable(a));
            }
            if b.as_ordered().is_none() {
                return Err(Error::not_comparable(b));
            }
            if std::mem::discriminant(a) != std::mem::discriminant(b) {
                return Ok(false);
            }
            Ok(compare(a, b)? == Ordering::Equal)
        }
    }
}

/// Display conversion used by `toString` and output primitives.
pub fn to_string(v: &Value) -> Result<String, Error> {
    match v {
        Value::Error(e) => Err(e.clone()),
        _ => v.as_stringable().ok_or_else(|| Error::not_string(v))?.string(),
    }
}

/// Debug representation; strings come out quoted.
pub fn dump(v: &Value) -> Result<String, Error> {
    match v {
        Value::Error(e) => Err(e.clone()),
        _ => match v.as_dumpable() {
            Some(d) => d.dump(),
            None => to_string(v),
        },
    }
}

pub(crate) fn format_number(n: f64) -> String {
    format!("{n}")
}

impl Ordered for bool {
    fn compare(&self, other: &Value) -> Result<Ordering, Error> {
        match other {
            Value::Bool(b) => Ok(self.cmp(b)),
            _ => Err(Error::incomparable(&Value::Bool(*self), other)),
        }
    }
}

impl Ordered for f64 {
    fn compare(&self, other: &Value) -> Result<Ordering, Error> {
        match other {
            Value::Number(n) => Ok(OrderedFloat(*self).cmp(&OrderedFloat(*n))),
            _ => Err(Error::incomparable(&Value::Number(*self), other)),
        }
    }
}

impl Ordered for Arc<str> {
    fn compare(&self, other: &Value) -> Result<Ordering, Error> {
        match other {
            Value::String(s) => Ok(self.as_ref().cmp(s.as_ref())),
            _ => Err(Error::incomparable(&Value::String(self.clone()), other)),
        }
    }
}

impl Stringable for bool {
    fn string(&self) -> Result<String, Error> {
        Ok(self.to_string())
    }
}

impl Stringable for f64 {
    fn string(&self) -> Result<String, Error> {
        Ok(format_number(*self))
    }
}

impl Stringable for Arc<str> {
    fn string(&self) -> Result<String, Error> {
        Ok(self.to_string())
    }
}

impl Dumpable for Arc<str> {
    fn dump(&self) -> Result<String, Error> {
        Ok(format!("{:?}", self.as_ref()))
    }
}

impl Dumpable for Thunk {
    fn dump(&self) -> Result<String, Error> {
        Ok("<effect>".into())
    }
}
