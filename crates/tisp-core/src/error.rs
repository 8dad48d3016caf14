//! Error values threaded through forcing.
//!
//! Language errors are not Rust panics: they are ordinary values that every
//! operation hands back unchanged, growing a chain of call sites on the way.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// A call site recorded on application thunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Enclosing function or definition name.
    #[serde(default)]
    pub name: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(name: impl Into<String>, file: impl Into<String>, line: usize, column: usize) -> Self {
        Self { name: name.into(), file: file.into(), line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)?;
        if !self.name.is_empty() {
            write!(f, " in {}", self.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    TypeError,
    NotCallable,
    NotComparable,
    NotList,
    NotDictionary,
    NotString,
    NotNumber,
    NotBool,
    NotEffect,
    ImpureFunction,
    Argument,
    KeyNotFound,
    Value,
    Match,
    FileSystem,
    Http,
    /// Raised by user code through the `error` primitive.
    Custom(Arc<str>),
}

impl ErrorKind {
    pub fn name(&self) -> &str {
        match self {
            ErrorKind::TypeError => "TypeError",
            ErrorKind::NotCallable => "NotCallableError",
            ErrorKind::NotComparable => "NotComparableError",
            ErrorKind::NotList => "NotListError",
            ErrorKind::NotDictionary => "NotDictionaryError",
            ErrorKind::NotString => "NotStringError",
            ErrorKind::NotNumber => "NotNumberError",
            ErrorKind::NotBool => "NotBoolError",
            ErrorKind::NotEffect => "NotEffectError",
            ErrorKind::ImpureFunction => "ImpureFunctionError",
            ErrorKind::Argument => "ArgumentError",
            ErrorKind::KeyNotFound => "KeyNotFoundError",
            ErrorKind::Value => "ValueError",
            ErrorKind::Match => "MatchError",
            ErrorKind::FileSystem => "FileSystemError",
            ErrorKind::Http => "HTTPError",
            ErrorKind::Custom(name) => name,
        }
    }
}

/// An error value. Cloning is cheap; the location chain is a persistent vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    message: Arc<str>,
    chain: im::Vector<Location>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into().into(), chain: im::Vector::new() }
    }

    pub fn custom(name: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Custom(name.into()), message)
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeError, message)
    }

    pub fn argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Argument, message)
    }

    pub fn value(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Value, message)
    }

    pub fn key_not_found(key: &str) -> Self {
        Self::new(ErrorKind::KeyNotFound, format!("key {key} is not found"))
    }

    pub fn out_of_range() -> Self {
        Self::value("index is out of range")
    }

    pub fn empty_list() -> Self {
        Self::value("list is empty")
    }

    pub fn not_callable(v: &Value) -> Self {
        Self::new(ErrorKind::NotCallable, format!("{} is not callable", v.type_name()))
    }

    pub fn not_comparable(v: &Value) -> Self {
        Self::new(ErrorKind::NotComparable, format!("{} is not comparable", v.type_name()))
    }

    pub fn incomparable(a: &Value, b: &Value) -> Self {
        Self::new(
            ErrorKind::NotComparable,
            format!("cannot compare {} with {}", a.type_name(), b.type_name()),
        )
    }

    pub fn not_list(v: &Value) -> Self {
        Self::new(ErrorKind::NotList, format!("{} is not a list", v.type_name()))
    }

    pub fn not_dictionary(v: &Value) -> Self {
        Self::new(ErrorKind::NotDictionary, format!("{} is not a dictionary", v.type_name()))
    }

    pub fn not_string(v: &Value) -> Self {
        Self::new(ErrorKind::NotString, format!("{} is not a string", v.type_name()))
    }

    pub fn not_number(v: &Value) -> Self {
        Self::new(ErrorKind::NotNumber, format!("{} is not a number", v.type_name()))
    }

    pub fn not_bool(v: &Value) -> Self {
        Self::new(ErrorKind::NotBool, format!("{} is not a bool", v.type_name()))
    }

    pub fn not_effect(v: &Value) -> Self {
        Self::new(ErrorKind::NotEffect, format!("{} is not an effect", v.type_name()))
    }

    pub fn impure_function() -> Self {
        Self::new(ErrorKind::ImpureFunction, "effects cannot be forced as pure values")
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Call sites the error passed through, innermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Location> {
        self.chain.iter()
    }

    /// Returns the same error with `location` appended to its chain.
    pub fn chained(&self, location: &Location) -> Self {
        let mut chain = self.chain.clone();
        chain.push_back(location.clone());
        Self { kind: self.kind.clone(), message: self.message.clone(), chain }
    }

    /// Multi-line report: the message followed by every recorded call site.
    pub fn lines(&self) -> String {
        let mut out = String::new();
        for location in &self.chain {
            out.push_str(&format!("    at {location}\n"));
        }
        out.push_str(&format!("{}: {}\n", self.name(), self.message));
        out
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message)
    }
}

impl std::error::Error for Error {}
