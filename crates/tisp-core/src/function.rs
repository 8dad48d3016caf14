//! Callables: user functions with a signature, and natives over raw arguments.

use std::fmt;
use std::sync::Arc;

use crate::arguments::Arguments;
use crate::error::Error;
use crate::signature::Signature;
use crate::thunk::Thunk;
use crate::value::{Callable, Dumpable, Value};

/// The successful result of a call.
pub enum Outcome {
    Value(Value),
    /// An unforced thunk the caller continues with as a tail call.
    Tail(Thunk),
}

pub type Eval<T = Outcome> = Result<T, Error>;

impl From<Value> for Outcome {
    fn from(v: Value) -> Self {
        Outcome::Value(v)
    }
}

impl From<Thunk> for Outcome {
    fn from(t: Thunk) -> Self {
        Outcome::Tail(t)
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Outcome::Tail(_) => f.write_str("Tail(..)"),
        }
    }
}

type Body = dyn Fn(Vec<Thunk>) -> Eval + Send + Sync;

#[derive(Clone)]
pub struct Function(Arc<FunctionInner>);

struct FunctionInner {
    name: String,
    signature: Signature,
    body: Box<Body>,
    effect: bool,
}

impl Function {
    /// A pure function. The body receives the bound parameters in signature order.
    pub fn new<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(Vec<Thunk>) -> Eval + Send + Sync + 'static,
    {
        Self::build(name.into(), signature, Box::new(body), false)
    }

    /// A function whose calls bind eagerly but return an effect wrapping the body.
    pub fn effect<F>(name: impl Into<String>, signature: Signature, body: F) -> Self
    where
        F: Fn(Vec<Thunk>) -> Eval + Send + Sync + 'static,
    {
        Self::build(name.into(), signature, Box::new(body), true)
    }

    fn build(name: String, signature: Signature, body: Box<Body>, effect: bool) -> Self {
        Function(Arc::new(FunctionInner { name, signature, body, effect }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl Callable for Function {
    fn call(&self, args: Arguments) -> Eval {
        let params = self.0.signature.bind(args)?;
        log::trace!("bound {} parameters for {}", params.len(), self.0.name);
        if !self.0.effect {
            return (self.0.body)(params);
        }
        let this = self.clone();
        let action = Thunk::deferred(move || (this.0.body)(params.clone()));
        Ok(Value::Effect(action).into())
    }
}

impl Dumpable for Function {
    fn dump(&self) -> Result<String, Error> {
        Ok(format!("<function {}>", self.0.name))
    }
}

/// A primitive that consumes its arguments without a signature.
#[derive(Clone)]
pub struct Native(Arc<NativeInner>);

struct NativeInner {
    name: String,
    body: Box<dyn Fn(Arguments) -> Eval + Send + Sync>,
}

impl Native {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Arguments) -> Eval + Send + Sync + 'static,
    {
        Native(Arc::new(NativeInner { name: name.into(), body: Box::new(body) }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl Callable for Native {
    fn call(&self, args: Arguments) -> Eval {
        (self.0.body)(args)
    }
}

impl Dumpable for Native {
    fn dump(&self) -> Result<String, Error> {
        Ok(format!("<function {}>", self.0.name))
    }
}
