//! tisp-builtins: the primitive functions every program can name.
//!
//! The registry is built once on first use and is read-only afterwards.

use ahash::AHashMap;
use std::sync::LazyLock;

use tisp_core::{Error, Eval, Function, Signature, Thunk, Value};

mod arithmetic;
mod collections;
mod comparison;
mod control;
mod io;
mod pool;

pub(crate) type Table = AHashMap<&'static str, Value>;

static BUILTINS: LazyLock<Table> = LazyLock::new(|| {
    let mut m = Table::new();
    m.insert("true", Value::Bool(true));
    m.insert("false", Value::Bool(false));
    arithmetic::register(&mut m);
    comparison::register(&mut m);
    collections::register(&mut m);
    control::register(&mut m);
    io::register(&mut m);
    log::debug!("registered {} builtins", m.len());
    m
});

/// The builtin bound to `name`, if any.
pub fn lookup(name: &str) -> Option<Value> {
    BUILTINS.get(name).cloned()
}

/// Every builtin name, sorted.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = BUILTINS.keys().copied().collect();
    names.sort_unstable();
    names
}

pub(crate) fn define<F>(m: &mut Table, name: &'static str, signature: Signature, body: F)
where
    F: Fn(Vec<Thunk>) -> Eval + Send + Sync + 'static,
{
    m.insert(name, Value::Function(Function::new(name, signature, body)));
}

/// Forces every element of a list of numbers.
pub(crate) fn numbers(list: &Thunk) -> Result<Vec<f64>, Error> {
    let mut ns = Vec::new();
    for t in list.force_list()?.iter() {
        ns.push(t?.force_number()?);
    }
    Ok(ns)
}
