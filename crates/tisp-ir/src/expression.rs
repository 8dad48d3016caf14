//! Expression trees and their interpretation into thunks.
//!
//! An expression is interpreted once per function call against that call's
//! locals: the bound parameters followed by the let bindings computed so far.
//! Interpretation never forces anything; it only builds the thunk graph.

use std::collections::BTreeMap;
use std::sync::Arc;

use tisp_core::{
    Arguments, Error, ErrorKind, Function, Key, KeywordArgument, Location, PositionalArgument,
    Signature, Thunk, Value,
};

#[derive(Debug, Clone)]
pub enum Expression {
    /// A thunk shared by every interpretation (literals, definitions, builtins).
    Constant(Thunk),
    /// Index into the locals of the enclosing function.
    Local(usize),
    App(Arc<Application>),
    Switch(Arc<Switch>),
}

#[derive(Debug)]
pub struct Positional {
    pub value: Expression,
    pub expanded: bool,
}

#[derive(Debug)]
pub struct Keyword {
    pub name: String,
    pub value: Expression,
}

/// A function application with its call-site arguments.
#[derive(Debug)]
pub struct Application {
    pub function: Expression,
    pub positionals: Vec<Positional>,
    pub keywords: Vec<Keyword>,
    pub expanded_dicts: Vec<Expression>,
    pub location: Option<Location>,
}

/// A multi-way branch on a forced value.
#[derive(Debug)]
pub struct Switch {
    value: Expression,
    cases: BTreeMap<Key, usize>,
    results: Vec<Expression>,
    default: Option<Expression>,
}

impl Switch {
    /// Builds a switch from cases in source order. A pattern that appears
    /// twice selects the later case.
    pub fn new(value: Expression, cases: Vec<(Key, Expression)>, default: Option<Expression>) -> Self {
        let mut table = BTreeMap::new();
        let mut results = Vec::with_capacity(cases.len());
        for (i, (pattern, result)) in cases.into_iter().enumerate() {
            table.insert(pattern, i);
            results.push(result);
        }
        Self { value, cases: table, results, default }
    }

    fn select(&self, v: &Value) -> Result<&Expression, Error> {
        let key = match Key::from_value(v) {
            Ok(key) => Some(key),
            Err(e) if e.kind() == &ErrorKind::NotComparable => None,
            Err(e) => return Err(e),
        };
        key.and_then(|k| self.cases.get(&k))
            .map(|&i| &self.results[i])
            .or(self.default.as_ref())
            .ok_or_else(|| Error::new(ErrorKind::Match, "value didn't match with any pattern"))
    }
}

impl Expression {
    pub fn interpret(&self, locals: &[Thunk]) -> Thunk {
        match self {
            Expression::Constant(t) => t.clone(),
            Expression::Local(i) => locals[*i].clone(),
            Expression::App(app) => {
                let function = app.function.interpret(locals);
                let positionals = app
                    .positionals
                    .iter()
                    .map(|p| PositionalArgument::new(p.value.interpret(locals), p.expanded))
                    .collect();
                let keywords = app
                    .keywords
                    .iter()
                    .map(|k| KeywordArgument::new(k.name.clone(), k.value.interpret(locals)))
                    .collect();
                let dicts = app.expanded_dicts.iter().map(|d| d.interpret(locals)).collect();
                let args = Arguments::new(positionals, keywords, dicts);
                match &app.location {
                    Some(location) => Thunk::app_at(function, args, location.clone()),
                    None => Thunk::app(function, args),
                }
            }
            Expression::Switch(switch) => {
                let switch = switch.clone();
                let matched = switch.value.interpret(locals);
                let locals = locals.to_vec();
                Thunk::deferred(move || {
                    let v = matched.try_force()?;
                    Ok(switch.select(&v)?.interpret(&locals).into())
                })
            }
        }
    }
}

/// Compiles a user function. Each call binds its arguments, then interprets
/// `lets` in order (each one seeing the parameters and the earlier lets) and
/// finally tail-calls into `body`.
pub fn compile_function(
    name: &str,
    signature: Signature,
    lets: Vec<Expression>,
    body: Expression,
) -> Thunk {
    let f = Function::new(name, signature, move |params| {
        let mut locals = params;
        locals.reserve(lets.len());
        for expression in &lets {
            let t = expression.interpret(&locals);
            locals.push(t);
        }
        Ok(body.interpret(&locals).into())
    });
    Thunk::normal(Value::Function(f))
}
