//! Resolves a [`Program`] into thunks.
//!
//! Every definition first gets a vacant handle so bodies can refer to any
//! definition, including themselves. Handles are filled once everything has
//! been compiled.

use std::sync::Arc;

use ahash::AHashMap;
use tisp_core::{HalfSignature, Key, OptionalArgument, Signature, Thunk, Value};

use crate::error::LoadError;
use crate::expression::{
    compile_function, Application, Expression, Keyword, Positional, Switch,
};
use crate::program::{Definition, HalfSignatureNode, Node, Program, SignatureNode};

#[derive(Debug, Clone)]
pub struct Output {
    pub thunk: Thunk,
    /// `thunk` is a list whose elements are each an output.
    pub expanded: bool,
}

#[derive(Debug)]
pub struct Module {
    definitions: AHashMap<String, Thunk>,
    outputs: Vec<Output>,
}

impl Module {
    pub fn definition(&self, name: &str) -> Option<&Thunk> {
        self.definitions.get(name)
    }

    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    pub fn into_outputs(self) -> Vec<Output> {
        self.outputs
    }
}

pub fn load(program: &Program) -> Result<Module, LoadError> {
    let mut handles = AHashMap::with_capacity(program.definitions.len());
    for d in &program.definitions {
        if handles.insert(d.name().to_string(), Thunk::vacant()).is_some() {
            return Err(LoadError::DuplicateDefinition(d.name().to_string()));
        }
    }
    check_aliases(&program.definitions, &handles)?;

    let resolver = Resolver { handles: &handles };
    let mut compiled = Vec::with_capacity(program.definitions.len());
    for d in &program.definitions {
        let t = match d {
            Definition::Variable { name, expr } => {
                resolver.expression(expr, &Scope::definition(name, 0))?.interpret(&[])
            }
            Definition::Function { name, signature, lets, body } => {
                let signature = resolver.signature(signature, name)?;
                let mut scope = Scope::definition(name, signature.arity());
                let mut bindings = Vec::with_capacity(lets.len());
                for l in lets {
                    bindings.push(resolver.expression(l, &scope)?);
                    scope.locals += 1;
                }
                let body = resolver.expression(body, &scope)?;
                compile_function(name, signature, bindings, body)
            }
        };
        compiled.push((d.name(), t));
    }

    let outputs = program
        .outputs
        .iter()
        .map(|o| -> Result<Output, LoadError> {
            let thunk = resolver.expression(&o.expr, &Scope::outputs())?.interpret(&[]);
            Ok(Output { thunk, expanded: o.expanded })
        })
        .collect::<Result<Vec<_>, LoadError>>()?;

    for (name, t) in compiled {
        if let Some(handle) = handles.get(name) {
            handle.fill(t);
        }
    }
    log::debug!("loaded {} definitions and {} outputs", handles.len(), outputs.len());
    Ok(Module { definitions: handles, outputs })
}

/// Rejects variables that only name each other in a cycle, which would
/// never reach a computation when forced.
fn check_aliases(
    definitions: &[Definition],
    handles: &AHashMap<String, Thunk>,
) -> Result<(), LoadError> {
    let aliases: AHashMap<&str, &str> = definitions
        .iter()
        .filter_map(|d| match d {
            Definition::Variable { name, expr: Node::Name { name: target } }
                if handles.contains_key(target) =>
            {
                Some((name.as_str(), target.as_str()))
            }
            _ => None,
        })
        .collect();

    for &start in aliases.keys() {
        let mut current = start;
        for _ in 0..aliases.len() {
            match aliases.get(current) {
                Some(&next) => current = next,
                None => break,
            }
        }
        if aliases.contains_key(current) {
            return Err(LoadError::CircularDefinition(current.to_string()));
        }
    }
    Ok(())
}

struct Scope<'a> {
    /// Enclosing definition, `None` for outputs.
    definition: Option<&'a str>,
    locals: usize,
}

impl<'a> Scope<'a> {
    fn definition(name: &'a str, locals: usize) -> Self {
        Self { definition: Some(name), locals }
    }

    fn outputs() -> Self {
        Self { definition: None, locals: 0 }
    }

    fn context(&self) -> String {
        self.definition.unwrap_or("outputs").to_string()
    }
}

struct Resolver<'a> {
    handles: &'a AHashMap<String, Thunk>,
}

impl Resolver<'_> {
    fn name(&self, name: &str, scope: &Scope) -> Result<Thunk, LoadError> {
        if let Some(handle) = self.handles.get(name) {
            return Ok(handle.clone());
        }
        tisp_builtins::lookup(name)
            .map(Thunk::normal)
            .ok_or_else(|| LoadError::UnknownName { name: name.to_string(), context: scope.context() })
    }

    fn expression(&self, node: &Node, scope: &Scope) -> Result<Expression, LoadError> {
        Ok(match node {
            Node::Bool { value } => Expression::Constant(Thunk::normal(Value::Bool(*value))),
            Node::Number { value } => Expression::Constant(Thunk::normal(Value::Number(*value))),
            Node::String { value } => Expression::Constant(Thunk::normal(value.as_str().into())),
            Node::Local { index } => {
                if *index >= scope.locals {
                    return Err(LoadError::LocalOutOfRange {
                        index: *index,
                        locals: scope.locals,
                        context: scope.context(),
                    });
                }
                Expression::Local(*index)
            }
            Node::Name { name } => Expression::Constant(self.name(name, scope)?),
            Node::App { function, positionals, keywords, expanded_dicts, location } => {
                let mut location = location.clone();
                if let (Some(l), Some(name)) = (location.as_mut(), scope.definition) {
                    if l.name.is_empty() {
                        l.name = name.to_string();
                    }
                }
                Expression::App(Arc::new(Application {
                    function: self.expression(function, scope)?,
                    positionals: positionals
                        .iter()
                        .map(|p| -> Result<Positional, LoadError> {
                            Ok(Positional { value: self.expression(&p.value, scope)?, expanded: p.expanded })
                        })
                        .collect::<Result<_, LoadError>>()?,
                    keywords: keywords
                        .iter()
                        .map(|k| -> Result<Keyword, LoadError> {
                            Ok(Keyword { name: k.name.clone(), value: self.expression(&k.value, scope)? })
                        })
                        .collect::<Result<_, LoadError>>()?,
                    expanded_dicts: expanded_dicts
                        .iter()
                        .map(|d| self.expression(d, scope))
                        .collect::<Result<_, _>>()?,
                    location,
                }))
            }
            Node::Switch { value, cases, default } => {
                if cases.is_empty() && default.is_none() {
                    return Err(LoadError::EmptySwitch(scope.context()));
                }
                let cases = cases
                    .iter()
                    .map(|c| -> Result<_, LoadError> {
                        Ok((self.pattern(&c.pattern, scope)?, self.expression(&c.value, scope)?))
                    })
                    .collect::<Result<Vec<_>, LoadError>>()?;
                let default = default.as_deref().map(|d| self.expression(d, scope)).transpose()?;
                Expression::Switch(Arc::new(Switch::new(self.expression(value, scope)?, cases, default)))
            }
        })
    }

    fn pattern(&self, node: &Node, scope: &Scope) -> Result<Key, LoadError> {
        let v = match node {
            Node::Bool { value } => Value::Bool(*value),
            Node::Number { value } => Value::Number(*value),
            Node::String { value } => value.as_str().into(),
            Node::Name { name } if !self.handles.contains_key(name) => tisp_builtins::lookup(name)
                .ok_or_else(|| LoadError::UnknownName { name: name.clone(), context: scope.context() })?,
            _ => return Err(LoadError::InvalidPattern(scope.context())),
        };
        Key::from_value(&v).map_err(|_| LoadError::InvalidPattern(scope.context()))
    }

    fn signature(&self, node: &SignatureNode, name: &str) -> Result<Signature, LoadError> {
        let scope = Scope::definition(name, 0);
        Ok(Signature::new(self.half(&node.positional, &scope)?, self.half(&node.keyword, &scope)?))
    }

    fn half(&self, node: &HalfSignatureNode, scope: &Scope) -> Result<HalfSignature, LoadError> {
        let optionals = node
            .optionals
            .iter()
            .map(|o| -> Result<OptionalArgument, LoadError> {
                let default = self.expression(&o.default, scope)?.interpret(&[]);
                Ok(OptionalArgument::new(o.name.clone(), default))
            })
            .collect::<Result<Vec<_>, LoadError>>()?;
        Ok(HalfSignature::new(node.requireds.clone(), optionals, node.rest.clone()))
    }
}
