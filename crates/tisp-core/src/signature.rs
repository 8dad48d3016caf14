//! Parameter contracts and the binding algorithm.

use std::sync::LazyLock;

use crate::arguments::Arguments;
use crate::error::Error;
use crate::thunk::Thunk;

#[derive(Debug, Clone)]
pub struct OptionalArgument {
    name: String,
    default: Thunk,
}

impl OptionalArgument {
    pub fn new(name: impl Into<String>, default: Thunk) -> Self {
        Self { name: name.into(), default }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// One half (positional or keyword) of a signature.
#[derive(Debug, Clone, Default)]
pub struct HalfSignature {
    requireds: Vec<String>,
    optionals: Vec<OptionalArgument>,
    rest: Option<String>,
}

impl HalfSignature {
    pub fn new(requireds: Vec<String>, optionals: Vec<OptionalArgument>, rest: Option<String>) -> Self {
        Self { requireds, optionals, rest }
    }

    pub fn of(requireds: &[&str], optionals: Vec<OptionalArgument>, rest: Option<&str>) -> Self {
        Self::new(
            requireds.iter().map(|s| s.to_string()).collect(),
            optionals,
            rest.map(str::to_string),
        )
    }

    pub fn arity(&self) -> usize {
        self.requireds.len() + self.optionals.len() + usize::from(self.rest.is_some())
    }

    /// Parameter names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.requireds
            .iter()
            .map(String::as_str)
            .chain(self.optionals.iter().map(|o| o.name.as_str()))
            .chain(self.rest.as_deref())
    }

    fn bind_positionals(&self, args: &mut Arguments, out: &mut Vec<Thunk>) -> Result<(), Error> {
        // Once a parameter is satisfied by keyword, later ones only look at keywords.
        let mut rest_are_keywords = false;

        for name in &self.requireds {
            let t = match next(args, name, &mut rest_are_keywords)? {
                Some(t) => t,
                None => return Err(Error::argument("could not bind required positional argument")),
            };
            out.push(t);
        }

        for opt in &self.optionals {
            let t = next(args, &opt.name, &mut rest_are_keywords)?;
            out.push(t.unwrap_or_else(|| opt.default.clone()));
        }

        if self.rest.is_some() {
            out.push(args.rest_positionals());
        }
        Ok(())
    }

    fn bind_keywords(&self, args: &mut Arguments, out: &mut Vec<Thunk>) -> Result<(), Error> {
        for name in &self.requireds {
            match args.search_keyword(name)? {
                Some(t) => out.push(t),
                None => return Err(Error::argument("could not bind required keyword argument")),
            }
        }

        for opt in &self.optionals {
            let t = args.search_keyword(&opt.name)?;
            out.push(t.unwrap_or_else(|| opt.default.clone()));
        }

        if self.rest.is_some() {
            out.push(args.rest_keywords());
        }
        Ok(())
    }
}

fn next(args: &mut Arguments, name: &str, rest_are_keywords: &mut bool) -> Result<Option<Thunk>, Error> {
    if !*rest_are_keywords {
        if let Some(t) = args.next_positional()? {
            return Ok(Some(t));
        }
    }
    *rest_are_keywords = true;
    args.search_keyword(name)
}

#[derive(Debug, Clone, Default)]
pub struct Signature {
    positional: HalfSignature,
    keyword: HalfSignature,
}

impl Signature {
    pub fn new(positional: HalfSignature, keyword: HalfSignature) -> Self {
        Self { positional, keyword }
    }

    /// A signature without keyword parameters.
    pub fn positional(requireds: &[&str], optionals: Vec<OptionalArgument>, rest: Option<&str>) -> Self {
        Self::new(HalfSignature::of(requireds, optionals, rest), HalfSignature::default())
    }

    pub fn positional_half(&self) -> &HalfSignature {
        &self.positional
    }

    pub fn keyword_half(&self) -> &HalfSignature {
        &self.keyword
    }

    pub fn arity(&self) -> usize {
        self.positional.arity() + self.keyword.arity()
    }

    /// Binds `args`, returning one thunk per parameter: positional requireds,
    /// optionals and rest, then the keyword half in the same order.
    pub fn bind(&self, mut args: Arguments) -> Result<Vec<Thunk>, Error> {
        let mut out = Vec::with_capacity(self.arity());
        self.positional.bind_positionals(&mut args, &mut out)?;
        self.keyword.bind_keywords(&mut args, &mut out)?;
        args.check_empty()?;
        Ok(out)
    }
}

/// Signature of lists and dictionaries called as functions.
pub(crate) static INDEX: LazyLock<Signature> = LazyLock::new(|| Signature::positional(&["index"], vec![], None));
