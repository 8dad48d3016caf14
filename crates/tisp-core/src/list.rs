//! Persistent singly linked lists of thunks.
//!
//! Tails are thunks themselves, so a list can be produced lazily and consumed
//! one cell at a time.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::arguments::Arguments;
use crate::error::Error;
use crate::function::Eval;
use crate::signature::INDEX;
use crate::thunk::Thunk;
use crate::value::{self, Callable, Ordered, Stringable, Value};

#[derive(Debug, Clone, Default)]
pub enum List {
    #[default]
    Empty,
    Cons(Arc<Cons>),
}

#[derive(Debug)]
pub struct Cons {
    head: Thunk,
    tail: Thunk,
}

impl Cons {
    pub fn head(&self) -> &Thunk {
        &self.head
    }

    pub fn tail(&self) -> &Thunk {
        &self.tail
    }
}

impl Drop for Cons {
    // Unlinks forced tails one cell at a time instead of recursing.
    fn drop(&mut self) {
        let mut next = self.tail.take_unshared_list();
        while let Some(mut cell) = next {
            next = Arc::get_mut(&mut cell).and_then(|c| c.tail.take_unshared_list());
        }
    }
}

impl List {
    pub fn cons(head: Thunk, tail: Thunk) -> Self {
        List::Cons(Arc::new(Cons { head, tail }))
    }

    pub fn from_thunks(ts: Vec<Thunk>) -> Self {
        ts.into_iter().rev().fold(List::Empty, |l, t| l.prepend(t))
    }

    pub fn from_values(vs: Vec<Value>) -> Self {
        Self::from_thunks(vs.into_iter().map(Thunk::normal).collect())
    }

    pub fn prepend(&self, head: Thunk) -> Self {
        Self::cons(head, Thunk::normal(Value::List(self.clone())))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, List::Empty)
    }

    pub fn first(&self) -> Result<Thunk, Error> {
        match self {
            List::Empty => Err(Error::empty_list()),
            List::Cons(c) => Ok(c.head.clone()),
        }
    }

    pub fn rest(&self) -> Result<Thunk, Error> {
        match self {
            List::Empty => Err(Error::empty_list()),
            List::Cons(c) => Ok(c.tail.clone()),
        }
    }

    /// Walks elements, forcing one tail per step.
    pub fn iter(&self) -> Iter {
        Iter { rest: Some(Thunk::normal(Value::List(self.clone()))) }
    }

    pub fn size(&self) -> Result<usize, Error> {
        let mut n = 0;
        for t in self.iter() {
            t?;
            n += 1;
        }
        Ok(n)
    }

    pub fn to_thunks(&self) -> Result<Vec<Thunk>, Error> {
        self.iter().collect()
    }

    /// Element at a 1-based index.
    pub fn index(&self, index: f64) -> Result<Thunk, Error> {
        let mut rest = self.clone();
        for _ in 0..position(index)? {
            match rest {
                List::Empty => return Err(Error::out_of_range()),
                List::Cons(c) => rest = c.tail.force_list()?,
            }
        }
        match rest {
            List::Empty => Err(Error::out_of_range()),
            List::Cons(c) => Ok(c.head.clone()),
        }
    }

    /// A list without the element at a 1-based index. The suffix is shared.
    pub fn delete(&self, index: f64) -> Result<List, Error> {
        if self.is_empty() {
            return Err(Error::empty_list());
        }
        let i = position(index)?;
        let (prefix, rest) = self.split(i)?;
        match rest {
            List::Empty => Err(Error::out_of_range()),
            List::Cons(c) => prepend_all(prefix, c.tail.clone()),
        }
    }

    /// A list with `elem` placed at a 1-based index; `size + 1` appends.
    pub fn insert(&self, index: f64, elem: Thunk) -> Result<List, Error> {
        let i = position(index)?;
        let (prefix, rest) = self.split(i)?;
        let tail = Thunk::normal(Value::List(List::cons(elem, Thunk::normal(Value::List(rest)))));
        prepend_all(prefix, tail)
    }

    pub fn include(&self, v: &Value) -> Result<bool, Error> {
        for t in self.iter() {
            if value::equal(&t?.try_force()?, v)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn equal(&self, other: &List) -> Result<bool, Error> {
        let (mut xs, mut ys) = (self.iter(), other.iter());
        loop {
            match (xs.next().transpose()?, ys.next().transpose()?) {
                (None, None) => return Ok(true),
                (Some(x), Some(y)) => {
                    if !value::equal(&x.try_force()?, &y.try_force()?)? {
                        return Ok(false);
                    }
                }
                _ => return Ok(false),
            }
        }
    }

    /// Splits off the first `n` heads. Fails if the list is shorter than `n`.
    fn split(&self, n: usize) -> Result<(Vec<Thunk>, List), Error> {
        let mut prefix = Vec::new();
        let mut rest = self.clone();
        while prefix.len() < n {
            let List::Cons(c) = rest else {
                return Err(Error::out_of_range());
            };
            prefix.push(c.head.clone());
            rest = c.tail.force_list()?;
        }
        Ok((prefix, rest))
    }
}

fn position(index: f64) -> Result<usize, Error> {
    if index.fract() != 0.0 {
        return Err(Error::value(format!("index {index} is not an integer")));
    }
    if index < 1.0 {
        return Err(Error::out_of_range());
    }
    Ok(index as usize - 1)
}

fn prepend_all(prefix: Vec<Thunk>, tail: Thunk) -> Result<List, Error> {
    let mut heads = prefix.into_iter().rev();
    let Some(last) = heads.next() else {
        return tail.force_list();
    };
    Ok(heads.fold(List::cons(last, tail), |l, head| l.prepend(head)))
}

pub struct Iter {
    rest: Option<Thunk>,
}

impl Iterator for Iter {
    type Item = Result<Thunk, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest.take()?;
        match rest.force_list() {
            Err(e) => Some(Err(e)),
            Ok(List::Empty) => None,
            Ok(List::Cons(c)) => {
                self.rest = Some(c.tail.clone());
                Some(Ok(c.head.clone()))
            }
        }
    }
}

impl Ordered for List {
    fn compare(&self, other: &Value) -> Result<Ordering, Error> {
        let Value::List(other) = other else {
            return Err(Error::incomparable(&Value::List(self.clone()), other));
        };
        let (mut xs, mut ys) = (self.iter(), other.iter());
        loop {
            match (xs.next().transpose()?, ys.next().transpose()?) {
                (None, None) => return Ok(Ordering::Equal),
                (None, Some(_)) => return Ok(Ordering::Less),
                (Some(_), None) => return Ok(Ordering::Greater),
                (Some(x), Some(y)) => match value::compare(&x.try_force()?, &y.try_force()?)? {
                    Ordering::Equal => {}
                    o => return Ok(o),
                },
            }
        }
    }
}

impl Stringable for List {
    fn string(&self) -> Result<String, Error> {
        let mut parts = Vec::new();
        for t in self.iter() {
            parts.push(value::dump(&t?.try_force()?)?);
        }
        Ok(format!("[{}]", parts.join(" ")))
    }
}

impl Callable for List {
    fn call(&self, args: Arguments) -> Eval {
        let ts = INDEX.bind(args)?;
        Ok(self.index(ts[0].force_number()?)?.into())
    }
}
