//! Thunks: memoized cells for deferred computations.
//!
//! A cell is forced at most once. Concurrent forcers block on the cell's
//! condition variable until the winner publishes the result. When an
//! application evaluates to another unforced application (a tail call), the
//! winner splices the child's pending work into its own cell and keeps going,
//! so tail recursion runs in constant stack and heap.

use std::fmt;
use std::mem;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use crate::arguments::Arguments;
use crate::dictionary::Dictionary;
use crate::error::{Error, Location};
use crate::function::{Eval, Native, Outcome};
use crate::list::{Cons, List};
use crate::value::Value;

#[derive(Clone)]
pub struct Thunk(Arc<Cell>);

struct Cell {
    state: Mutex<State>,
    forced: Condvar,
    /// Call site of the application the cell was created for.
    location: Option<Location>,
}

enum State {
    /// One-shot self handle waiting for `fill`.
    Vacant,
    Pending(Pending),
    Forcing,
    /// Pending work moved into another cell; its result is this cell's result.
    Redirect(Thunk),
    Forced(Value),
}

struct Pending {
    function: Thunk,
    args: Arguments,
    location: Option<Location>,
}

enum Step {
    Done(Value),
    Follow(Thunk),
    Run(Pending),
}

impl Thunk {
    fn with_state(state: State, location: Option<Location>) -> Self {
        Thunk(Arc::new(Cell { state: Mutex::new(state), forced: Condvar::new(), location }))
    }

    /// A thunk that is already forced.
    pub fn normal(value: Value) -> Self {
        Self::with_state(State::Forced(value), None)
    }

    pub fn app(function: Thunk, args: Arguments) -> Self {
        Self::pending(function, args, None)
    }

    pub fn app_at(function: Thunk, args: Arguments, location: Location) -> Self {
        Self::pending(function, args, Some(location))
    }

    /// Application with positional arguments only.
    pub fn papp(function: &Thunk, positionals: impl IntoIterator<Item = Thunk>) -> Self {
        Self::app(function.clone(), Arguments::positional(positionals))
    }

    fn pending(function: Thunk, args: Arguments, location: Option<Location>) -> Self {
        Self::with_state(State::Pending(Pending { function, args, location: location.clone() }), location)
    }

    /// Runs `f` the first time the thunk is forced.
    pub fn deferred<F>(f: F) -> Self
    where
        F: Fn() -> Eval + Send + Sync + 'static,
    {
        let native = Native::new("deferred", move |_| f());
        Self::app(Thunk::normal(Value::Native(native)), Arguments::default())
    }

    /// A handle that can be referenced before its target exists.
    pub fn vacant() -> Self {
        Self::with_state(State::Vacant, None)
    }

    /// Points a vacant handle at `target`.
    ///
    /// # Panics
    ///
    /// Panics if the handle was already filled or is not a vacant handle.
    pub fn fill(&self, target: Thunk) {
        let mut state = self.lock();
        match *state {
            State::Vacant => *state = State::Redirect(target),
            _ => panic!("thunk is not a vacant handle"),
        }
    }

    pub fn is_forced(&self) -> bool {
        matches!(*self.lock(), State::Forced(_))
    }

    /// Forces a pure value. Effects are rejected.
    pub fn force(&self) -> Value {
        match self.force_any() {
            Value::Effect(_) => {
                let e = Error::impure_function();
                Value::Error(match &self.0.location {
                    Some(location) => e.chained(location),
                    None => e,
                })
            }
            v => v,
        }
    }

    /// Forces an effect and then the action it wraps.
    pub fn force_effect(&self) -> Value {
        match self.force_any() {
            Value::Effect(inner) => inner.force(),
            v @ Value::Error(_) => v,
            v => Value::Error(Error::not_effect(&v)),
        }
    }

    pub fn try_force(&self) -> Result<Value, Error> {
        match self.force() {
            Value::Error(e) => Err(e),
            v => Ok(v),
        }
    }

    pub fn force_number(&self) -> Result<f64, Error> {
        match self.try_force()? {
            Value::Number(n) => Ok(n),
            v => Err(Error::not_number(&v)),
        }
    }

    pub fn force_string(&self) -> Result<Arc<str>, Error> {
        match self.try_force()? {
            Value::String(s) => Ok(s),
            v => Err(Error::not_string(&v)),
        }
    }

    pub fn force_bool(&self) -> Result<bool, Error> {
        match self.try_force()? {
            Value::Bool(b) => Ok(b),
            v => Err(Error::not_bool(&v)),
        }
    }

    pub fn force_list(&self) -> Result<List, Error> {
        match self.try_force()? {
            Value::List(l) => Ok(l),
            v => Err(Error::not_list(&v)),
        }
    }

    pub fn force_dictionary(&self) -> Result<Dictionary, Error> {
        match self.try_force()? {
            Value::Dictionary(d) => Ok(d),
            v => Err(Error::not_dictionary(&v)),
        }
    }

    /// Forces the thunk to a pure or effect value.
    pub(crate) fn force_any(&self) -> Value {
        let mut target = self.clone();
        loop {
            match target.begin() {
                Step::Done(v) => return v,
                Step::Follow(next) => target = next,
                Step::Run(pending) => return target.run(pending),
            }
        }
    }

    /// Detaches the list cell this thunk holds when no other handle can
    /// observe it, leaving an empty list behind.
    pub(crate) fn take_unshared_list(&mut self) -> Option<Arc<Cons>> {
        let cell = Arc::get_mut(&mut self.0)?;
        let state = cell.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if !matches!(*state, State::Forced(Value::List(List::Cons(_)))) {
            return None;
        }
        match mem::replace(state, State::Forced(Value::List(List::Empty))) {
            State::Forced(Value::List(List::Cons(c))) => Some(c),
            _ => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.0.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Step {
        let mut state = self.lock();
        while matches!(*state, State::Forcing) {
            state = self.0.forced.wait(state).unwrap_or_else(PoisonError::into_inner);
        }
        match mem::replace(&mut *state, State::Forcing) {
            State::Pending(pending) => Step::Run(pending),
            State::Forced(v) => {
                *state = State::Forced(v.clone());
                Step::Done(v)
            }
            State::Redirect(next) => {
                *state = State::Redirect(next.clone());
                Step::Follow(next)
            }
            State::Vacant => panic!("vacant thunk forced before it was filled"),
            State::Forcing => unreachable!(),
        }
    }

    fn run(&self, mut pending: Pending) -> Value {
        let (value, location) = loop {
            let Pending { function, args, location } = pending;
            match apply(&function, args) {
                Ok(Outcome::Value(v)) => break (v, location),
                Err(e) => break (Value::Error(e), location),
                Ok(Outcome::Tail(child)) => match child.take_pending(self) {
                    Some(next) => {
                        log::trace!("delegating tail call");
                        pending = next;
                    }
                    None => break (child.force_any(), location),
                },
            }
        };

        let value = match (value, location) {
            (Value::Error(e), Some(location)) => Value::Error(e.chained(&location)),
            (v, _) => v,
        };

        *self.lock() = State::Forced(value.clone());
        self.0.forced.notify_all();
        value
    }

    /// Moves the pending work of an unforced child into `parent`.
    fn take_pending(&self, parent: &Thunk) -> Option<Pending> {
        let mut state = self.lock();
        if !matches!(*state, State::Pending(_)) {
            return None;
        }
        match mem::replace(&mut *state, State::Redirect(parent.clone())) {
            State::Pending(pending) => Some(pending),
            _ => unreachable!(),
        }
    }
}

fn apply(function: &Thunk, args: Arguments) -> Eval {
    let f = function.try_force()?;
    match f.as_callable() {
        Some(callable) => callable.call(args),
        None => Err(Error::not_callable(&f)),
    }
}

impl From<Value> for Thunk {
    fn from(v: Value) -> Self {
        Thunk::normal(v)
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Thunk(..)")
    }
}
