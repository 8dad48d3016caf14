//! Collection functions the argument binder itself depends on.

use std::sync::LazyLock;

use crate::error::Error;
use crate::function::{Eval, Function};
use crate::list::List;
use crate::signature::Signature;
use crate::thunk::Thunk;
use crate::value::Value;

/// Concatenates lists lazily or merges dictionaries, later ones winning.
pub static MERGE: LazyLock<Thunk> = LazyLock::new(|| {
    let f = Function::new(
        "merge",
        Signature::positional(&["collection"], vec![], Some("collections")),
        |ts| merge(&ts[0], &ts[1]),
    );
    Thunk::normal(Value::Function(f))
});

/// Appends elements to the end of a list lazily.
pub static APPEND: LazyLock<Thunk> = LazyLock::new(|| {
    let f = Function::new(
        "append",
        Signature::positional(&["list"], vec![], Some("elems")),
        |ts| Ok(Thunk::papp(&MERGE, [ts[0].clone(), ts[1].clone()]).into()),
    );
    Thunk::normal(Value::Function(f))
});

fn merge(first: &Thunk, rest: &Thunk) -> Eval {
    match first.try_force()? {
        Value::List(l) => merge_lists(l, rest),
        Value::Dictionary(mut d) => {
            for t in rest.force_list()?.iter() {
                d = d.merge(&t?.force_dictionary()?);
            }
            Ok(Value::Dictionary(d).into())
        }
        v => Err(Error::type_error(format!("{} cannot be merged", v.type_name()))),
    }
}

/// Produces one cell per forced cell of the sources.
fn merge_lists(mut first: List, rest: &Thunk) -> Eval {
    let mut rest = rest.clone();
    loop {
        match first {
            List::Cons(c) => {
                let head = c.head().clone();
                let tail = Thunk::deferred(move || merge_lists(c.tail().force_list()?, &rest));
                return Ok(Value::List(List::cons(head, tail)).into());
            }
            List::Empty => match rest.force_list()? {
                List::Empty => return Ok(Value::List(List::Empty).into()),
                List::Cons(next) => {
                    first = next.head().force_list()?;
                    rest = next.tail().clone();
                }
            },
        }
    }
}
