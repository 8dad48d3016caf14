use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tisp_core::value::{dump, to_string};
use tisp_core::{
    Arguments, Dictionary, Error, Eval, Function, HalfSignature, List, Native,
    PositionalArgument, Signature, Thunk, Value,
};

use crate::{define, pool, Table};

/// How long `rally` waits for the pool before forcing an argument itself.
const RALLY_WAIT: Duration = Duration::from_millis(50);

pub(crate) fn register(m: &mut Table) {
    define(m, "if", Signature::positional(&["condition", "then", "else"], vec![], None), |ts| {
        let branch = if ts[0].force_bool()? { &ts[1] } else { &ts[2] };
        Ok(branch.clone().into())
    });

    // partial : function -> a... -> function
    let partial = Signature::new(
        HalfSignature::of(&["function"], vec![], Some("args")),
        HalfSignature::of(&[], vec![], Some("kwargs")),
    );
    define(m, "partial", partial, |ts| {
        let (f, args, kwargs) = (ts[0].clone(), ts[1].clone(), ts[2].clone());
        let g = Native::new("partial", move |rest| {
            let bound = Arguments::new(
                vec![PositionalArgument::new(args.clone(), true)],
                vec![],
                vec![kwargs.clone()],
            );
            Ok(Thunk::app(f.clone(), bound.merge(rest)).into())
        });
        Ok(Value::Native(g).into())
    });

    define(m, "typeOf", Signature::positional(&["arg"], vec![], None), |ts| {
        Ok(Value::from(ts[0].force().type_name()).into())
    });
    define(m, "toStr", Signature::positional(&["arg"], vec![], None), |ts| {
        Ok(Value::from(to_string(&ts[0].try_force()?)?).into())
    });
    define(m, "dump", Signature::positional(&["arg"], vec![], None), |ts| {
        Ok(Value::from(dump(&ts[0].try_force()?)?).into())
    });

    // error : string -> string -> error
    define(m, "error", Signature::positional(&["name", "message"], vec![], None), |ts| {
        let name = ts[0].force_string()?;
        let message = ts[1].force_string()?;
        Err(Error::custom(&name, message.as_ref()))
    });

    // catch : a -> {"name" string "message" string}, empty when `a` is not an error
    define(m, "catch", Signature::positional(&["arg"], vec![], None), |ts| {
        let mut d = Dictionary::new();
        if let Value::Error(e) = ts[0].force() {
            d = d.insert(&"name".into(), Thunk::normal(e.name().into()))?;
            d = d.insert(&"message".into(), Thunk::normal(e.message().into()))?;
        }
        Ok(Value::Dictionary(d).into())
    });

    // y : (self -> a... -> b) -> (a... -> b)
    define(m, "y", Signature::positional(&["function"], vec![], None), |ts| {
        Ok(fixed_point(ts[0].clone(), Thunk::vacant()).force().into())
    });

    // ys : (fs -> a... -> b)... -> [a... -> b]
    define(m, "ys", Signature::positional(&[], vec![], Some("functions")), |ts| {
        let all = Thunk::vacant();
        let fs: Vec<Thunk> = ts[0]
            .force_list()?
            .to_thunks()?
            .into_iter()
            .map(|f| Thunk::normal(Value::Native(self_applied(f, all.clone()))))
            .collect();
        let list = Value::List(List::from_thunks(fs));
        all.fill(Thunk::normal(list.clone()));
        Ok(list.into())
    });

    // seq : a... -> a, forcing all but the last in order
    define(m, "seq", Signature::positional(&["arg"], vec![], Some("args")), |ts| {
        let mut last = ts[0].clone();
        for t in ts[1].force_list()?.iter() {
            last.try_force()?;
            last = t?;
        }
        Ok(last.into())
    });

    m.insert(
        "effectSeq",
        Value::Function(Function::effect(
            "effectSeq",
            Signature::positional(&["effect"], vec![], Some("effects")),
            |ts| {
                let mut last = ts[0].force_effect();
                for t in ts[1].force_list()?.iter() {
                    if let Value::Error(e) = last {
                        return Err(e);
                    }
                    last = t?.force_effect();
                }
                Ok(last.into())
            },
        )),
    );

    // par : a... -> a, forcing all but the last in the background
    define(m, "par", Signature::positional(&["arg"], vec![], Some("args")), |ts| {
        let mut last = ts[0].clone();
        for t in ts[1].force_list()?.iter() {
            pool::force(last);
            last = t?;
        }
        Ok(last.into())
    });

    // rally : a... -> [a], listed in the order they finish
    define(m, "rally", Signature::positional(&[], vec![], Some("args")), |ts| {
        let args = ts[0].force_list()?.to_thunks()?;
        let (sender, finished) = mpsc::channel();
        for (i, t) in args.iter().enumerate() {
            let sender = sender.clone();
            pool::force_then(t.clone(), move || {
                let _ = sender.send(i);
            });
        }
        let left = args.len();
        let rally = Rally { emitted: vec![false; left], args, left, finished };
        rally_list(&Arc::new(Mutex::new(rally)))
    });
}

struct Rally {
    args: Vec<Thunk>,
    emitted: Vec<bool>,
    left: usize,
    finished: Receiver<usize>,
}

impl Rally {
    /// The next argument to list. Falls back to forcing the first unlisted
    /// argument in place when the pool reports nothing in time.
    fn next(&mut self) -> Option<Thunk> {
        while self.left > 0 {
            let i = match self.finished.recv_timeout(RALLY_WAIT) {
                Ok(i) => i,
                Err(_) => {
                    let i = self.emitted.iter().position(|e| !e)?;
                    self.args[i].force();
                    i
                }
            };
            if !self.emitted[i] {
                self.emitted[i] = true;
                self.left -= 1;
                return Some(self.args[i].clone());
            }
        }
        None
    }
}

fn rally_list(rally: &Arc<Mutex<Rally>>) -> Eval {
    let next = rally.lock().unwrap_or_else(PoisonError::into_inner).next();
    let Some(head) = next else {
        return Ok(Value::List(List::Empty).into());
    };
    let rest = Arc::clone(rally);
    let tail = Thunk::deferred(move || rally_list(&rest));
    Ok(Value::List(List::cons(head, tail)).into())
}

/// A function that passes `this` as its own first argument to `f`.
fn self_applied(f: Thunk, this: Thunk) -> Native {
    Native::new("fixed point", move |args| {
        let args = Arguments::positional([this.clone()]).merge(args);
        Ok(Thunk::app(f.clone(), args).into())
    })
}

fn fixed_point(f: Thunk, handle: Thunk) -> Thunk {
    let g = Thunk::normal(Value::Native(self_applied(f, handle.clone())));
    handle.fill(g.clone());
    g
}
