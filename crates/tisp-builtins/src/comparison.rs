use std::cmp::Ordering;

use tisp_core::value::{compare, equal};
use tisp_core::{Error, Signature, Value};

use crate::{define, Table};

pub(crate) fn register(m: &mut Table) {
    // = : a... -> bool, every argument equal to the first
    define(m, "=", Signature::positional(&[], vec![], Some("args")), |ts| {
        let mut args = ts[0].force_list()?.iter();
        let Some(first) = args.next() else {
            return Ok(Value::Bool(true).into());
        };
        let first = first?.try_force()?;
        for t in args {
            if !equal(&first, &t?.try_force()?)? {
                return Ok(Value::Bool(false).into());
            }
        }
        Ok(Value::Bool(true).into())
    });

    chain(m, "<", |o| o == Ordering::Less);
    chain(m, "<=", |o| o != Ordering::Greater);
    chain(m, ">", |o| o == Ordering::Greater);
    chain(m, ">=", |o| o != Ordering::Less);

    // compare : a -> a -> number (-1, 0 or 1)
    define(m, "compare", Signature::positional(&["left", "right"], vec![], None), |ts| {
        let n = match compare(&ts[0].try_force()?, &ts[1].try_force()?)? {
            Ordering::Less => -1.0,
            Ordering::Equal => 0.0,
            Ordering::Greater => 1.0,
        };
        Ok(Value::Number(n).into())
    });

    // isOrdered : a -> bool
    define(m, "isOrdered", Signature::positional(&["arg"], vec![], None), |ts| {
        Ok(Value::Bool(ts[0].try_force()?.as_ordered().is_some()).into())
    });
}

/// Checks `holds` on every adjacent pair of arguments.
fn chain(m: &mut Table, name: &'static str, holds: fn(Ordering) -> bool) {
    define(m, name, Signature::positional(&[], vec![], Some("args")), move |ts| {
        let mut prev: Option<Value> = None;
        for t in ts[0].force_list()?.iter() {
            let v = t?.try_force()?;
            if let Some(p) = &prev {
                if !holds(compare(p, &v)?) {
                    return Ok(Value::Bool(false).into());
                }
            }
            prev = Some(v);
        }
        match prev {
            Some(_) => Ok(Value::Bool(true).into()),
            None => Err(Error::argument(format!("{name} needs at least 1 argument"))),
        }
    });
}

#[cfg(test)]
mod tests {
    use crate::testing::call;
    use tisp_core::{ErrorKind, List, Native, Value};

    fn holds(name: &str, args: Vec<Value>) -> bool {
        call(name, args).force_bool().unwrap()
    }

    #[test]
    fn equality_over_many_arguments() {
        assert!(holds("=", vec![]));
        assert!(holds("=", vec![1.0.into(), 1.0.into(), 1.0.into()]));
        assert!(!holds("=", vec![1.0.into(), 1.0.into(), 2.0.into()]));
        assert!(!holds("=", vec![1.0.into(), "1".into()]));
        let l = |xs: Vec<Value>| Value::List(List::from_values(xs));
        assert!(holds("=", vec![l(vec![1.0.into()]), l(vec![1.0.into()])]));
    }

    #[test]
    fn orderings_chain_over_adjacent_pairs() {
        assert!(holds("<", vec![1.0.into(), 2.0.into(), 3.0.into()]));
        assert!(!holds("<", vec![1.0.into(), 3.0.into(), 2.0.into()]));
        assert!(holds("<=", vec![1.0.into(), 1.0.into()]));
        assert!(holds(">", vec!["b".into(), "a".into()]));
        assert!(holds(">=", vec![true.into(), false.into()]));
    }

    #[test]
    fn ordering_mixed_variants_fails() {
        let e = call("<", vec![1.0.into(), "a".into()]).try_force().unwrap_err();
        assert_eq!(e.kind(), &ErrorKind::NotComparable);
    }

    #[test]
    fn compare_returns_a_sign() {
        assert_eq!(call("compare", vec![1.0.into(), 2.0.into()]).force_number().unwrap(), -1.0);
        assert_eq!(call("compare", vec!["a".into(), "a".into()]).force_number().unwrap(), 0.0);
        let f = Value::Native(Native::new("f", |_| Ok(Value::Bool(true).into())));
        assert!(!holds("isOrdered", vec![f]));
        assert!(holds("isOrdered", vec![1.0.into()]));
    }
}
