use tisp_core::natives::{APPEND, MERGE};
use tisp_core::{Dictionary, Error, List, Signature, Value};

use crate::{define, Table};

pub(crate) fn register(m: &mut Table) {
    m.insert("merge", MERGE.force());
    m.insert("append", APPEND.force());

    define(m, "first", Signature::positional(&["list"], vec![], None), |ts| {
        Ok(ts[0].force_list()?.first()?.into())
    });
    define(m, "rest", Signature::positional(&["list"], vec![], None), |ts| {
        Ok(ts[0].force_list()?.rest()?.into())
    });

    // prepend : a... -> [a] -> [a]
    define(m, "prepend", Signature::positional(&[], vec![], Some("elemsAndList")), |ts| {
        let mut args = ts[0].force_list()?.to_thunks()?;
        let Some(list) = args.pop() else {
            return Err(Error::argument("prepend needs a list"));
        };
        let list = args.into_iter().rev().fold(list.force_list()?, |l, t| l.prepend(t));
        Ok(Value::List(list).into())
    });

    // insert : collection -> key -> value -> collection
    define(m, "insert", Signature::positional(&["collection", "key", "value"], vec![], None), |ts| {
        let v = match ts[0].try_force()? {
            Value::List(l) => Value::List(l.insert(ts[1].force_number()?, ts[2].clone())?),
            Value::Dictionary(d) => Value::Dictionary(d.insert(&ts[1].try_force()?, ts[2].clone())?),
            v => return Err(not_collection(&v)),
        };
        Ok(v.into())
    });

    // delete : collection -> key -> collection
    define(m, "delete", Signature::positional(&["collection", "key"], vec![], None), |ts| {
        let v = match ts[0].try_force()? {
            Value::List(l) => Value::List(l.delete(ts[1].force_number()?)?),
            Value::Dictionary(d) => {
                let key = ts[1].try_force()?;
                if !d.include(&key)? {
                    return Err(Error::key_not_found(&tisp_core::value::dump(&key)?));
                }
                Value::Dictionary(d.remove(&key)?)
            }
            v => return Err(not_collection(&v)),
        };
        Ok(v.into())
    });

    // include : collection -> elem -> bool
    define(m, "include", Signature::positional(&["collection", "elem"], vec![], None), |ts| {
        let elem = ts[1].try_force()?;
        let found = match ts[0].try_force()? {
            Value::List(l) => l.include(&elem)?,
            Value::Dictionary(d) => d.include(&elem)?,
            Value::String(s) => match &elem {
                Value::String(sub) => s.contains(sub.as_ref()),
                v => return Err(Error::not_string(v)),
            },
            v => return Err(not_collection(&v)),
        };
        Ok(Value::Bool(found).into())
    });

    // index : collection -> key -> a
    define(m, "index", Signature::positional(&["collection", "key"], vec![], None), |ts| {
        let index = match ts[0].try_force()? {
            Value::List(l) => l.index(ts[1].force_number()?)?,
            Value::Dictionary(d) => {
                let key = ts[1].try_force()?;
                match d.search(&key)? {
                    Some(t) => t,
                    None => return Err(Error::key_not_found(&tisp_core::value::dump(&key)?)),
                }
            }
            v => return Err(not_collection(&v)),
        };
        Ok(index.into())
    });

    define(m, "size", Signature::positional(&["collection"], vec![], None), |ts| {
        let n = match ts[0].try_force()? {
            Value::List(l) => l.size()?,
            Value::Dictionary(d) => d.size(),
            Value::String(s) => s.chars().count(),
            v => return Err(not_collection(&v)),
        };
        Ok(Value::Number(n as f64).into())
    });

    // toList : collection -> [a]
    define(m, "toList", Signature::positional(&["collection"], vec![], None), |ts| {
        let l = match ts[0].try_force()? {
            Value::List(l) => l,
            Value::Dictionary(d) => d.to_list(),
            Value::String(s) => List::from_values(s.chars().map(|c| Value::from(c.to_string())).collect()),
            v => return Err(not_collection(&v)),
        };
        Ok(Value::List(l).into())
    });

    define(m, "list", Signature::positional(&[], vec![], Some("elems")), |ts| {
        Ok(ts[0].clone().into())
    });

    // dict : k -> v -> ... -> {k v}
    define(m, "dict", Signature::positional(&[], vec![], Some("keyValuePairs")), |ts| {
        let kvs = ts[0].force_list()?.to_thunks()?;
        if kvs.len() % 2 != 0 {
            return Err(Error::argument("dict needs an even number of arguments"));
        }
        let mut d = Dictionary::new();
        for kv in kvs.chunks(2) {
            d = d.insert(&kv[0].try_force()?, kv[1].clone())?;
        }
        Ok(Value::Dictionary(d).into())
    });
}

fn not_collection(v: &Value) -> Error {
    Error::type_error(format!("{} is not a collection", v.type_name()))
}

#[cfg(test)]
mod tests {
    use crate::testing::{call, number};
    use tisp_core::value::to_string;
    use tisp_core::{ErrorKind, List, Value};

    fn list(xs: &[f64]) -> Value {
        Value::List(List::from_values(xs.iter().map(|x| Value::Number(*x)).collect()))
    }

    fn show(name: &str, args: Vec<Value>) -> String {
        to_string(&call(name, args).force()).unwrap()
    }

    #[test]
    fn list_primitives() {
        assert_eq!(number("first", vec![list(&[1.0, 2.0])]), 1.0);
        assert_eq!(show("rest", vec![list(&[1.0, 2.0])]), "[2]");
        assert_eq!(show("prepend", vec![0.0.into(), 1.0.into(), list(&[2.0])]), "[0 1 2]");
        assert_eq!(show("insert", vec![list(&[1.0, 3.0]), 2.0.into(), 2.0.into()]), "[1 2 3]");
        assert_eq!(show("delete", vec![list(&[1.0, 2.0, 3.0]), 2.0.into()]), "[1 3]");
        assert_eq!(number("index", vec![list(&[4.0, 5.0]), 2.0.into()]), 5.0);
        assert_eq!(number("size", vec![list(&[4.0, 5.0])]), 2.0);
        assert_eq!(show("merge", vec![list(&[1.0]), list(&[2.0])]), "[1 2]");
        assert_eq!(show("append", vec![list(&[1.0]), 2.0.into(), 3.0.into()]), "[1 2 3]");
        assert_eq!(show("list", vec![1.0.into(), "a".into()]), "[1 \"a\"]");
    }

    #[test]
    fn first_of_an_empty_list_is_a_value_error() {
        let e = call("first", vec![list(&[])]).try_force().unwrap_err();
        assert_eq!(e.kind(), &ErrorKind::Value);
    }

    #[test]
    fn dictionary_primitives() {
        let d = call("dict", vec!["a".into(), 1.0.into(), "b".into(), 2.0.into()]).force();
        assert_eq!(to_string(&d).unwrap(), "{\"a\" 1 \"b\" 2}");
        assert_eq!(number("index", vec![d.clone(), "b".into()]), 2.0);
        assert_eq!(show("insert", vec![d.clone(), "a".into(), 9.0.into()]), "{\"a\" 9 \"b\" 2}");
        assert_eq!(show("delete", vec![d.clone(), "a".into()]), "{\"b\" 2}");
        assert_eq!(show("toList", vec![d.clone()]), "[[\"a\" 1] [\"b\" 2]]");
        assert!(call("include", vec![d.clone(), "a".into()]).force_bool().unwrap());
        assert_eq!(number("size", vec![d.clone()]), 2.0);

        let e = call("delete", vec![d.clone(), "z".into()]).try_force().unwrap_err();
        assert_eq!(e.kind(), &ErrorKind::KeyNotFound);
        let e = call("dict", vec!["a".into()]).try_force().unwrap_err();
        assert_eq!(e.kind(), &ErrorKind::Argument);
    }

    #[test]
    fn strings_have_size_and_substrings() {
        assert_eq!(number("size", vec!["héllo".into()]), 5.0);
        assert!(call("include", vec!["hello".into(), "ell".into()]).force_bool().unwrap());
        assert_eq!(show("toList", vec!["ab".into()]), "[\"a\" \"b\"]");
    }
}
