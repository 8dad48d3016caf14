//! Persistent ordered dictionaries.
//!
//! Keys are deep-forced into [`Key`] on the way in, which gives every key a
//! place in one global order: variants rank bool < number < string < list <
//! dict, and values of the same variant order as they compare.

use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::arguments::Arguments;
use crate::error::Error;
use crate::function::Eval;
use crate::list::List;
use crate::signature::INDEX;
use crate::thunk::Thunk;
use crate::value::{self, Callable, Ordered, Stringable, Value};

/// A fully forced, immutable dictionary key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Key {
    Bool(bool),
    Number(OrderedFloat<f64>),
    String(Arc<str>),
    List(Vec<Key>),
    Dictionary(Vec<(Key, Key)>),
}

impl Key {
    pub fn from_value(v: &Value) -> Result<Key, Error> {
        Ok(match v {
            Value::Bool(b) => Key::Bool(*b),
            Value::Number(n) => Key::Number(OrderedFloat(*n)),
            Value::String(s) => Key::String(s.clone()),
            Value::List(l) => {
                let mut keys = Vec::new();
                for t in l.iter() {
                    keys.push(Key::from_value(&t?.try_force()?)?);
                }
                Key::List(keys)
            }
            Value::Dictionary(d) => {
                let mut entries = Vec::with_capacity(d.size());
                for (k, t) in d.iter() {
                    entries.push((k.clone(), Key::from_value(&t.try_force()?)?));
                }
                Key::Dictionary(entries)
            }
            Value::Error(e) => return Err(e.clone()),
            _ => return Err(Error::not_comparable(v)),
        })
    }

    pub fn to_value(&self) -> Value {
        match self {
            Key::Bool(b) => Value::Bool(*b),
            Key::Number(n) => Value::Number(n.0),
            Key::String(s) => Value::String(s.clone()),
            Key::List(ks) => Value::List(List::from_values(ks.iter().map(Key::to_value).collect())),
            Key::Dictionary(es) => Value::Dictionary(Dictionary {
                entries: es.iter().map(|(k, v)| (k.clone(), Thunk::normal(v.to_value()))).collect(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: im::OrdMap<Key, Thunk>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: &Value, value: Thunk) -> Result<Dictionary, Error> {
        Ok(self.insert_key(Key::from_value(key)?, value))
    }

    pub fn insert_key(&self, key: Key, value: Thunk) -> Dictionary {
        Dictionary { entries: self.entries.update(key, value) }
    }

    pub fn search(&self, key: &Value) -> Result<Option<Thunk>, Error> {
        Ok(self.search_key(&Key::from_value(key)?))
    }

    pub fn search_key(&self, key: &Key) -> Option<Thunk> {
        self.entries.get(key).cloned()
    }

    pub fn remove(&self, key: &Value) -> Result<Dictionary, Error> {
        Ok(self.remove_key(&Key::from_value(key)?))
    }

    pub fn remove_key(&self, key: &Key) -> Dictionary {
        Dictionary { entries: self.entries.without(key) }
    }

    pub fn include(&self, key: &Value) -> Result<bool, Error> {
        Ok(self.entries.contains_key(&Key::from_value(key)?))
    }

    /// Entries of `other` replace entries of `self` with the same key.
    pub fn merge(&self, other: &Dictionary) -> Dictionary {
        Dictionary { entries: other.entries.clone().union(self.entries.clone()) }
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Thunk)> {
        self.entries.iter()
    }

    /// A lazy list of `[key value]` pairs in ascending key order.
    pub fn to_list(&self) -> List {
        pairs(self.entries.clone())
    }

    pub fn equal(&self, other: &Dictionary) -> Result<bool, Error> {
        if self.size() != other.size() {
            return Ok(false);
        }
        for ((k, x), (l, y)) in self.iter().zip(other.iter()) {
            if k != l || !value::equal(&x.try_force()?, &y.try_force()?)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

fn pairs(entries: im::OrdMap<Key, Thunk>) -> List {
    let Some((key, value)) = entries.get_min().cloned() else {
        return List::Empty;
    };
    let pair = List::from_thunks(vec![Thunk::normal(key.to_value()), value]);
    let rest = entries.without(&key);
    List::cons(
        Thunk::normal(Value::List(pair)),
        Thunk::deferred(move || Ok(Value::List(pairs(rest.clone())).into())),
    )
}

impl FromIterator<(Key, Thunk)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (Key, Thunk)>>(iter: I) -> Self {
        Dictionary { entries: iter.into_iter().collect() }
    }
}

impl Ordered for Dictionary {
    fn compare(&self, other: &Value) -> Result<Ordering, Error> {
        let Value::Dictionary(other) = other else {
            return Err(Error::incomparable(&Value::Dictionary(self.clone()), other));
        };
        let (mut xs, mut ys) = (self.iter(), other.iter());
        loop {
            match (xs.next(), ys.next()) {
                (None, None) => return Ok(Ordering::Equal),
                (None, Some(_)) => return Ok(Ordering::Less),
                (Some(_), None) => return Ok(Ordering::Greater),
                (Some((k, x)), Some((l, y))) => {
                    match k.cmp(l) {
                        Ordering::Equal => {}
                        o => return Ok(o),
                    }
                    match value::compare(&x.try_force()?, &y.try_force()?)? {
                        Ordering::Equal => {}
                        o => return Ok(o),
                    }
                }
            }
        }
    }
}

impl Stringable for Dictionary {
    fn string(&self) -> Result<String, Error> {
        let mut parts = Vec::with_capacity(2 * self.size());
        for (k, t) in self.iter() {
            parts.push(value::dump(&k.to_value())?);
            parts.push(value::dump(&t.try_force()?)?);
        }
        Ok(format!("{{{}}}", parts.join(" ")))
    }
}

impl Callable for Dictionary {
    fn call(&self, args: Arguments) -> Eval {
        let ts = INDEX.bind(args)?;
        let key = ts[0].try_force()?;
        match self.search(&key)? {
            Some(t) => Ok(t.into()),
            None => Err(Error::key_not_found(&value::dump(&key)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn n(x: f64) -> Thunk {
        Thunk::normal(Value::Number(x))
    }

    #[test]
    fn keys_of_different_variants_coexist_in_rank_order() {
        let d = Dictionary::new()
            .insert(&"a".into(), n(3.0))
            .unwrap()
            .insert(&1.0.into(), n(2.0))
            .unwrap()
            .insert(&true.into(), n(1.0))
            .unwrap();
        let values: Vec<f64> = d.iter().map(|(_, t)| t.force_number().unwrap()).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert_eq!(d.string().unwrap(), "{true 1 1 2 \"a\" 3}");
    }

    #[test]
    fn merge_prefers_the_right_operand() {
        let x1 = Dictionary::new().insert(&"x".into(), n(1.0)).unwrap();
        let x2 = Dictionary::new().insert(&"x".into(), n(2.0)).unwrap();
        let merged = x1.merge(&x2);
        assert_eq!(merged.size(), 1);
        assert_eq!(merged.search(&"x".into()).unwrap().unwrap().force_number().unwrap(), 2.0);
    }

    #[test]
    fn functions_cannot_be_keys() {
        let f = Value::Native(crate::function::Native::new("f", |_| Ok(Value::Bool(true).into())));
        let e = Dictionary::new().insert(&f, n(1.0)).unwrap_err();
        assert_eq!(e.kind(), &ErrorKind::NotComparable);
    }

    #[test]
    fn composite_keys_are_compared_structurally() {
        let key = Value::List(List::from_values(vec![1.0.into(), "x".into()]));
        let same = Value::List(List::from_values(vec![1.0.into(), "x".into()]));
        let d = Dictionary::new().insert(&key, n(1.0)).unwrap();
        assert!(d.include(&same).unwrap());
        assert!(d.remove(&same).unwrap().is_empty());
    }

    #[test]
    fn missing_keys_are_reported_when_called() {
        let d = Dictionary::new().insert(&"x".into(), n(1.0)).unwrap();
        let t = Thunk::papp(&Thunk::normal(Value::Dictionary(d)), [Thunk::normal("y".into())]);
        let e = t.try_force().unwrap_err();
        assert_eq!(e.kind(), &ErrorKind::KeyNotFound);
        assert_eq!(e.message(), "key \"y\" is not found");
    }

    #[test]
    fn to_list_yields_pairs_in_key_order() {
        let d = Dictionary::new()
            .insert(&2.0.into(), n(20.0))
            .unwrap()
            .insert(&1.0.into(), n(10.0))
            .unwrap();
        let l = d.to_list();
        assert_eq!(value::to_string(&Value::List(l)).unwrap(), "[[1 10] [2 20]]");
    }
}
