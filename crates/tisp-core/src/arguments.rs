//! Call-site argument bundles.
//!
//! An `Arguments` value is consumed by exactly one binding; the binder takes
//! pieces out of it destructively.

use std::collections::VecDeque;

use crate::dictionary::{Dictionary, Key};
use crate::error::Error;
use crate::list::List;
use crate::natives::{APPEND, MERGE};
use crate::thunk::Thunk;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct PositionalArgument {
    pub value: Thunk,
    /// Spreads a list into the positional arguments.
    pub expanded: bool,
}

impl PositionalArgument {
    pub fn new(value: Thunk, expanded: bool) -> Self {
        Self { value, expanded }
    }
}

#[derive(Debug, Clone)]
pub struct KeywordArgument {
    pub name: String,
    pub value: Thunk,
}

impl KeywordArgument {
    pub fn new(name: impl Into<String>, value: Thunk) -> Self {
        Self { name: name.into(), value }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Arguments {
    positionals: VecDeque<Thunk>,
    /// Lazily joined list of everything from the first spread positional on.
    expanded_list: Option<Thunk>,
    keywords: Vec<KeywordArgument>,
    expanded_dicts: Vec<Thunk>,
}

impl Arguments {
    pub fn new(
        positionals: Vec<PositionalArgument>,
        keywords: Vec<KeywordArgument>,
        expanded_dicts: Vec<Thunk>,
    ) -> Self {
        let mut explicit = VecDeque::with_capacity(positionals.len());
        let mut expanded_list: Option<Thunk> = None;

        for p in positionals {
            expanded_list = match expanded_list {
                None if !p.expanded => {
                    explicit.push_back(p.value);
                    None
                }
                None => Some(p.value),
                Some(l) if p.expanded => Some(Thunk::papp(&MERGE, [l, p.value])),
                Some(l) => Some(Thunk::papp(&APPEND, [l, p.value])),
            };
        }

        Self { positionals: explicit, expanded_list, keywords, expanded_dicts }
    }

    pub fn positional(values: impl IntoIterator<Item = Thunk>) -> Self {
        Self { positionals: values.into_iter().collect(), ..Self::default() }
    }

    /// Takes the next positional, forcing one more cell of a spread list if needed.
    pub(crate) fn next_positional(&mut self) -> Result<Option<Thunk>, Error> {
        if let Some(t) = self.positionals.pop_front() {
            return Ok(Some(t));
        }
        let Some(list) = self.expanded_list.take() else {
            return Ok(None);
        };
        match list.force_list()? {
            List::Empty => Ok(None),
            List::Cons(cell) => {
                self.expanded_list = Some(cell.tail().clone());
                Ok(Some(cell.head().clone()))
            }
        }
    }

    /// Every remaining positional as one list. The spread tail stays lazy.
    pub(crate) fn rest_positionals(&mut self) -> Thunk {
        let explicit: Vec<Thunk> = self.positionals.drain(..).collect();
        match self.expanded_list.take() {
            None => Thunk::normal(Value::List(List::from_thunks(explicit))),
            Some(l) => {
                Thunk::papp(&MERGE, [Thunk::normal(Value::List(List::from_thunks(explicit))), l])
            }
        }
    }

    /// Removes and returns the argument named `name` from the explicit
    /// keywords or, failing that, from the first expanded dictionary holding it.
    pub(crate) fn search_keyword(&mut self, name: &str) -> Result<Option<Thunk>, Error> {
        if let Some(i) = self.keywords.iter().position(|k| k.name == name) {
            return Ok(Some(self.keywords.remove(i).value));
        }

        let key = Key::String(name.into());
        for slot in self.expanded_dicts.iter_mut() {
            let dict = slot.force_dictionary()?;
            if let Some(value) = dict.search_key(&key) {
                *slot = Thunk::normal(Value::Dictionary(dict.remove_key(&key)));
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Every remaining keyword as one dictionary; later entries win.
    pub(crate) fn rest_keywords(&mut self) -> Thunk {
        let mut dict = Dictionary::new();
        for k in self.keywords.drain(..) {
            dict = dict.insert_key(Key::String(k.name.into()), k.value);
        }
        let dict = Thunk::normal(Value::Dictionary(dict));
        if self.expanded_dicts.is_empty() {
            return dict;
        }
        let dicts: Vec<Thunk> = self.expanded_dicts.drain(..).collect();
        Thunk::papp(&MERGE, std::iter::once(dict).chain(dicts))
    }

    /// Fails if anything was left unbound.
    pub(crate) fn check_empty(mut self) -> Result<(), Error> {
        let mut positionals = self.positionals.len();
        if positionals == 0 && self.next_positional()?.is_some() {
            positionals = 1;
        }
        if positionals > 0 {
            return Err(Error::argument(format!("{positionals} positional arguments are left")));
        }

        let mut keywords = self.keywords.len();
        for d in &self.expanded_dicts {
            keywords += d.force_dictionary()?.size();
        }
        if keywords > 0 {
            return Err(Error::argument(format!("{keywords} keyword arguments are left")));
        }
        Ok(())
    }

    /// Combines the arguments of a partial application with a later call's.
    pub fn merge(self, other: Arguments) -> Arguments {
        let mut keywords = self.keywords;
        keywords.extend(other.keywords);
        let mut expanded_dicts = self.expanded_dicts;
        expanded_dicts.extend(other.expanded_dicts);

        let (positionals, expanded_list) = match self.expanded_list {
            None => {
                let mut ps = self.positionals;
                ps.extend(other.positionals);
                (ps, other.expanded_list)
            }
            Some(l) => {
                let l = if other.positionals.is_empty() {
                    l
                } else {
                    Thunk::papp(&APPEND, std::iter::once(l).chain(other.positionals))
                };
                let l = match other.expanded_list {
                    Some(o) => Thunk::papp(&MERGE, [l, o]),
                    None => l,
                };
                (self.positionals, Some(l))
            }
        };

        Arguments { positionals, expanded_list, keywords, expanded_dicts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(x: f64) -> Thunk {
        Thunk::normal(Value::Number(x))
    }

    fn list(xs: &[f64]) -> Thunk {
        Thunk::normal(Value::List(List::from_thunks(xs.iter().map(|x| n(*x)).collect())))
    }

    fn numbers(t: Thunk) -> Vec<f64> {
        t.force_list()
            .unwrap()
            .to_thunks()
            .unwrap()
            .iter()
            .map(|t| t.force_number().unwrap())
            .collect()
    }

    #[test]
    fn positionals_after_a_spread_are_joined_lazily() {
        let mut args = Arguments::new(
            vec![
                PositionalArgument::new(n(1.0), false),
                PositionalArgument::new(list(&[2.0, 3.0]), true),
                PositionalArgument::new(n(4.0), false),
                PositionalArgument::new(list(&[5.0]), true),
            ],
            vec![],
            vec![],
        );
        assert_eq!(args.next_positional().unwrap().unwrap().force_number().unwrap(), 1.0);
        assert_eq!(args.next_positional().unwrap().unwrap().force_number().unwrap(), 2.0);
        assert_eq!(numbers(args.rest_positionals()), vec![3.0, 4.0, 5.0]);
        assert!(args.check_empty().is_ok());
    }

    #[test]
    fn keywords_are_found_in_expanded_dictionaries_and_removed() {
        let dict = Dictionary::new()
            .insert_key(Key::String("x".into()), n(1.0))
            .insert_key(Key::String("y".into()), n(2.0));
        let mut args = Arguments::new(vec![], vec![], vec![Thunk::normal(Value::Dictionary(dict))]);

        assert_eq!(args.search_keyword("x").unwrap().unwrap().force_number().unwrap(), 1.0);
        assert!(args.search_keyword("x").unwrap().is_none());
        assert_eq!(
            args.clone().check_empty().unwrap_err().message(),
            "1 keyword arguments are left"
        );
        assert_eq!(args.rest_keywords().force_dictionary().unwrap().size(), 1);
    }

    #[test]
    fn leftover_spread_elements_are_reported() {
        let args = Arguments::new(vec![PositionalArgument::new(list(&[1.0]), true)], vec![], vec![]);
        assert_eq!(args.check_empty().unwrap_err().message(), "1 positional arguments are left");

        let args = Arguments::new(vec![PositionalArgument::new(list(&[]), true)], vec![], vec![]);
        assert!(args.check_empty().is_ok());
    }

    #[test]
    fn merged_arguments_append_onto_a_spread_list() {
        let first = Arguments::new(vec![PositionalArgument::new(list(&[1.0, 2.0]), true)], vec![], vec![]);
        let mut merged = first.merge(Arguments::positional([n(3.0)]));
        assert_eq!(numbers(merged.rest_positionals()), vec![1.0, 2.0, 3.0]);

        let mut merged = Arguments::positional([n(1.0)])
            .merge(Arguments::new(vec![PositionalArgument::new(list(&[2.0]), true)], vec![], vec![]));
        assert_eq!(numbers(merged.rest_positionals()), vec![1.0, 2.0]);
    }

    #[test]
    fn spreading_a_non_list_fails_when_the_rest_is_forced() {
        let mut args = Arguments::new(vec![PositionalArgument::new(n(5.0), true)], vec![], vec![]);
        let rest = args.rest_positionals();
        assert_eq!(rest.force_list().unwrap_err().kind(), &crate::error::ErrorKind::NotList);

        let mut args = Arguments::new(vec![PositionalArgument::new(list(&[1.0]), true)], vec![], vec![]);
        assert_eq!(numbers(args.rest_positionals()), vec![1.0]);
    }
}
