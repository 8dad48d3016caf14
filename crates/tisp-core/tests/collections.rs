use std::collections::BTreeMap;

use proptest::prelude::*;

use tisp_core::natives::MERGE;
use tisp_core::{value, Dictionary, Key, List, Thunk, Value};

fn n(x: f64) -> Thunk {
    Thunk::normal(Value::Number(x))
}

#[test]
fn merging_dictionaries_lets_the_later_one_win() {
    let x1 = Dictionary::new().insert(&"x".into(), n(1.0)).unwrap();
    let x2 = Dictionary::new().insert(&"x".into(), n(2.0)).unwrap();
    let merged = Thunk::papp(
        &MERGE,
        [Thunk::normal(Value::Dictionary(x1)), Thunk::normal(Value::Dictionary(x2))],
    );
    let d = merged.force_dictionary().unwrap();
    assert_eq!(d.size(), 1);
    assert_eq!(d.search(&"x".into()).unwrap().unwrap().force_number().unwrap(), 2.0);
}

#[test]
fn list_and_dictionary_render_with_dumped_elements() {
    let d = Dictionary::new().insert(&"k".into(), Thunk::normal("v".into())).unwrap();
    let l = List::from_values(vec![Value::Number(1.0), Value::Dictionary(d)]);
    assert_eq!(value::to_string(&Value::List(l)).unwrap(), "[1 {\"k\" \"v\"}]");
}

proptest! {
    #[test]
    fn dictionary_enumerates_inserted_keys_in_ascending_order(
        entries in prop::collection::btree_map(any::<i32>(), any::<i32>(), 0..64)
    ) {
        let mut d = Dictionary::new();
        for (k, v) in &entries {
            d = d.insert(&Value::Number(*k as f64), n(*v as f64)).unwrap();
        }
        prop_assert_eq!(d.size(), entries.len());

        let got: Vec<(f64, f64)> = d
            .iter()
            .map(|(k, t)| match k {
                Key::Number(k) => (k.0, t.force_number().unwrap()),
                other => panic!("unexpected key {other:?}"),
            })
            .collect();
        let want: Vec<(f64, f64)> = entries.iter().map(|(k, v)| (*k as f64, *v as f64)).collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn string_keys_follow_byte_order(keys in prop::collection::vec("[a-z]{0,6}", 0..32)) {
        let mut d = Dictionary::new();
        let mut want = BTreeMap::new();
        for (i, k) in keys.iter().enumerate() {
            d = d.insert(&Value::from(k.as_str()), n(i as f64)).unwrap();
            want.insert(k.clone(), i as f64);
        }
        let pairs = d.to_list().to_thunks().unwrap();
        prop_assert_eq!(pairs.len(), want.len());
        for (pair, (k, v)) in pairs.iter().zip(want) {
            let pair = pair.force_list().unwrap();
            prop_assert_eq!(&*pair.index(1.0).unwrap().force_string().unwrap(), k.as_str());
            prop_assert_eq!(pair.index(2.0).unwrap().force_number().unwrap(), v);
        }
    }
}
