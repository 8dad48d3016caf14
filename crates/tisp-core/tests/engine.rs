use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tisp_core::natives::MERGE;
use tisp_core::{Arguments, ErrorKind, Function, List, Location, Signature, Thunk, Value};

fn number(n: f64) -> Thunk {
    Thunk::normal(Value::Number(n))
}

#[test]
fn concurrent_forcers_share_one_evaluation() {
    let runs = Arc::new(AtomicUsize::new(0));
    let square = {
        let runs = runs.clone();
        Function::new("square", Signature::positional(&["x"], vec![], None), move |ts| {
            runs.fetch_add(1, Ordering::SeqCst);
            let x = ts[0].force_number()?;
            Ok(Value::Number(x * x).into())
        })
    };
    let t = Thunk::papp(&Thunk::normal(Value::Function(square)), [number(12.0)]);

    let results: Vec<f64> = thread::scope(|s| {
        let workers: Vec<_> = (0..32).map(|_| s.spawn(|| t.force_number().unwrap())).collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(runs.load(Ordering::SeqCst), 1);
    assert_eq!(results, vec![144.0; 32]);
}

#[test]
fn a_million_tail_calls_run_in_constant_space() {
    let loop_ = Thunk::vacant();
    let this = loop_.clone();
    let f = Function::new("loop", Signature::positional(&["n"], vec![], None), move |ts| {
        let n = ts[0].force_number()?;
        if n == 0.0 {
            return Ok(Value::Bool(true).into());
        }
        Ok(Thunk::papp(&this, [number(n - 1.0)]).into())
    });
    loop_.fill(Thunk::normal(Value::Function(f)));

    let t = Thunk::papp(&loop_, [number(1_000_000.0)]);
    assert!(t.force_bool().unwrap());
}

#[test]
fn errors_collect_every_call_site_they_pass() {
    let fail = Function::new("fail", Signature::default(), |_| {
        Err(tisp_core::Error::value("boom"))
    });
    let inner = Thunk::app_at(
        Thunk::normal(Value::Function(fail)),
        Arguments::default(),
        Location::new("inner", "a.tisp", 2, 3),
    );
    let forward = Function::new("forward", Signature::positional(&["x"], vec![], None), |ts| {
        Ok(ts[0].try_force()?.into())
    });
    let outer = Thunk::app_at(
        Thunk::normal(Value::Function(forward)),
        Arguments::positional([inner]),
        Location::new("outer", "a.tisp", 5, 1),
    );

    let e = outer.try_force().unwrap_err();
    assert_eq!(e.kind(), &ErrorKind::Value);
    let sites: Vec<_> = e.chain().map(|l| l.name.as_str()).collect();
    assert_eq!(sites, vec!["inner", "outer"]);
}

#[test]
fn merged_lists_force_their_sources_one_cell_at_a_time() {
    let steps = Arc::new(AtomicUsize::new(0));
    let naturals = Thunk::vacant();
    let producer = {
        let steps = steps.clone();
        let this = naturals.clone();
        Function::new("naturals", Signature::positional(&["n"], vec![], None), move |ts| {
            steps.fetch_add(1, Ordering::SeqCst);
            let n = ts[0].force_number()?;
            let rest = Thunk::papp(&this, [number(n + 1.0)]);
            Ok(Value::List(List::cons(number(n), rest)).into())
        })
    };
    naturals.fill(Thunk::normal(Value::Function(producer)));

    let other = Thunk::normal(Value::List(List::from_values(vec![Value::Number(-1.0)])));
    let merged = Thunk::papp(&MERGE, [Thunk::papp(&naturals, [number(0.0)]), other]);

    let mut xs = merged.force_list().unwrap().iter();
    for k in 0..5 {
        let x = xs.next().unwrap().unwrap().force_number().unwrap();
        assert_eq!(x, k as f64);
        assert!(steps.load(Ordering::SeqCst) <= k + 1);
    }
}

fn slow_child(runs: &Arc<AtomicUsize>) -> Thunk {
    let runs = runs.clone();
    Thunk::deferred(move || {
        runs.fetch_add(1, Ordering::SeqCst);
        thread::sleep(Duration::from_millis(10));
        Ok(Value::Number(9.0).into())
    })
}

fn tail_calling(child: &Thunk) -> Thunk {
    let child = child.clone();
    let f = Function::new("delegate", Signature::default(), move |_| Ok(child.clone().into()));
    Thunk::papp(&Thunk::normal(Value::Function(f)), [])
}

#[test]
fn a_spliced_child_is_still_forced_through_its_own_handle() {
    let runs = Arc::new(AtomicUsize::new(0));
    let child = slow_child(&runs);
    let parent = tail_calling(&child);

    assert_eq!(parent.force_number().unwrap(), 9.0);
    assert_eq!(child.force_number().unwrap(), 9.0);
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[test]
fn parent_and_child_forced_together_evaluate_the_child_once() {
    for _ in 0..50 {
        let runs = Arc::new(AtomicUsize::new(0));
        let child = slow_child(&runs);
        let parent = tail_calling(&child);

        let (a, b) = thread::scope(|s| {
            let a = s.spawn(|| parent.force_number().unwrap());
            let b = s.spawn(|| child.force_number().unwrap());
            (a.join().unwrap(), b.join().unwrap())
        });

        assert_eq!((a, b), (9.0, 9.0));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }
}

fn received(rx: Arc<Mutex<Receiver<f64>>>) -> Thunk {
    Thunk::deferred(move || {
        let next = rx.lock().unwrap().recv();
        match next {
            Ok(n) => Ok(Value::List(List::cons(number(n), received(rx.clone()))).into()),
            Err(_) => Ok(Value::List(List::Empty).into()),
        }
    })
}

#[test]
fn merging_a_list_produced_on_another_thread() {
    let (tx, rx) = mpsc::channel();
    let produced = received(Arc::new(Mutex::new(rx)));
    let tail = Thunk::normal(Value::List(List::from_values(vec![Value::Number(-1.0)])));
    let merged = Thunk::papp(&MERGE, [produced, tail]);

    let expected: Vec<f64> = (0..100i32).map(f64::from).chain([-1.0]).collect();
    let read = |t: &Thunk| -> Vec<f64> {
        t.force_list().unwrap().iter().map(|x| x.unwrap().force_number().unwrap()).collect()
    };

    let (first, second) = thread::scope(|s| {
        s.spawn(move || {
            for n in 0..100i32 {
                tx.send(f64::from(n)).unwrap();
                thread::sleep(Duration::from_micros(200));
            }
        });
        let first = s.spawn(|| read(&merged));
        let second = s.spawn(|| read(&merged));
        (first.join().unwrap(), second.join().unwrap())
    });

    assert_eq!(first, expected);
    assert_eq!(second, expected);
}
