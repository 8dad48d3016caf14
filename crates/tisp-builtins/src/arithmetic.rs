use tisp_core::{Error, Signature, Value};

use crate::{define, numbers, Table};

pub(crate) fn register(m: &mut Table) {
    // + : number... -> number
    define(m, "+", Signature::positional(&[], vec![], Some("nums")), |ts| {
        Ok(Value::Number(numbers(&ts[0])?.into_iter().sum()).into())
    });
    // * : number... -> number
    define(m, "*", Signature::positional(&[], vec![], Some("nums")), |ts| {
        Ok(Value::Number(numbers(&ts[0])?.into_iter().product()).into())
    });

    fold(m, "-", "minuend", "subtrahends", |a, b| a - b);
    fold(m, "/", "dividend", "divisors", |a, b| a / b);
    fold(m, "//", "dividend", "divisors", |a, b| (a / b).floor());

    binary(m, "mod", ["dividend", "divisor"], |a, b| a % b);
    binary(m, "**", ["base", "exponent"], f64::powf);

    // isInt : number -> bool
    define(m, "isInt", Signature::positional(&["number"], vec![], None), |ts| {
        Ok(Value::Bool(ts[0].force_number()?.fract() == 0.0).into())
    });
}

/// Left fold over at least two numbers.
fn fold(m: &mut Table, name: &'static str, first: &str, rest: &str, op: fn(f64, f64) -> f64) {
    define(m, name, Signature::positional(&[first], vec![], Some(rest)), move |ts| {
        let init = ts[0].force_number()?;
        let ns = numbers(&ts[1])?;
        if ns.is_empty() {
            return Err(Error::argument(format!("{name} needs at least 2 arguments")));
        }
        Ok(Value::Number(ns.into_iter().fold(init, op)).into())
    });
}

fn binary(m: &mut Table, name: &'static str, params: [&str; 2], op: fn(f64, f64) -> f64) {
    define(m, name, Signature::positional(&params, vec![], None), move |ts| {
        Ok(Value::Number(op(ts[0].force_number()?, ts[1].force_number()?)).into())
    });
}
