use serde_json::{json, Value as Json};
use tisp_core::value::to_string;
use tisp_core::{ErrorKind, Thunk};
use tisp_ir::{load_json, LoadError, Module};

fn load(program: Json) -> Result<Module, LoadError> {
    load_json(&program.to_string())
}

fn num(n: f64) -> Json {
    json!({"node": "number", "value": n})
}

fn name(n: &str) -> Json {
    json!({"node": "name", "name": n})
}

fn local(i: usize) -> Json {
    json!({"node": "local", "index": i})
}

fn app(f: Json, args: Vec<Json>) -> Json {
    let positionals: Vec<Json> = args.into_iter().map(|a| json!({"value": a})).collect();
    json!({"node": "app", "function": f, "positionals": positionals})
}

fn first_output(m: &Module) -> Thunk {
    m.outputs()[0].thunk.clone()
}

#[test]
fn recursive_definitions_resolve_through_their_own_handle() {
    // fact n = if (n = 0) 1 (n * fact (n - 1))
    let body = app(
        name("if"),
        vec![
            app(name("="), vec![local(0), num(0.0)]),
            num(1.0),
            app(
                name("*"),
                vec![local(0), app(name("fact"), vec![app(name("-"), vec![local(0), num(1.0)])])],
            ),
        ],
    );
    let m = load(json!({
        "definitions": [{
            "kind": "function", "name": "fact",
            "signature": {"positional": {"requireds": ["n"]}},
            "body": body
        }],
        "outputs": [{"expr": app(name("fact"), vec![num(10.0)])}]
    }))
    .unwrap();
    assert_eq!(first_output(&m).force_number().unwrap(), 3628800.0);
}

#[test]
fn mutual_recursion_through_switches() {
    // even n = case n of 0 -> true; _ -> odd (n - 1), and odd symmetrically
    let parity = |base: bool, other: &str| {
        json!({
            "node": "switch",
            "value": local(0),
            "cases": [{"pattern": num(0.0), "value": {"node": "bool", "value": base}}],
            "default": app(name(other), vec![app(name("-"), vec![local(0), num(1.0)])])
        })
    };
    let function = |n: &str, body: Json| {
        json!({"kind": "function", "name": n,
               "signature": {"positional": {"requireds": ["n"]}}, "body": body})
    };
    let m = load(json!({
        "definitions": [function("even", parity(true, "odd")), function("odd", parity(false, "even"))],
        "outputs": [
            {"expr": app(name("even"), vec![num(100001.0)])},
            {"expr": app(name("odd"), vec![num(100001.0)])}
        ]
    }))
    .unwrap();
    assert!(!m.outputs()[0].thunk.force_bool().unwrap());
    assert!(m.outputs()[1].thunk.force_bool().unwrap());
}

#[test]
fn lets_and_keyword_optionals() {
    // greet name (greeting = "hello") = let both = list greeting name in both
    let m = load(json!({
        "definitions": [{
            "kind": "function", "name": "greet",
            "signature": {
                "positional": {"requireds": ["name"]},
                "keyword": {"optionals": [{"name": "greeting", "default": {"node": "string", "value": "hello"}}]}
            },
            "lets": [app(name("list"), vec![local(1), local(0)])],
            "body": local(2)
        }],
        "outputs": [
            {"expr": app(name("greet"), vec![json!({"node": "string", "value": "bob"})])},
            {"expr": {
                "node": "app", "function": name("greet"),
                "positionals": [{"value": {"node": "string", "value": "amy"}}],
                "keywords": [{"name": "greeting", "value": {"node": "string", "value": "hi"}}]
            }}
        ]
    }))
    .unwrap();
    let show = |i: usize| to_string(&m.outputs()[i].thunk.force()).unwrap();
    assert_eq!(show(0), "[\"hello\" \"bob\"]");
    assert_eq!(show(1), "[\"hi\" \"amy\"]");
}

#[test]
fn variables_alias_other_definitions() {
    let m = load(json!({
        "definitions": [
            {"kind": "variable", "name": "a", "expr": name("b")},
            {"kind": "variable", "name": "b", "expr": app(name("+"), vec![num(1.0), num(2.0)])}
        ],
        "outputs": [{"expr": name("a"), "expanded": false}]
    }))
    .unwrap();
    assert_eq!(first_output(&m).force_number().unwrap(), 3.0);
    assert_eq!(m.definition("b").unwrap().force_number().unwrap(), 3.0);
}

#[test]
fn locations_default_to_the_enclosing_definition() {
    let m = load(json!({
        "definitions": [{
            "kind": "variable", "name": "main",
            "expr": {
                "node": "app", "function": name("first"),
                "positionals": [{"value": app(name("list"), vec![])}],
                "location": {"file": "main.tisp", "line": 3, "column": 7}
            }
        }],
        "outputs": [{"expr": name("main")}]
    }))
    .unwrap();
    let e = first_output(&m).try_force().unwrap_err();
    assert_eq!(e.kind(), &ErrorKind::Value);
    assert_eq!(e.lines(), "    at main.tisp:3:7 in main\nValueError: list is empty\n");
}

#[test]
fn expanded_outputs_keep_their_flag() {
    let m = load(json!({
        "outputs": [{"expr": app(name("list"), vec![num(1.0), num(2.0)]), "expanded": true}]
    }))
    .unwrap();
    assert!(m.outputs()[0].expanded);
    assert_eq!(m.outputs()[0].thunk.force_list().unwrap().size().unwrap(), 2);
}

#[test]
fn loader_rejects_malformed_programs() {
    let e = load(json!({"outputs": [{"expr": name("nope")}]})).unwrap_err();
    assert!(matches!(e, LoadError::UnknownName { ref name, .. } if name == "nope"));

    let twice = json!({"kind": "variable", "name": "x", "expr": num(1.0)});
    let e = load(json!({"definitions": [twice.clone(), twice]})).unwrap_err();
    assert!(matches!(e, LoadError::DuplicateDefinition(ref n) if n == "x"));

    let e = load(json!({"definitions": [{
        "kind": "function", "name": "f",
        "signature": {"positional": {"requireds": ["x"]}},
        "body": local(1)
    }]}))
    .unwrap_err();
    assert!(matches!(e, LoadError::LocalOutOfRange { index: 1, locals: 1, .. }));

    let e = load(json!({"outputs": [{"expr": {"node": "switch", "value": num(1.0)}}]})).unwrap_err();
    assert!(matches!(e, LoadError::EmptySwitch(_)));

    let e = load(json!({"outputs": [{"expr": {
        "node": "switch", "value": num(1.0),
        "cases": [{"pattern": app(name("+"), vec![]), "value": num(1.0)}]
    }}]}))
    .unwrap_err();
    assert!(matches!(e, LoadError::InvalidPattern(_)));

    let e = load(json!({"definitions": [
        {"kind": "variable", "name": "p", "expr": name("q")},
        {"kind": "variable", "name": "q", "expr": name("p")}
    ]}))
    .unwrap_err();
    assert!(matches!(e, LoadError::CircularDefinition(_)));
}

#[test]
fn builtin_constants_can_be_patterns() {
    let m = load(json!({"outputs": [{"expr": {
        "node": "switch", "value": app(name("<"), vec![num(1.0), num(2.0)]),
        "cases": [
            {"pattern": name("true"), "value": {"node": "string", "value": "yes"}},
            {"pattern": name("false"), "value": {"node": "string", "value": "no"}}
        ]
    }}]}))
    .unwrap();
    assert_eq!(&*first_output(&m).force_string().unwrap(), "yes");
}
