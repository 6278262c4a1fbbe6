use klisp::{
    environment::ScopeStack,
    error::ScriptError,
    parser::parse_str,
    run,
    runtime::Value,
    system::Console,
};

fn eval(source: &str) -> Result<Value, ScriptError> {
    run(source, &mut ScopeStack::standard(), &mut Console::new())
}

fn assert_prints(source: &str, expected: &str) {
    match eval(source) {
        Ok(value) => assert_eq!(value.to_string(), expected, "{}", source),
        Err(err) => panic!("{} failed: {}", source, err.report()),
    }
}

#[test]
fn math() {
    assert_prints("(+ )", "0");
    assert_prints("(* )", "1");
    assert_prints("(+ 3 4)", "7");
    assert_prints("(- 3 4)", "-1");
    assert_prints("(- 3)", "-3");
    assert_prints("(* 3 4)", "12");
    assert_prints("(/ 4 2)", "2");
    assert_prints("(/ 4)", "0.25");
}

#[test]
fn list() {
    assert_prints("(list 3 4)", "(3 4)");
    assert_prints("(list)", "()");
    assert_prints("(list 1 (list 2 (list)) (print))", "(1 (2 ()) nil)");
}

#[test]
fn lambdas() {
    assert_prints("(fun (x) x)", "(fun (x) ...)");
    assert_prints("((fun (x) x) 3)", "3");
    assert_prints("((fun (x y) (+ x y) (- x y)) 3 2)", "1");
}

#[test]
fn arity_mismatch_is_an_error() {
    for source in ["((fun (x) x) 3 3)", "((fun (x y) (+ x y)) 3)"] {
        assert!(
            matches!(eval(source), Err(ScriptError::WrongArity { .. })),
            "{}",
            source
        );
    }
}

#[test]
fn unbound_symbols_are_positioned_errors() {
    let err = eval("(list 1\n   ghost)").unwrap_err();
    assert!(matches!(&err, ScriptError::UnboundVariable { name, .. } if name == "ghost"));
    let span = err.span().expect("unbound variable errors carry a span");
    assert_eq!((span.start.line, span.start.column), (2, 4));
    assert!(err.report().contains("ghost"));
}

#[test]
fn arithmetic_type_errors() {
    for source in ["(+ 1 (list))", "(* 2 (print))", "(- (list 1))", "(/ 1 (fun x x))"] {
        let err = eval(source).unwrap_err();
        assert!(matches!(err, ScriptError::Type { .. }), "{}", source);
        assert_eq!(err.span(), None);
    }
}

#[test]
fn closures_snapshot_their_scope() {
    let mut env = ScopeStack::standard();
    let mut console = Console::new();
    run("(let x 1) (let get-x (fun () x))", &mut env, &mut console).unwrap();

    env.assign("x", Value::Number(5.0));
    assert_eq!(run("(get-x)", &mut env, &mut console).unwrap(), Value::Number(1.0));
    assert_eq!(run("x", &mut env, &mut console).unwrap(), Value::Number(5.0));
}

#[test]
fn closures_ignore_shadowing_in_the_caller() {
    assert_prints("(let x 1) (let f (fun () x)) ((fun (x) (f)) 2)", "1");
    assert_prints("(let x 1) (let f (fun () x)) ((fun (y) (let x y) (f)) 2)", "1");
}

#[test]
fn print_output_survives_a_failure() {
    let mut console = Console::new();
    let result = run(
        "(print 1 2) (print (list 3)) (1 2) (print 4)",
        &mut ScopeStack::standard(),
        &mut console,
    );
    assert!(matches!(result, Err(ScriptError::NotAProcedure { .. })));
    assert_eq!(console.output(), "1\n2\n(3)");
    assert!(console.fatal_error().is_some());
}

#[test]
fn syntax_errors_reach_the_sink() {
    let mut console = Console::new();
    let result = run("(print 1", &mut ScopeStack::standard(), &mut console);
    match result {
        Err(ScriptError::Syntax { at, .. }) => assert_eq!(at.offset, 8),
        other => panic!("expected syntax error, got {:?}", other),
    }
    assert!(console.lines().is_empty());
    assert!(matches!(console.fatal_error(), Some(ScriptError::Syntax { .. })));
}

#[test]
fn independent_environments() {
    let mut first = ScopeStack::standard();
    let mut second = ScopeStack::standard();
    let mut console = Console::new();
    run("(let x 1)", &mut first, &mut console).unwrap();
    run("(let x 2)", &mut second, &mut console).unwrap();
    assert_eq!(run("x", &mut first, &mut console).unwrap(), Value::Number(1.0));
    assert_eq!(run("x", &mut second, &mut console).unwrap(), Value::Number(2.0));
}

#[test]
fn rendered_tree_reparses_identically() {
    let large = "9".repeat(300);
    let programs = [
        "",
        large.as_str(),
        "42",
        "(fun (x y)\n\t(+ x y)\n  (- x y))",
        "((fun x x) 1) (list) ()",
        "  (print (list 1 (list 2 3)) -a b_c)  ",
        "(()) 12ab",
    ];
    for source in programs {
        let module = parse_str(source).unwrap();
        let reparsed = parse_str(&module.to_string()).unwrap();
        assert_eq!(reparsed, module, "{}", source);
    }

    // literals that do not fit a finite double never make it into a tree
    let huge = format!("(list {})", "1".repeat(400));
    assert!(matches!(parse_str(&huge), Err(ScriptError::Syntax { .. })));
}
