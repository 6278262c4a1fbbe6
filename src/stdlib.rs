use crate::environment::ScopeStack;
use crate::error::{ScriptError, Span};
use crate::parser::{Expr, ExprType};
use crate::runtime::{evaluate, Closure, Value};
use crate::system::OutputSink;
use log::trace;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

/// Tags of the primitive operators. Dispatch happens on the tag; there are
/// no function pointers behind them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinOp {
    Print,
    Let,
    Fun,
    List,
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl BuiltinOp {
    pub const ALL: [BuiltinOp; 8] = [
        BuiltinOp::Print,
        BuiltinOp::Let,
        BuiltinOp::Fun,
        BuiltinOp::List,
        BuiltinOp::Add,
        BuiltinOp::Subtract,
        BuiltinOp::Multiply,
        BuiltinOp::Divide,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BuiltinOp::Print => "print",
            BuiltinOp::Let => "let",
            BuiltinOp::Fun => "fun",
            BuiltinOp::List => "list",
            BuiltinOp::Add => "+",
            BuiltinOp::Subtract => "-",
            BuiltinOp::Multiply => "*",
            BuiltinOp::Divide => "/",
        }
    }

    pub fn from_name(name: &str) -> Option<BuiltinOp> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl Display for BuiltinOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Runs a built-in on its unevaluated argument forms. `span` is the span of
/// the whole application form.
pub fn call_builtin(
    op: BuiltinOp,
    span: Span,
    args: &[Expr],
    env: &mut ScopeStack,
    system: &mut dyn OutputSink,
) -> Result<Value, ScriptError> {
    trace!("builtin {} with {} argument forms", op, args.len());

    match op {
        BuiltinOp::Let => define(span, args, env, system),
        BuiltinOp::Fun => lambda(span, args, env),
        BuiltinOp::List => Ok(Value::List(evaluate_all(args, env, system)?)),
        BuiltinOp::Print => {
            let strings = evaluate_all(args, env, system)?
                .iter()
                .map(|value| value.to_string())
                .collect();
            system.log(strings);
            Ok(Value::Nil)
        }
        BuiltinOp::Add => {
            let nums = expect_numbers(evaluate_all(args, env, system)?)?;
            Ok(Value::Number(nums.iter().fold(0.0, |acc, n| acc + n)))
        }
        BuiltinOp::Multiply => {
            let nums = expect_numbers(evaluate_all(args, env, system)?)?;
            Ok(Value::Number(nums.iter().fold(1.0, |acc, n| acc * n)))
        }
        BuiltinOp::Subtract => {
            let nums = expect_numbers(evaluate_all(args, env, system)?)?;
            match nums.as_slice() {
                [] => Err(at_least_one(0)),
                [n] => Ok(Value::Number(-n)),
                [first, rest @ ..] => Ok(Value::Number(rest.iter().fold(*first, |acc, n| acc - n))),
            }
        }
        BuiltinOp::Divide => {
            let nums = expect_numbers(evaluate_all(args, env, system)?)?;
            match nums.as_slice() {
                [] => Err(at_least_one(0)),
                [n] => Ok(Value::Number(1.0 / n)),
                [first, rest @ ..] => Ok(Value::Number(rest.iter().fold(*first, |acc, n| acc / n))),
            }
        }
    }
}

fn at_least_one(got: usize) -> ScriptError {
    ScriptError::WrongArity {
        expected: "at least 1".to_string(),
        got,
    }
}

fn evaluate_all(
    args: &[Expr],
    env: &mut ScopeStack,
    system: &mut dyn OutputSink,
) -> Result<Vec<Value>, ScriptError> {
    args.iter().map(|arg| evaluate(arg, env, system)).collect()
}

/// Every argument is checked before any arithmetic happens.
fn expect_numbers(values: Vec<Value>) -> Result<Vec<f64>, ScriptError> {
    values
        .into_iter()
        .map(|value| match value {
            Value::Number(n) => Ok(n),
            other => Err(ScriptError::Type {
                got: other.type_name().to_string(),
            }),
        })
        .collect()
}

/// `(let name value)`: declares `name` in the caller's top frame.
fn define(
    span: Span,
    args: &[Expr],
    env: &mut ScopeStack,
    system: &mut dyn OutputSink,
) -> Result<Value, ScriptError> {
    let [name, value] = args else {
        return Err(ScriptError::IllFormedSpecialForm {
            form: BuiltinOp::Let.name().to_string(),
            span: Some(span),
        });
    };

    let ExprType::Symbol { symbol } = &name.expr_type else {
        return Err(ScriptError::IllFormedSpecialForm {
            form: BuiltinOp::Let.name().to_string(),
            span: Some(name.span),
        });
    };

    let value = evaluate(value, env, system)?;
    env.declare(symbol, value)?;
    Ok(Value::Nil)
}

/// `(fun params body...)`: neither the parameter spec nor the body is
/// evaluated here.
fn lambda(span: Span, args: &[Expr], env: &ScopeStack) -> Result<Value, ScriptError> {
    let [params, body @ ..] = args else {
        return Err(ScriptError::IllFormedSpecialForm {
            form: BuiltinOp::Fun.name().to_string(),
            span: Some(span),
        });
    };

    if body.is_empty() {
        return Err(ScriptError::IllFormedSpecialForm {
            form: BuiltinOp::Fun.name().to_string(),
            span: Some(span),
        });
    }

    Ok(Value::Closure(Closure {
        params: parameter_names(params)?,
        body: Rc::from(body),
        scope: env.snapshot(),
    }))
}

fn parameter_names(spec: &Expr) -> Result<Vec<String>, ScriptError> {
    match &spec.expr_type {
        ExprType::Symbol { symbol } => Ok(vec![symbol.clone()]),
        ExprType::List { list } => list
            .iter()
            .map(|param| match &param.expr_type {
                ExprType::Symbol { symbol } => Ok(symbol.clone()),
                _ => Err(ScriptError::IllFormedParameter {
                    message: "expected symbol".to_string(),
                    span: param.span,
                }),
            })
            .collect(),
        ExprType::Number { .. } => Err(ScriptError::IllFormedParameter {
            message: "identifier or identifier list expected".to_string(),
            span: spec.span,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_str;
    use crate::runtime::interpret;
    use crate::system::Console;

    fn run(source: &str) -> Result<Value, ScriptError> {
        let module = parse_str(source)?;
        interpret(&module, &mut ScopeStack::standard(), &mut Console::new())
    }

    #[test]
    fn test_op_names_round_trip() {
        for op in BuiltinOp::ALL {
            assert_eq!(BuiltinOp::from_name(op.name()), Some(op));
        }
        assert_eq!(BuiltinOp::from_name("set"), None);
    }

    #[test]
    fn test_arithmetic() -> Result<(), ScriptError> {
        assert_eq!(run("(+)")?, Value::Number(0.0));
        assert_eq!(run("(*)")?, Value::Number(1.0));
        assert_eq!(run("(+ 1 2 3 4)")?, Value::Number(10.0));
        assert_eq!(run("(- 10 1 2)")?, Value::Number(7.0));
        assert_eq!(run("(/ 8 2 2)")?, Value::Number(2.0));
        assert_eq!(run("(* 2 (+ 1 2))")?, Value::Number(6.0));
        Ok(())
    }

    #[test]
    fn test_arithmetic_arity() {
        assert!(matches!(run("(-)"), Err(ScriptError::WrongArity { got: 0, .. })));
        assert!(matches!(run("(/)"), Err(ScriptError::WrongArity { got: 0, .. })));
    }

    #[test]
    fn test_arithmetic_rejects_non_numbers() {
        for source in ["(+ 1 (list))", "(* (print) 2)", "(- 1 fun)", "(/ (list 1) 2)"] {
            assert!(
                matches!(run(source), Err(ScriptError::Type { .. })),
                "{} should be a type error",
                source
            );
        }
    }

    #[test]
    fn test_print_logs_each_argument() -> Result<(), ScriptError> {
        let module = parse_str("(print 1 (list 2 3)) (print)")?;
        let mut console = Console::new();
        let result = interpret(&module, &mut ScopeStack::standard(), &mut console)?;
        assert_eq!(result, Value::Nil);
        assert_eq!(console.lines(), ["1", "(2 3)"]);
        Ok(())
    }

    #[test]
    fn test_let_declares_in_top_frame() -> Result<(), ScriptError> {
        assert_eq!(run("(let x 5) (+ x 1)")?, Value::Number(6.0));
        assert_eq!(run("(let x 5)")?, Value::Nil);
        assert!(matches!(
            run("(let x 1) (let x 2)"),
            Err(ScriptError::Redeclaration { name }) if name == "x"
        ));
        // a call frame may shadow an outer declaration
        assert_eq!(run("(let x 1) ((fun (y) (let x y) x) 7)")?, Value::Number(7.0));
        Ok(())
    }

    #[test]
    fn test_let_shape() {
        assert!(matches!(
            run("(let x)"),
            Err(ScriptError::IllFormedSpecialForm { .. })
        ));
        assert!(matches!(
            run("(let 1 2)"),
            Err(ScriptError::IllFormedSpecialForm { .. })
        ));
    }

    #[test]
    fn test_fun_parameter_specs() -> Result<(), ScriptError> {
        assert_eq!(run("(fun x x)")?.to_string(), "(fun (x) ...)");
        assert_eq!(run("(fun () 1)")?.to_string(), "(fun () ...)");
        assert_eq!(run("((fun x (* x 2)) 4)")?, Value::Number(8.0));

        match run("(fun (x 1) x)") {
            Err(ScriptError::IllFormedParameter { span, .. }) => assert_eq!(span.start.column, 9),
            other => panic!("expected parameter error, got {:?}", other),
        }
        assert!(matches!(
            run("(fun 3 x)"),
            Err(ScriptError::IllFormedParameter { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_fun_needs_a_body() {
        assert!(matches!(
            run("(fun (x))"),
            Err(ScriptError::IllFormedSpecialForm { .. })
        ));
        assert!(matches!(
            run("(fun)"),
            Err(ScriptError::IllFormedSpecialForm { .. })
        ));
    }

    #[test]
    fn test_fun_does_not_evaluate_body() -> Result<(), ScriptError> {
        // `missing` is only looked up when the closure is called
        assert!(matches!(run("(fun () missing)")?, Value::Closure(_)));
        Ok(())
    }
}
