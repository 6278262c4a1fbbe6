use crate::environment::ScopeStack;
use crate::error::ScriptError;
use crate::parser::{Expr, ExprType, Module};
use crate::stdlib::{call_builtin, BuiltinOp};
use crate::system::OutputSink;
use log::{debug, trace};
use std::{
    fmt::{self, Debug, Display, Formatter},
    rc::Rc,
};

#[derive(Clone)]
pub enum Value {
    Number(f64),
    Nil,
    List(Vec<Value>),
    BuiltIn(BuiltinOp),
    Closure(Closure),
}

/// A `fun` value. `scope` is a private copy of the defining environment, so
/// rebinding a name outside after creation is not seen from inside, and the
/// other way round.
#[derive(Clone)]
pub struct Closure {
    pub params: Vec<String>,
    /// Never empty.
    pub body: Rc<[Expr]>,
    pub scope: ScopeStack,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Nil => "nil",
            Value::List(_) => "list",
            Value::BuiltIn(_) => "builtin op",
            Value::Closure(_) => "closure",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::BuiltIn(a), Value::BuiltIn(b)) => a == b,
            (Value::Closure(_), Value::Closure(_)) => false,
            _ => false,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_infinite() {
        let sign = if n < 0.0 { "-" } else { "" };
        format!("{}Infinity", sign)
    } else if n == 0.0 {
        // no "-0"
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Nil => write!(f, "nil"),
            Value::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Value::BuiltIn(op) => write!(f, "<builtin op: {}>", op),
            Value::Closure(c) => write!(f, "{}", c),
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Closure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "(fun ({}) ...)", self.params.join(" "))
    }
}

impl Debug for Closure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Evaluates every top-level form in order and yields the last value, or
/// `Nil` for an empty module. The first error stops the run and is reported
/// to `system` before being returned.
pub fn interpret(
    module: &Module,
    env: &mut ScopeStack,
    system: &mut dyn OutputSink,
) -> Result<Value, ScriptError> {
    let result = module
        .exprs
        .iter()
        .try_fold(Value::Nil, |_, expr| evaluate(expr, env, system));

    if let Err(err) = &result {
        debug!("run aborted: {}", err.report());
        system.fail(err.clone());
    }
    result
}

pub fn evaluate(
    expr: &Expr,
    env: &mut ScopeStack,
    system: &mut dyn OutputSink,
) -> Result<Value, ScriptError> {
    match &expr.expr_type {
        ExprType::Number { number } => Ok(Value::Number(*number)),
        ExprType::Symbol { symbol } => env.get(symbol, expr.span).cloned(),
        ExprType::List { list } => {
            let Some((head, rest)) = list.split_first() else {
                return Err(ScriptError::IllFormedExpression {
                    span: Some(expr.span),
                });
            };

            match evaluate(head, env, system)? {
                Value::Closure(closure) => apply(&closure, rest, env, system),
                Value::BuiltIn(op) => call_builtin(op, expr.span, rest, env, system),
                Value::Number(_) | Value::Nil | Value::List(_) => {
                    Err(ScriptError::NotAProcedure {
                        span: Some(head.span),
                    })
                }
            }
        }
    }
}

/// Calls `closure` with argument forms evaluated in the caller's `env`.
pub fn apply(
    closure: &Closure,
    args: &[Expr],
    env: &mut ScopeStack,
    system: &mut dyn OutputSink,
) -> Result<Value, ScriptError> {
    if closure.params.len() != args.len() {
        return Err(ScriptError::WrongArity {
            expected: closure.params.len().to_string(),
            got: args.len(),
        });
    }

    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        evaluated_args.push(evaluate(arg, env, system)?);
    }

    let mut call_env = closure.scope.clone();
    call_env.push();
    for (param, arg) in closure.params.iter().zip(evaluated_args) {
        call_env.assign(param, arg);
    }
    trace!("calling {} at depth {}", closure, call_env.depth());

    let mut result = Value::Nil;
    for expr in closure.body.iter() {
        result = evaluate(expr, &mut call_env, system)?;
    }
    call_env.pop();

    Ok(result)
}
