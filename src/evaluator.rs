//! Tree-walking evaluator.
//!
//! [`eval`] reduces one [`Expression`] against an [`Environment`] chain. The head of
//! a form selects its behavior:
//!
//! | head              | behavior                                              |
//! |-------------------|-------------------------------------------------------|
//! | binary operator   | evaluate both operands, apply the per-type table      |
//! | keyword           | special form (`define`, `lambda`, `map`, ...)         |
//! | `if`              | evaluate the condition, continue with one branch      |
//! | symbol            | call the closure bound to it                          |
//! | anything else     | sequence: evaluate all, collect non-void results      |
//!
//! `if` branches and closure bodies do not recurse: the evaluator loop replaces its
//! current expression (and, for calls, its environment) and goes round again.
//! Operands, sequence elements and the bodies run by `map`/`filter`/`reduce` use
//! host recursion, which grows the stack on demand (see `stack`).

use crate::Error;
use crate::ast::Expression;
use crate::builtinops::{Arity, BinaryOp, Keyword, apply_binary_op};
use std::io::Write;
use std::rc::Rc;
use tracing::{debug, trace};

mod collections;
mod environment;
mod stack;

pub(crate) use collections::{
    eval_filter, eval_length, eval_list, eval_map, eval_range, eval_reduce,
};
pub use environment::{Environment, create_global_env};
use stack::ensure_sufficient_stack;

/// What the evaluation loop runs next
enum Tail {
    /// An `if` branch
    Expr(Expression),
    /// A closure body, shared with the closure value
    Body(Rc<[Expression]>),
}

/// Next step of the evaluation loop
enum Trampoline {
    /// Evaluation finished with this value
    Return(Expression),
    /// Continue with `tail` in `env` instead of recursing
    Continue { tail: Tail, env: Rc<Environment> },
}

/// Evaluate an expression (public API)
pub fn eval(expr: &Expression, env: &Rc<Environment>) -> Result<Expression, Error> {
    ensure_sufficient_stack(|| {
        let step = eval_step(expr, env)?;
        run_trampoline(step)
    })
}

/// Run a closure body as a form in `env`
fn eval_body(body: &[Expression], env: &Rc<Environment>) -> Result<Expression, Error> {
    ensure_sufficient_stack(|| {
        let step = eval_form(body, env)?;
        run_trampoline(step)
    })
}

fn run_trampoline(mut step: Trampoline) -> Result<Expression, Error> {
    loop {
        let (tail, env) = match step {
            Trampoline::Return(value) => return Ok(value),
            Trampoline::Continue { tail, env } => (tail, env),
        };

        step = match &tail {
            Tail::Expr(expr) => eval_step(expr, &env)?,
            Tail::Body(body) => eval_form(body, &env)?,
        };
    }
}

/// One dispatch on the variant of `expr`
fn eval_step(expr: &Expression, env: &Rc<Environment>) -> Result<Trampoline, Error> {
    match expr {
        // Self-evaluating forms
        Expression::Integer(_)
        | Expression::Float(_)
        | Expression::String(_)
        | Expression::Bool(_)
        | Expression::ListValue(_) => Ok(Trampoline::Return(expr.clone())),

        // Closures are not values on their own
        Expression::Void | Expression::Closure { .. } => Ok(Trampoline::Return(Expression::Void)),

        Expression::Symbol(name) => eval_symbol(name, env).map(Trampoline::Return),

        Expression::Keyword(_) | Expression::BinaryOp(_) | Expression::If => Err(
            Error::TypeError(format!("'{expr}' is only valid at the head of a form")),
        ),

        Expression::List(elements) => eval_form(elements, env),
    }
}

/// Variable lookup, with the three reserved constants taking precedence
fn eval_symbol(name: &str, env: &Environment) -> Result<Expression, Error> {
    match name {
        "#t" => Ok(Expression::Bool(true)),
        "#f" => Ok(Expression::Bool(false)),
        "#nil" => Ok(Expression::Void),
        _ => env
            .get(name)
            .ok_or_else(|| Error::UnboundSymbol(name.to_owned())),
    }
}

/// Dispatch a form on its head element
fn eval_form(elements: &[Expression], env: &Rc<Environment>) -> Result<Trampoline, Error> {
    let Some((head, operands)) = elements.split_first() else {
        return Err(Error::TypeError("cannot evaluate an empty list".to_owned()));
    };

    match head {
        Expression::BinaryOp(op) => eval_binary_op(*op, operands, env).map(Trampoline::Return),
        Expression::Keyword(keyword) => {
            eval_special_form(*keyword, operands, env).map(Trampoline::Return)
        }
        Expression::If => eval_if(operands, env),
        Expression::Symbol(name) => eval_call(name, operands, env),
        _ => eval_sequence(elements, env).map(Trampoline::Return),
    }
}

fn eval_binary_op(
    op: BinaryOp,
    operands: &[Expression],
    env: &Rc<Environment>,
) -> Result<Expression, Error> {
    BinaryOp::ARITY.validate(op.symbol(), operands.len())?;
    let left = eval(&operands[0], env)?;
    let right = eval(&operands[1], env)?;
    apply_binary_op(op, left, right)
}

fn eval_special_form(
    keyword: Keyword,
    operands: &[Expression],
    env: &Rc<Environment>,
) -> Result<Expression, Error> {
    keyword.arity().validate(keyword.name(), operands.len())?;
    trace!(form = keyword.name(), "special form");
    let special_form = keyword.special_form();
    special_form(operands, env)
}

/// `(if cond then else)`: the chosen branch is handed back to the loop
fn eval_if(operands: &[Expression], env: &Rc<Environment>) -> Result<Trampoline, Error> {
    Arity::Exact(3).validate("if", operands.len())?;

    let branch = match eval(&operands[0], env)? {
        Expression::Bool(true) => &operands[1],
        Expression::Bool(false) => &operands[2],
        other => {
            return Err(Error::TypeError(format!(
                "if condition must be a bool, got {} {other}",
                other.type_name()
            )));
        }
    };

    trace!(branch = %branch, "if branch");
    Ok(Trampoline::Continue {
        tail: Tail::Expr(branch.clone()),
        env: Rc::clone(env),
    })
}

/// Call the closure bound to `name`. Arguments are evaluated in the caller's
/// environment and bound in a new frame extending it; the body then runs in the
/// evaluator loop.
fn eval_call(
    name: &str,
    args: &[Expression],
    env: &Rc<Environment>,
) -> Result<Trampoline, Error> {
    let (params, body) = match env.get(name) {
        Some(Expression::Closure { params, body }) => (params, body),
        Some(other) => {
            return Err(Error::NotCallable(format!(
                "'{name}' is bound to a {}",
                other.type_name()
            )));
        }
        None => return Err(Error::UnboundSymbol(name.to_owned())),
    };

    let frame = bind_arguments(name, &params, args, env)?;
    trace!(function = name, "tail call");
    Ok(Trampoline::Continue {
        tail: Tail::Body(body),
        env: Rc::new(frame),
    })
}

/// Evaluate `args` in `env` and bind them to `params` in a fresh child frame
fn bind_arguments(
    name: &str,
    params: &[String],
    args: &[Expression],
    env: &Rc<Environment>,
) -> Result<Environment, Error> {
    if params.len() != args.len() {
        return Err(Error::arity_error(name, params.len(), args.len()));
    }

    let frame = Environment::extend(env);
    for (param, arg) in params.iter().zip(args) {
        let value = eval(arg, env)?;
        frame.set(param.as_str(), value);
    }
    Ok(frame)
}

/// Run a closure body with already evaluated arguments. Used by the collection
/// forms, which recurse rather than trampoline.
pub(crate) fn apply_closure(
    params: &[String],
    body: &[Expression],
    args: Vec<Expression>,
    env: &Rc<Environment>,
) -> Result<Expression, Error> {
    let frame = Rc::new(Environment::extend(env));
    for (param, arg) in params.iter().zip(args) {
        frame.set(param.as_str(), arg);
    }
    eval_body(body, &frame)
}

/// Evaluate every element in order, dropping void results
fn eval_sequence(elements: &[Expression], env: &Rc<Environment>) -> Result<Expression, Error> {
    let mut results = Vec::with_capacity(elements.len());
    for element in elements {
        let value = eval(element, env)?;
        if !value.is_void() {
            results.push(value);
        }
    }
    Ok(Expression::List(results))
}

/// Evaluate define special form
pub(crate) fn eval_define(
    args: &[Expression],
    env: &Rc<Environment>,
) -> Result<Expression, Error> {
    match args {
        [Expression::Symbol(name), expr] => {
            let value = eval(expr, env)?;
            debug!(name = name.as_str(), value = %value, "define");
            env.set(name.as_str(), value);
            Ok(Expression::Void)
        }
        [other, _] => Err(Error::TypeError(format!(
            "define requires a symbol, got {} {other}",
            other.type_name()
        ))),
        _ => Err(Error::arity_error("define", 2, args.len())),
    }
}

/// Evaluate lambda special form
pub(crate) fn eval_lambda(
    args: &[Expression],
    _env: &Rc<Environment>,
) -> Result<Expression, Error> {
    match args {
        [Expression::List(param_list), Expression::List(body)] => {
            let params = param_list
                .iter()
                .map(|param| match param {
                    Expression::Symbol(name) => Ok(name.clone()),
                    other => Err(Error::TypeError(format!(
                        "lambda parameters must be symbols, got {} {other}",
                        other.type_name()
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()?;

            debug!(?params, "closure created");
            Ok(Expression::Closure {
                params: params.into(),
                body: body.as_slice().into(),
            })
        }
        [Expression::List(_), other] => Err(Error::TypeError(format!(
            "lambda body must be a list, got {} {other}",
            other.type_name()
        ))),
        [_, _] => Err(Error::TypeError(
            "lambda parameters must be a list".to_owned(),
        )),
        _ => Err(Error::arity_error("lambda", 2, args.len())),
    }
}

/// Evaluate print special form: write the rendered value to stdout
pub(crate) fn eval_print(
    args: &[Expression],
    env: &Rc<Environment>,
) -> Result<Expression, Error> {
    match args {
        [expr] => {
            let value = eval(expr, env)?;
            write_value(&mut std::io::stdout().lock(), &value)?;
            Ok(Expression::Void)
        }
        _ => Err(Error::arity_error("print", 1, args.len())),
    }
}

/// Write `value` and a newline, reporting a closed or failing sink as an error
fn write_value(out: &mut impl Write, value: &Expression) -> Result<(), Error> {
    writeln!(out, "{value}").map_err(|e| Error::IoError(format!("print: {e}")))
}
