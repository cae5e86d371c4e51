//! List-building and higher-order special forms: `list`, `map`, `filter`,
//! `reduce`, `length` and `range`.
//!
//! Elements are evaluated once more before being handed to a closure. For the
//! scalars produced by `list` and `range` that is a no-op.

use super::{Environment, apply_closure, eval};
use crate::Error;
use crate::ast::{Expression, IntegerType};
use std::rc::Rc;

/// A closure operand taking exactly `param_count` arguments
struct Callable {
    params: Rc<[String]>,
    body: Rc<[Expression]>,
}

impl Callable {
    fn call(&self, args: Vec<Expression>, env: &Rc<Environment>) -> Result<Expression, Error> {
        apply_closure(&self.params, &self.body, args, env)
    }
}

fn callable_operand(
    form: &str,
    expr: &Expression,
    param_count: usize,
    env: &Rc<Environment>,
) -> Result<Callable, Error> {
    match eval(expr, env)? {
        Expression::Closure { params, body } if params.len() == param_count => {
            Ok(Callable { params, body })
        }
        Expression::Closure { params, .. } => Err(Error::arity_error(
            format!("{form} function"),
            param_count,
            params.len(),
        )),
        other => Err(Error::NotCallable(format!(
            "{form} expects a function, got {} {other}",
            other.type_name()
        ))),
    }
}

fn list_operand(
    form: &str,
    expr: &Expression,
    env: &Rc<Environment>,
) -> Result<Rc<[Expression]>, Error> {
    match eval(expr, env)? {
        Expression::ListValue(items) => Ok(items),
        other => Err(Error::TypeError(format!(
            "{form} expects a list-value, got {} {other}",
            other.type_name()
        ))),
    }
}

fn integer_operand(
    form: &str,
    expr: &Expression,
    env: &Rc<Environment>,
) -> Result<IntegerType, Error> {
    match eval(expr, env)? {
        Expression::Integer(n) => Ok(n),
        other => Err(Error::TypeError(format!(
            "{form} expects integer bounds, got {} {other}",
            other.type_name()
        ))),
    }
}

/// `(list e...)`
pub(crate) fn eval_list(args: &[Expression], env: &Rc<Environment>) -> Result<Expression, Error> {
    let items = args
        .iter()
        .map(|arg| eval(arg, env))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expression::ListValue(items.into()))
}

/// `(map fn lst)`
pub(crate) fn eval_map(args: &[Expression], env: &Rc<Environment>) -> Result<Expression, Error> {
    let function = callable_operand("map", &args[0], 1, env)?;
    let items = list_operand("map", &args[1], env)?;

    let mapped = items
        .iter()
        .map(|item| {
            let arg = eval(item, env)?;
            function.call(vec![arg], env)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Expression::ListValue(mapped.into()))
}

/// `(filter fn lst)`: keeps the stored elements whose predicate is `#t`
pub(crate) fn eval_filter(args: &[Expression], env: &Rc<Environment>) -> Result<Expression, Error> {
    let predicate = callable_operand("filter", &args[0], 1, env)?;
    let items = list_operand("filter", &args[1], env)?;

    let mut kept = Vec::with_capacity(items.len());
    for item in items.iter() {
        let arg = eval(item, env)?;
        match predicate.call(vec![arg], env)? {
            Expression::Bool(true) => kept.push(item.clone()),
            Expression::Bool(false) => {}
            other => {
                return Err(Error::TypeError(format!(
                    "filter function must return a bool, got {} {other}",
                    other.type_name()
                )));
            }
        }
    }
    Ok(Expression::ListValue(kept.into()))
}

/// `(reduce fn lst)`: left fold seeded with the first element
pub(crate) fn eval_reduce(args: &[Expression], env: &Rc<Environment>) -> Result<Expression, Error> {
    let function = callable_operand("reduce", &args[0], 2, env)?;
    let items = list_operand("reduce", &args[1], env)?;

    let mut items = items.iter();
    let first = items
        .next()
        .ok_or_else(|| Error::EmptyCollection("reduce over an empty list".to_owned()))?;

    let mut acc = eval(first, env)?;
    for item in items {
        let arg = eval(item, env)?;
        acc = function.call(vec![acc, arg], env)?;
    }
    Ok(acc)
}

/// `(length lst)`: accepts list data and sequencing results alike
pub(crate) fn eval_length(args: &[Expression], env: &Rc<Environment>) -> Result<Expression, Error> {
    match eval(&args[0], env)? {
        Expression::ListValue(items) => Ok(Expression::Integer(items.len() as IntegerType)),
        Expression::List(items) => Ok(Expression::Integer(items.len() as IntegerType)),
        other => Err(Error::TypeError(format!(
            "length expects a list, got {} {other}",
            other.type_name()
        ))),
    }
}

/// `(range start end step)`: half-open, stepping toward `end`
pub(crate) fn eval_range(args: &[Expression], env: &Rc<Environment>) -> Result<Expression, Error> {
    let start = integer_operand("range", &args[0], env)?;
    let end = integer_operand("range", &args[1], env)?;
    let step = integer_operand("range", &args[2], env)?;

    if step == 0 {
        return Err(Error::ArithmeticError(
            "range step must not be zero".to_owned(),
        ));
    }

    let mut items = Vec::new();
    let mut current = start;
    while (step > 0 && current < end) || (step < 0 && current > end) {
        items.push(Expression::Integer(current));
        match current.checked_add(step) {
            Some(next) => current = next,
            None => break,
        }
    }
    Ok(Expression::ListValue(items.into()))
}
