// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Bundled predicate-expression interpreter.
//!
//! A small PEG-parsed expression language sufficient for every documented
//! macro predicate shape: literals, the bound names (`$`, `_`, `_$`) and
//! user variables, property and index access, a `length` pseudo-property on
//! lists and strings, comparisons, arithmetic and boolean connectives. It
//! is deliberately NOT a general scripting language; callers with richer
//! needs plug in their own [ExprEvaluator].
//!

use crate::{ExprEvaluator, MatchError, Num, Value};
use std::{cell::RefCell, cmp::Ordering, collections::HashMap};
use tracing::trace;

/// Parsed expression variants...
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum P {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Var(String),
    Get(Box<P>, Key),
    Monadic(UOp, Box<P>),
    Dyadic(BOp, Box<P>, Box<P>),
}

/// Property/index accessors...
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Key {
    Name(String),
    Index(usize),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum UOp {
    Not,
    Neg,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum BOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

peg::parser! {
    pub(crate) grammar script() for str {
        rule _ = quiet! { [' ' | '\t' | '\r' | '\n']* }

        rule ident_ch() = ['a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '$']

        pub rule expression() -> P = _ x:or_expr() _ ![_] { x }

        rule or_expr() -> P
        = x:and_expr() y:(_ "||" _ z:and_expr() { z })* {
            y.into_iter().fold(x, |a, b| P::Dyadic(BOp::Or, Box::new(a), Box::new(b)))
        }

        rule and_expr() -> P
        = x:eq_expr() y:(_ "&&" _ z:eq_expr() { z })* {
            y.into_iter().fold(x, |a, b| P::Dyadic(BOp::And, Box::new(a), Box::new(b)))
        }

        rule eq_expr() -> P
        = x:rel_expr() _ op:$("==" / "!=") _ y:rel_expr() {
            let op = if op == "==" { BOp::Eq } else { BOp::Ne };
            P::Dyadic(op, Box::new(x), Box::new(y))
        }
        / rel_expr()

        rule rel_expr() -> P
        = x:add_expr() _ op:$("<=" / ">=" / "<" / ">") _ y:add_expr() {
            let op = match op {
                "<=" => BOp::Le,
                ">=" => BOp::Ge,
                "<" => BOp::Lt,
                _ => BOp::Gt,
            };
            P::Dyadic(op, Box::new(x), Box::new(y))
        }
        / add_expr()

        rule add_expr() -> P
        = x:mul_expr() y:(_ op:$(['+' | '-']) _ z:mul_expr() { (op, z) })* {
            y.into_iter().fold(x, |a, (op, b)| {
                let op = if op == "+" { BOp::Add } else { BOp::Sub };
                P::Dyadic(op, Box::new(a), Box::new(b))
            })
        }

        rule mul_expr() -> P
        = x:unary() y:(_ op:$(['*' | '/' | '%']) _ z:unary() { (op, z) })* {
            y.into_iter().fold(x, |a, (op, b)| {
                let op = match op {
                    "*" => BOp::Mul,
                    "/" => BOp::Div,
                    _ => BOp::Rem,
                };
                P::Dyadic(op, Box::new(a), Box::new(b))
            })
        }

        rule unary() -> P
        = "!" _ x:unary() { P::Monadic(UOp::Not, Box::new(x)) }
        / "-" _ x:unary() { P::Monadic(UOp::Neg, Box::new(x)) }
        / postfix()

        rule postfix() -> P
        = x:primary() keys:suffix()* {
            keys.into_iter().fold(x, |a, k| P::Get(Box::new(a), k))
        }

        rule suffix() -> Key
        = "." n:$(ident_ch()+) { Key::Name(n.to_string()) }
        / "[" _ i:$(['0'..='9']+) _ "]" {? i.parse().map(Key::Index).or(Err("index")) }
        / "[" _ "'" n:$([^ '\'']*) "'" _ "]" { Key::Name(n.to_string()) }

        rule primary() -> P
        = number()
        / string_lit()
        / "null" !ident_ch() { P::Null }
        / "true" !ident_ch() { P::Bool(true) }
        / "false" !ident_ch() { P::Bool(false) }
        / n:$(ident_ch()+) { P::Var(n.to_string()) }
        / "(" _ x:or_expr() _ ")" { x }

        rule number() -> P
        = n:$(['0'..='9']+ ("." ['0'..='9']+)?) {? n.parse().map(P::Num).or(Err("number")) }

        rule string_lit() -> P
        = "'" s:$([^ '\'']*) "'" { P::Str(s.to_string()) }
        / "\"" s:$([^ '"']*) "\"" { P::Str(s.to_string()) }
    }
}

impl P {
    pub(crate) fn eval(&self, env: &HashMap<String, Value>) -> Result<Value, MatchError> {
        match self {
            P::Null => Ok(Value::Null),
            P::Bool(x) => Ok(Value::Bool(*x)),
            P::Num(x) => Ok(Value::Num(Num::Float(*x))),
            P::Str(x) => Ok(Value::Str(x.clone())),
            P::Var(name) => env.get(name).cloned().ok_or_else(|| {
                MatchError::Eval(format!("unknown name '{name}'").into())
            }),
            P::Get(base, key) => {
                let base = base.eval(env)?;
                match key {
                    Key::Name(name) => match &base {
                        Value::Map(m) => Ok(m.get(name).cloned().unwrap_or(Value::Null)),
                        Value::List(xs) if name == "length" => {
                            Ok(Value::Num(Num::Int(xs.len() as i64)))
                        }
                        Value::Str(s) if name == "length" => {
                            Ok(Value::Num(Num::Int(s.chars().count() as i64)))
                        }
                        Value::Xml(x) => {
                            Ok(x.to_map().get(name).cloned().unwrap_or(Value::Null))
                        }
                        _ => Err(MatchError::Eval(
                            format!("cannot read '{name}' of {}", base.kind()).into(),
                        )),
                    },
                    Key::Index(i) => match &base {
                        Value::List(xs) => xs.get(*i),
                        _ => Err(MatchError::Eval(
                            format!("cannot index {} with [{i}]", base.kind()).into(),
                        )),
                    },
                }
            }
            P::Monadic(op, x) => {
                let zx = x.eval(env)?;
                match op {
                    UOp::Not => Ok(Value::Bool(!zx.is_truthy())),
                    UOp::Neg => match zx {
                        Value::Num(n) => Ok(Value::Num(Num::Float(-n.as_f64()))),
                        _ => Err(MatchError::Eval(
                            format!("expected a number, got {}", zx.kind()).into(),
                        )),
                    },
                }
            }
            P::Dyadic(BOp::And, x, y) => {
                // short-circuit...
                if !x.eval(env)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(y.eval(env)?.is_truthy()))
            }
            P::Dyadic(BOp::Or, x, y) => {
                if x.eval(env)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(y.eval(env)?.is_truthy()))
            }
            P::Dyadic(op, x, y) => {
                let zx = x.eval(env)?;
                let zy = y.eval(env)?;
                match op {
                    BOp::Eq => Ok(Value::Bool(zx == zy)),
                    BOp::Ne => Ok(Value::Bool(zx != zy)),
                    BOp::Lt | BOp::Le | BOp::Gt | BOp::Ge => {
                        let ord = compare(&zx, &zy)?;
                        let pass = match op {
                            BOp::Lt => ord == Ordering::Less,
                            BOp::Le => ord != Ordering::Greater,
                            BOp::Gt => ord == Ordering::Greater,
                            _ => ord != Ordering::Less,
                        };
                        Ok(Value::Bool(pass))
                    }
                    BOp::Add => match (&zx, &zy) {
                        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(format!("{a}{b}"))),
                        _ => arith(op, &zx, &zy),
                    },
                    _ => arith(op, &zx, &zy),
                }
            }
        }
    }
}

fn compare(a: &Value, b: &Value) -> Result<Ordering, MatchError> {
    match (a, b) {
        (Value::Num(x), Value::Num(y)) => x.compare(y).ok_or_else(|| {
            MatchError::Eval("numbers are incomparable".into())
        }),
        (Value::Str(x), Value::Str(y)) => Ok(x.cmp(y)),
        _ => Err(MatchError::Eval(
            format!("cannot compare {} with {}", a.kind(), b.kind()).into(),
        )),
    }
}

fn arith(op: &BOp, a: &Value, b: &Value) -> Result<Value, MatchError> {
    let (Value::Num(x), Value::Num(y)) = (a, b) else {
        return Err(MatchError::Eval(
            format!("cannot apply arithmetic to {} and {}", a.kind(), b.kind()).into(),
        ));
    };
    let (x, y) = (x.as_f64(), y.as_f64());
    let z = match op {
        BOp::Add => x + y,
        BOp::Sub => x - y,
        BOp::Mul => x * y,
        BOp::Div => x / y,
        _ => x % y,
    };
    Ok(Value::Num(Num::Float(z)))
}

/// The shipped [ExprEvaluator]: parses with the PEG grammar above and
/// evaluates against an interior-mutable binding table.
#[derive(Default)]
pub struct ScriptEvaluator {
    env: RefCell<HashMap<String, Value>>,
}

impl ScriptEvaluator {
    /// Create an instance with no bindings.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ExprEvaluator for ScriptEvaluator {
    fn eval(&self, source: &str) -> Result<Value, MatchError> {
        trace!("eval '{source}'");
        let ast = script::expression(source).map_err(MatchError::Script)?;
        ast.eval(&self.env.borrow())
    }

    fn put(&self, name: &str, value: Value) {
        self.env.borrow_mut().insert(name.to_string(), value);
    }

    fn remove(&self, name: &str) {
        self.env.borrow_mut().remove(name);
    }
}
