use std::collections::HashMap;

use crate::ast::Exp;

use super::{EvalError, EvalResult};

/// A built-in single-argument float function with its domain guard.
#[derive(Clone, Copy)]
pub struct FloatFunction {
    pub name: &'static str,
    pub body: fn(f64) -> f64,
    pub domain: fn(f64) -> bool,
}

fn any(_: f64) -> bool {
    true
}

pub const FLOAT_FUNCTIONS: [FloatFunction; 15] = [
    FloatFunction {
        name: "sin",
        body: f64::sin,
        domain: any,
    },
    FloatFunction {
        name: "cos",
        body: f64::cos,
        domain: any,
    },
    FloatFunction {
        name: "tan",
        body: f64::tan,
        domain: any,
    },
    FloatFunction {
        name: "asin",
        body: f64::asin,
        domain: |x| (-1.0..=1.0).contains(&x),
    },
    FloatFunction {
        name: "acos",
        body: f64::acos,
        domain: |x| (-1.0..=1.0).contains(&x),
    },
    FloatFunction {
        name: "atan",
        body: f64::atan,
        domain: any,
    },
    FloatFunction {
        name: "sinh",
        body: f64::sinh,
        domain: any,
    },
    FloatFunction {
        name: "cosh",
        body: f64::cosh,
        domain: any,
    },
    FloatFunction {
        name: "tanh",
        body: f64::tanh,
        domain: any,
    },
    FloatFunction {
        name: "exp",
        body: f64::exp,
        domain: any,
    },
    FloatFunction {
        name: "ln",
        body: f64::ln,
        domain: |x| x > 0.0,
    },
    // log is natural log
    FloatFunction {
        name: "log",
        body: f64::ln,
        domain: |x| x > 0.0,
    },
    FloatFunction {
        name: "sqrt",
        body: f64::sqrt,
        domain: |x| x >= 0.0,
    },
    FloatFunction {
        name: "abs",
        body: f64::abs,
        domain: any,
    },
    FloatFunction {
        name: "sign",
        body: f64::signum,
        domain: any,
    },
];

pub fn float_function(name: &str) -> Option<&'static FloatFunction> {
    FLOAT_FUNCTIONS.iter().find(|func| func.name == name)
}

pub fn function_names() -> impl Iterator<Item = &'static str> {
    FLOAT_FUNCTIONS.iter().map(|func| func.name)
}

pub(super) fn eval_function(
    name: &str,
    args: &[Exp],
    bindings: &HashMap<String, f64>,
) -> EvalResult<f64> {
    let Some(func) = float_function(name) else {
        return Err(EvalError::UnknownFunction {
            name: name.to_owned(),
        });
    };

    if args.len() != 1 {
        return Err(EvalError::FunctionWrongArgCount {
            name: name.to_owned(),
            expected: 1,
            got: args.len(),
        });
    }

    let x = args[0].eval_num(bindings)?;
    if !(func.domain)(x) {
        return Err(EvalError::DomainError {
            name: name.to_owned(),
            arg: x,
        });
    }

    let val = (func.body)(x);
    if val.is_nan() {
        return Err(EvalError::DomainError {
            name: name.to_owned(),
            arg: x,
        });
    }
    Ok(val)
}
