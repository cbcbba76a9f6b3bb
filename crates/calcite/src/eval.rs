use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::ast::{AssocOp, DyadicOp, Exp};
use crate::parse::ParseExpError;

pub mod functions;

#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    UndefinedVariable {
        name: String,
    },
    UnknownFunction {
        name: String,
    },
    FunctionWrongArgCount {
        name: String,
        expected: usize,
        got: usize,
    },
    NondifferentiableFunction {
        name: String,
    },
    DivisionByZero,
    DomainError {
        name: String,
        arg: f64,
    },
}

pub type EvalResult<T> = Result<T, EvalError>;

impl Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use EvalError::*;
        let s = match self {
            UndefinedVariable { name } => format!("variable {name} is not bound to a value"),
            UnknownFunction { name } => format!("unknown function {name}"),
            FunctionWrongArgCount {
                name,
                expected,
                got,
            } => format!(
                "wrong number of arguments for function {name}, expected {expected} but got {got}"
            ),
            NondifferentiableFunction { name } => {
                format!("no derivative is known for function {name}")
            }
            DivisionByZero => "division by zero".to_owned(),
            DomainError { name, arg } => {
                format!("{name} is undefined for argument {arg}")
            }
        };
        write!(f, "{s}")
    }
}

impl std::error::Error for EvalError {}

impl Exp {
    /// Numeric evaluation with every variable taken from `bindings`.
    ///
    /// Pure and deterministic; undefined operations surface as typed errors
    /// instead of quietly producing NaN.
    pub fn eval_num(&self, bindings: &HashMap<String, f64>) -> EvalResult<f64> {
        use Exp::*;
        match self {
            Num(val) => Ok(*val),
            Var { name } => {
                bindings
                    .get(name)
                    .copied()
                    .ok_or_else(|| EvalError::UndefinedVariable { name: name.clone() })
            }
            Dyadic {
                op: DyadicOp::Pow,
                left,
                right,
            } => {
                let base = left.eval_num(bindings)?;
                let exponent = right.eval_num(bindings)?;
                if base == 0.0 && exponent < 0.0 {
                    return Err(EvalError::DivisionByZero);
                }
                let val = base.powf(exponent);
                if val.is_nan() {
                    // e.g. a negative base raised to a fractional power
                    return Err(EvalError::DomainError {
                        name: "^".to_owned(),
                        arg: base,
                    });
                }
                Ok(val)
            }
            Pool {
                op: AssocOp::Add,
                terms,
            } => {
                let mut sum = 0.0;
                for term in terms {
                    sum += term.eval_num(bindings)?;
                }
                Ok(sum)
            }
            Pool {
                op: AssocOp::Mul,
                terms,
            } => {
                let mut product = 1.0;
                for term in terms {
                    product *= term.eval_num(bindings)?;
                }
                Ok(product)
            }
            Function { name, args } => functions::eval_function(name, args, bindings),
        }
    }
}

/// A parse or evaluation failure from the string-level entry points.
#[derive(Debug, Clone)]
pub enum ExprError {
    Parse(ParseExpError),
    Eval(EvalError),
}

impl Display for ExprError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "parse error: {err}"),
            Self::Eval(err) => write!(f, "evaluation error: {err}"),
        }
    }
}

impl std::error::Error for ExprError {}

impl From<ParseExpError> for ExprError {
    fn from(err: ParseExpError) -> Self {
        Self::Parse(err)
    }
}

impl From<EvalError> for ExprError {
    fn from(err: EvalError) -> Self {
        Self::Eval(err)
    }
}

pub fn evaluate(source: &str, bindings: &HashMap<String, f64>) -> Result<f64, ExprError> {
    let exp = Exp::from_str(source)?;
    Ok(exp.eval_num(bindings)?)
}

pub fn evaluate_single_var(source: &str, var: &str, x: f64) -> Result<f64, ExprError> {
    let bindings = HashMap::from([(var.to_owned(), x)]);
    evaluate(source, &bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str) -> EvalResult<f64> {
        let exp: Exp = source.parse().unwrap();
        exp.eval_num(&HashMap::new())
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval("2+2").unwrap(), 4.0);
        assert_eq!(eval("2*3^2").unwrap(), 18.0);
        assert_eq!(eval("4/8").unwrap(), 0.5);
        assert_eq!(eval("2^-1").unwrap(), 0.5);
    }

    #[test]
    fn bindings_are_substituted() {
        let bindings = HashMap::from([("x".to_owned(), 3.0), ("y".to_owned(), 2.0)]);
        assert_eq!(evaluate("2x + y", &bindings).unwrap(), 8.0);
        assert_eq!(evaluate_single_var("x^2", "x", 4.0).unwrap(), 16.0);
    }

    #[test]
    fn missing_binding_is_an_error() {
        assert_eq!(
            eval("x + 1"),
            Err(EvalError::UndefinedVariable {
                name: "x".to_owned()
            })
        );
    }

    #[test]
    fn division_by_zero() {
        assert_eq!(eval("1/0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("0^-2"), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn domain_errors() {
        assert!(matches!(
            eval("sqrt(0-4)"),
            Err(EvalError::DomainError { .. })
        ));
        assert!(matches!(eval("ln(0)"), Err(EvalError::DomainError { .. })));
    }

    #[test]
    fn functions_evaluate() {
        assert!((eval("sin(0)").unwrap()).abs() < 1e-12);
        assert!((eval("cos(0)").unwrap() - 1.0).abs() < 1e-12);
        assert!((eval("exp(1)").unwrap() - std::f64::consts::E).abs() < 1e-12);
    }

    #[test]
    fn unknown_function() {
        assert_eq!(
            eval("frob(2)"),
            Err(EvalError::UnknownFunction {
                name: "frob".to_owned()
            })
        );
    }

    #[test]
    fn evaluation_is_idempotent() {
        let first = eval("2*3^2").unwrap();
        let second = eval("2*3^2").unwrap();
        assert_eq!(first, second);
    }
}
