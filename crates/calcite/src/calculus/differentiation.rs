use itertools::Itertools;

use crate::{
    ast::{AssocOp, DyadicOp, Exp},
    eval::{EvalError, EvalResult, functions::float_function},
};

/// Symbolic derivative with respect to `var`. The result is not simplified;
/// callers usually want `.simplify()` on it before display.
pub fn derivative(exp: &Exp, var: &str) -> EvalResult<Exp> {
    use Exp::*;
    if !exp.depends_on_var(var) {
        return Ok(Exp::ZERO);
    }
    match exp {
        Num(..) => Ok(Exp::ZERO),
        Var { name } => Ok(if name == var { Exp::ONE } else { Exp::ZERO }),
        Dyadic {
            op: DyadicOp::Pow,
            left,
            right,
        } => {
            let left_depends = left.depends_on_var(var);
            let right_depends = right.depends_on_var(var);
            if !right_depends {
                let dleft = derivative(left, var)?;
                Ok((**right).clone() * left.as_ref().clone().pow((**right).clone() - Exp::ONE)
                    * dleft)
            } else if !left_depends {
                let dright = derivative(right, var)?;
                let lnleft = Exp::function("ln", vec![(**left).clone()]);
                Ok(lnleft * exp.clone() * dright)
            } else {
                let dleft = derivative(left, var)?;
                let dright = derivative(right, var)?;
                let lnleft = Exp::function("ln", vec![(**left).clone()]);
                Ok(left.as_ref().clone().pow((**right).clone() - Exp::ONE)
                    * ((**right).clone() * dleft + (**left).clone() * lnleft * dright))
            }
        }
        Pool {
            op: AssocOp::Add,
            terms,
        } => Ok(Pool {
            op: AssocOp::Add,
            terms: terms
                .iter()
                .map(|term| derivative(term, var))
                .try_collect()?,
        }),
        Pool {
            op: AssocOp::Mul,
            terms,
        } => product_rule(terms, var),
        Function { name, args } => chain_rule(name, args, var),
    }
}

fn product_rule(terms: &[Exp], var: &str) -> EvalResult<Exp> {
    let mut add_terms = Vec::with_capacity(terms.len());
    for (i, term) in terms.iter().enumerate() {
        let mut prod_terms = Vec::with_capacity(terms.len());
        for (j, other_term) in terms.iter().enumerate() {
            if i == j {
                prod_terms.push(derivative(term, var)?);
            } else {
                prod_terms.push(other_term.clone());
            }
        }

        add_terms.push(Exp::Pool {
            op: AssocOp::Mul,
            terms: prod_terms,
        });
    }

    Ok(Exp::Pool {
        op: AssocOp::Add,
        terms: add_terms,
    })
}

fn chain_rule(name: &str, args: &[Exp], var: &str) -> EvalResult<Exp> {
    if args.len() != 1 {
        return Err(EvalError::FunctionWrongArgCount {
            name: name.to_owned(),
            expected: 1,
            got: args.len(),
        });
    }

    let arg = &args[0];
    let darg = derivative(arg, var)?;
    let partial = partial_derivative(name, arg)?;
    Ok(partial * darg)
}

/// The derivative of a built-in function with respect to its argument.
fn partial_derivative(name: &str, arg: &Exp) -> EvalResult<Exp> {
    let u = arg.clone();
    Ok(match name {
        "sin" => Exp::function("cos", vec![u]),
        "cos" => -Exp::function("sin", vec![u]),
        "tan" => Exp::function("cos", vec![u]).pow(Exp::Num(-2.0)),
        "sinh" => Exp::function("cosh", vec![u]),
        "cosh" => Exp::function("sinh", vec![u]),
        "tanh" => Exp::function("cosh", vec![u]).pow(Exp::Num(-2.0)),
        "exp" => Exp::function("exp", vec![u]),
        "ln" | "log" => u.pow(Exp::NEGATIVE_ONE),
        "sqrt" => Exp::Num(0.5) * u.pow(Exp::Num(-0.5)),
        "asin" => (Exp::ONE - u.pow(Exp::Num(2.0))).pow(Exp::Num(-0.5)),
        "acos" => -(Exp::ONE - u.pow(Exp::Num(2.0))).pow(Exp::Num(-0.5)),
        "atan" => (Exp::ONE + u.pow(Exp::Num(2.0))).pow(Exp::NEGATIVE_ONE),
        other => {
            return Err(if float_function(other).is_some() {
                EvalError::NondifferentiableFunction {
                    name: other.to_owned(),
                }
            } else {
                EvalError::UnknownFunction {
                    name: other.to_owned(),
                }
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn diff(source: &str) -> String {
        let exp = Exp::from_str(source).unwrap();
        derivative(&exp, "x").unwrap().simplify().to_string()
    }

    #[test]
    fn power_rule() {
        assert_eq!(diff("x^2"), "2 * x");
        assert_eq!(diff("x^3"), "3 * x^2");
        assert_eq!(diff("2*x^2 + 3*x + 1"), "4 * x + 3");
    }

    #[test]
    fn constants_vanish() {
        assert_eq!(diff("42"), "0");
        assert_eq!(diff("y"), "0");
    }

    #[test]
    fn chain_rule_over_builtins() {
        assert_eq!(diff("sin(x)"), "cos(x)");
        assert_eq!(diff("cos(x)"), "-sin(x)");
        assert_eq!(diff("exp(x)"), "exp(x)");
        assert_eq!(diff("sin(x^2)"), "2 * cos(x^2) * x");
    }

    #[test]
    fn product_rule_expands() {
        let exp = Exp::from_str("x*sin(x)").unwrap();
        let dexp = derivative(&exp, "x").unwrap().simplify();
        // sin(x) + x * cos(x), evaluated to check the shape numerically
        let bindings = std::collections::HashMap::from([("x".to_owned(), 1.25_f64)]);
        let expected = 1.25_f64.cos() * 1.25 + 1.25_f64.sin();
        assert!((dexp.eval_num(&bindings).unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn unknown_function_fails() {
        let exp = Exp::from_str("frob(x)").unwrap();
        assert_eq!(
            derivative(&exp, "x"),
            Err(EvalError::UnknownFunction {
                name: "frob".to_owned()
            })
        );
    }
}
