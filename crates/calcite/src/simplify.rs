use std::collections::HashMap;

use crate::ast::{AssocOp, DyadicOp, Exp};

pub fn flatten_pool(op: AssocOp, terms: Vec<Exp>) -> Vec<Exp> {
    terms
        .into_iter()
        .flat_map(|term| match term {
            Exp::Pool {
                op: sub_op,
                terms: sub_terms,
            } if sub_op == op => sub_terms,
            _ => vec![term],
        })
        .collect()
}

impl Exp {
    /// Bottom-up algebraic cleanup: constant folding, like-term collection
    /// and identity elimination. Purely structural, needs no bindings.
    #[must_use]
    pub fn simplify(&self) -> Exp {
        let exp = self.map(|e| e.simplify());
        match exp {
            Exp::Pool { op, terms } => {
                let flattened = flatten_pool(op, terms);
                match op {
                    AssocOp::Add => add_fold(flattened),
                    AssocOp::Mul => mul_fold(flattened),
                }
            }
            Exp::Dyadic {
                op: DyadicOp::Pow,
                left,
                right,
            } => pow_fold(*left, *right),
            Exp::Function { name, args } => function_fold(name, args),
            other => other,
        }
    }
}

/// Splits a term into its leading numeric coefficient and the rest.
fn split_coefficient(term: Exp) -> (f64, Option<Exp>) {
    match term {
        Exp::Num(val) => (val, None),
        Exp::Pool {
            op: AssocOp::Mul,
            mut terms,
        } if terms.first().is_some_and(Exp::is_number) => {
            let coef = terms.remove(0).as_number().unwrap();
            let rest = if terms.len() == 1 {
                terms.pop().unwrap()
            } else {
                Exp::Pool {
                    op: AssocOp::Mul,
                    terms,
                }
            };
            (coef, Some(rest))
        }
        other => (1.0, Some(other)),
    }
}

fn with_coefficient(coef: f64, rest: Exp) -> Option<Exp> {
    if coef == 0.0 {
        return None;
    }
    if coef == 1.0 {
        return Some(rest);
    }
    Some(match rest {
        Exp::Pool {
            op: AssocOp::Mul,
            mut terms,
        } => {
            terms.insert(0, Exp::Num(coef));
            Exp::Pool {
                op: AssocOp::Mul,
                terms,
            }
        }
        other => Exp::Num(coef) * other,
    })
}

fn add_fold(terms: Vec<Exp>) -> Exp {
    let mut constant = 0.0;
    let mut collected: Vec<(Exp, f64)> = Vec::new();

    for term in terms {
        let (coef, rest) = split_coefficient(term);
        match rest {
            None => constant += coef,
            Some(rest) => {
                if let Some(entry) = collected.iter_mut().find(|(exp, _)| *exp == rest) {
                    entry.1 += coef;
                } else {
                    collected.push((rest, coef));
                }
            }
        }
    }

    let mut new_terms: Vec<Exp> = collected
        .into_iter()
        .filter_map(|(rest, coef)| with_coefficient(coef, rest))
        .collect();

    if constant != 0.0 || new_terms.is_empty() {
        new_terms.push(Exp::Num(constant));
    }

    if new_terms.len() == 1 {
        new_terms.pop().unwrap()
    } else {
        Exp::Pool {
            op: AssocOp::Add,
            terms: new_terms,
        }
    }
}

fn mul_fold(terms: Vec<Exp>) -> Exp {
    let mut constant = 1.0;
    let mut rest = Vec::new();

    for term in terms {
        match term {
            Exp::Num(val) => constant *= val,
            other => rest.push(other),
        }
    }

    if constant == 0.0 {
        return Exp::ZERO;
    }
    if rest.is_empty() {
        return Exp::Num(constant);
    }
    if constant != 1.0 {
        rest.insert(0, Exp::Num(constant));
    }

    if rest.len() == 1 {
        rest.pop().unwrap()
    } else {
        Exp::Pool {
            op: AssocOp::Mul,
            terms: rest,
        }
    }
}

fn pow_fold(left: Exp, right: Exp) -> Exp {
    if let Exp::Num(exponent) = right {
        if exponent == 1.0 {
            return left;
        }
        if exponent == 0.0 {
            return Exp::ONE;
        }
        if let Exp::Num(base) = left {
            let val = base.powf(exponent);
            if val.is_finite() {
                return Exp::Num(val);
            }
        }
        return left.pow(Exp::Num(exponent));
    }
    left.pow(right)
}

fn function_fold(name: String, args: Vec<Exp>) -> Exp {
    let exp = Exp::Function { name, args };
    if exp.vars().is_empty()
        && let Ok(val) = exp.eval_num(&HashMap::new())
    {
        Exp::Num(val)
    } else {
        exp
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn simplified(source: &str) -> String {
        Exp::from_str(source).unwrap().simplify().to_string()
    }

    #[test]
    fn folds_constants() {
        assert_eq!(simplified("2+3"), "5");
        assert_eq!(simplified("2*3^2"), "18");
        assert_eq!(simplified("x+5-10"), "x - 5");
    }

    #[test]
    fn collects_like_terms() {
        assert_eq!(simplified("2x + 3x"), "5 * x");
        assert_eq!(simplified("x - x"), "0");
    }

    #[test]
    fn eliminates_identities() {
        assert_eq!(simplified("0*x"), "0");
        assert_eq!(simplified("1*x"), "x");
        assert_eq!(simplified("x^1"), "x");
        assert_eq!(simplified("x^0"), "1");
        assert_eq!(simplified("x+0"), "x");
    }

    #[test]
    fn folds_constant_function_arguments() {
        assert_eq!(simplified("cos(0)"), "1");
        // a symbolic argument stays symbolic
        assert_eq!(simplified("sin(x)"), "sin(x)");
    }

    #[test]
    fn simplify_is_idempotent() {
        let exp = Exp::from_str("2x + 3x + 1 - 1").unwrap();
        let once = exp.simplify();
        assert_eq!(once, once.simplify());
    }
}
