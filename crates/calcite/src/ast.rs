use std::collections::HashSet;

use itertools::Itertools;

pub mod operators;
pub use operators::*;

pub mod substitute;

/// Algebraic expression over `f64` scalars.
///
/// Subtraction and negation are represented as multiplication by -1 and
/// division as a `^-1` factor, so `Add` and `Mul` pools stay the only
/// variadic nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum Exp {
    Num(f64),
    Var {
        name: String,
    },
    Dyadic {
        op: DyadicOp,
        left: Box<Exp>,
        right: Box<Exp>,
    },
    Pool {
        op: AssocOp,
        terms: Vec<Exp>,
    },
    Function {
        name: String,
        args: Vec<Exp>,
    },
}

impl Exp {
    pub const ZERO: Self = Self::Num(0.0);
    pub const ONE: Self = Self::Num(1.0);
    pub const NEGATIVE_ONE: Self = Self::Num(-1.0);

    pub fn var(name: &str) -> Self {
        Self::Var {
            name: name.to_owned(),
        }
    }

    pub fn function(name: &str, args: Vec<Exp>) -> Self {
        Self::Function {
            name: name.to_owned(),
            args,
        }
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Self::Num(..))
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Num(val) => Some(*val),
            _ => None,
        }
    }

    pub fn assoc_combine(op: AssocOp, first: Self, second: Self) -> Self {
        let mut terms = Vec::new();

        match first {
            Self::Pool {
                op: first_op,
                terms: mut first_terms,
            } if first_op == op => terms.append(&mut first_terms),
            _ => terms.push(first),
        }

        match second {
            Self::Pool {
                op: second_op,
                terms: mut second_terms,
            } if second_op == op => terms.append(&mut second_terms),
            _ => terms.push(second),
        }

        Self::Pool { op, terms }
    }

    pub fn map<F>(&self, mut f: F) -> Exp
    where
        F: FnMut(&Exp) -> Exp,
    {
        use Exp::*;
        match self {
            Num(..) | Var { .. } => self.clone(),
            Dyadic { op, left, right } => Dyadic {
                op: *op,
                left: f(left).into(),
                right: f(right).into(),
            },
            Pool { op, terms } => Pool {
                op: *op,
                terms: terms.iter().map(f).collect_vec(),
            },
            Function { name, args } => Function {
                name: name.clone(),
                args: args.iter().map(f).collect_vec(),
            },
        }
    }

    pub fn try_map<F, E>(&self, mut f: F) -> Result<Exp, E>
    where
        F: FnMut(&Exp) -> Result<Exp, E>,
    {
        use Exp::*;
        Ok(match self {
            Num(..) | Var { .. } => self.clone(),
            Dyadic { op, left, right } => Dyadic {
                op: *op,
                left: f(left)?.into(),
                right: f(right)?.into(),
            },
            Pool { op, terms } => Pool {
                op: *op,
                terms: terms.iter().map(f).try_collect()?,
            },
            Function { name, args } => Function {
                name: name.clone(),
                args: args.iter().map(f).try_collect()?,
            },
        })
    }

    pub fn reduce<T, F, J, D>(&self, f: F, joiner: J, def: D) -> T
    where
        F: Fn(&Self) -> T,
        J: Fn(T, T) -> T,
        D: Fn() -> T,
    {
        use Exp::*;
        match self {
            Num(..) | Var { .. } => def(),
            Dyadic { left, right, .. } => joiner(f(left), f(right)),
            Pool { terms, .. } => terms.iter().map(f).reduce(joiner).unwrap_or_else(def),
            Function { args, .. } => args.iter().map(f).reduce(joiner).unwrap_or_else(def),
        }
    }

    pub fn contains(&self, sub_exp: &Exp) -> bool {
        if self == sub_exp {
            true
        } else {
            self.reduce(|exp| exp.contains(sub_exp), |a, b| a || b, || false)
        }
    }

    pub fn vars(&self) -> HashSet<String> {
        if let Self::Var { name } = self {
            HashSet::from([name.clone()])
        } else {
            self.reduce(Self::vars, |a, b| &a | &b, HashSet::new)
        }
    }

    pub fn depends_on_var(&self, var: &str) -> bool {
        match self {
            Self::Var { name } => name == var,
            exp => exp.reduce(|e| e.depends_on_var(var), |a, b| a || b, || false),
        }
    }

    pub fn pow(self, exponent: Self) -> Self {
        Self::Dyadic {
            op: DyadicOp::Pow,
            left: self.into(),
            right: exponent.into(),
        }
    }
}

impl From<f64> for Exp {
    fn from(val: f64) -> Self {
        Self::Num(val)
    }
}

impl std::ops::Add for Exp {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::assoc_combine(AssocOp::Add, self, rhs)
    }
}

impl std::ops::Neg for Exp {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::assoc_combine(AssocOp::Mul, Self::NEGATIVE_ONE, self)
    }
}

impl std::ops::Sub for Exp {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl std::ops::Mul for Exp {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self::assoc_combine(AssocOp::Mul, self, rhs)
    }
}

impl std::ops::Div for Exp {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        Self::assoc_combine(AssocOp::Mul, self, rhs.pow(Self::NEGATIVE_ONE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_build_pools() {
        let sum = Exp::var("x") + Exp::Num(1.0) + Exp::var("y");
        assert_eq!(
            sum,
            Exp::Pool {
                op: AssocOp::Add,
                terms: vec![Exp::var("x"), Exp::Num(1.0), Exp::var("y")],
            }
        );

        let neg = -Exp::var("x");
        assert_eq!(
            neg,
            Exp::Pool {
                op: AssocOp::Mul,
                terms: vec![Exp::NEGATIVE_ONE, Exp::var("x")],
            }
        );
    }

    #[test]
    fn collects_variables() {
        let exp = Exp::var("x").pow(Exp::Num(2.0)) + Exp::var("y");
        assert_eq!(
            exp.vars(),
            HashSet::from(["x".to_owned(), "y".to_owned()])
        );
        assert!(exp.depends_on_var("x"));
        assert!(!exp.depends_on_var("z"));
    }

    #[test]
    fn finds_subexpressions() {
        let inner = Exp::var("x").pow(Exp::Num(2.0));
        let exp = Exp::function("sin", vec![inner.clone()]);
        assert!(exp.contains(&inner));
        assert!(!exp.contains(&Exp::var("y")));
    }
}
