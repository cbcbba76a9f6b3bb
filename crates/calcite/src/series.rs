use std::fmt::Display;
use std::str::FromStr;

use itertools::Itertools;

use crate::{
    ast::Exp,
    eval::{EvalError, ExprError},
};

#[derive(Debug, Clone)]
pub enum SeriesError {
    LengthMismatch { xs: usize, ys: usize },
    BadNumber { token: String },
    Expr(ExprError),
}

impl Display for SeriesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch { xs, ys } => {
                write!(f, "got {xs} x values but {ys} y values")
            }
            Self::BadNumber { token } => write!(f, "\"{token}\" is not a number"),
            Self::Expr(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SeriesError {}

impl From<ExprError> for SeriesError {
    fn from(err: ExprError) -> Self {
        Self::Expr(err)
    }
}

impl From<EvalError> for SeriesError {
    fn from(err: EvalError) -> Self {
        Self::Expr(ExprError::Eval(err))
    }
}

/// Parses a comma-separated list of numbers, trimming each token.
pub fn parse_values(raw: &str) -> Result<Vec<f64>, SeriesError> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token.parse().map_err(|_| SeriesError::BadNumber {
                token: token.to_owned(),
            })
        })
        .try_collect()
}

/// Samples `source` as a function of `var` at the given x values.
/// The formula is parsed once and evaluated per sample.
pub fn sample_series(source: &str, var: &str, xs: &[f64]) -> Result<Vec<(f64, f64)>, SeriesError> {
    let exp = Exp::from_str(source).map_err(ExprError::from)?;
    let mut bindings = std::collections::HashMap::new();
    xs.iter()
        .map(|&x| {
            bindings.insert(var.to_owned(), x);
            Ok((x, exp.eval_num(&bindings)?))
        })
        .try_collect()
}

/// Zips explicit x and y lists into points.
pub fn paired_series(xs: &[f64], ys: &[f64]) -> Result<Vec<(f64, f64)>, SeriesError> {
    if xs.len() != ys.len() {
        return Err(SeriesError::LengthMismatch {
            xs: xs.len(),
            ys: ys.len(),
        });
    }
    Ok(xs.iter().copied().zip(ys.iter().copied()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_value_lists() {
        assert_eq!(parse_values("1, 2.5, -3").unwrap(), vec![1.0, 2.5, -3.0]);
        assert_eq!(parse_values("1,,2").unwrap(), vec![1.0, 2.0]);
        assert!(matches!(
            parse_values("1, two"),
            Err(SeriesError::BadNumber { .. })
        ));
    }

    #[test]
    fn samples_a_formula() {
        let points = sample_series("x^2", "x", &[0.0, 1.0, 2.0]).unwrap();
        assert_eq!(points, vec![(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)]);
    }

    #[test]
    fn sampling_propagates_eval_errors() {
        assert!(matches!(
            sample_series("1/x", "x", &[1.0, 0.0]),
            Err(SeriesError::Expr(ExprError::Eval(
                EvalError::DivisionByZero
            )))
        ));
    }

    #[test]
    fn pairs_explicit_lists() {
        assert_eq!(
            paired_series(&[1.0, 2.0], &[3.0, 4.0]).unwrap(),
            vec![(1.0, 3.0), (2.0, 4.0)]
        );
        assert!(matches!(
            paired_series(&[1.0], &[]),
            Err(SeriesError::LengthMismatch { xs: 1, ys: 0 })
        ));
    }
}
