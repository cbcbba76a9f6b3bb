use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use crate::ast::Exp;
use crate::eval::{EvalError, EvalResult};
use crate::parse::ParseExpError;

/// Number of trapezoids used by the numeric fallback.
pub const SUBINTERVALS: usize = 1000;

/// A definite integral together with its derivation trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Integral {
    pub value: f64,
    pub steps: Vec<String>,
    /// true when a closed-form antiderivative was used instead of the
    /// trapezoidal approximation
    pub exact: bool,
}

#[derive(Debug, Clone)]
pub enum IntegrateError {
    InvalidBounds { lower: f64, upper: f64 },
    Parse(ParseExpError),
    Eval(EvalError),
}

impl Display for IntegrateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidBounds { lower, upper } => {
                write!(f, "bounds must be finite numbers, got {lower} and {upper}")
            }
            Self::Parse(err) => write!(f, "parse error: {err}"),
            Self::Eval(err) => write!(f, "evaluation error: {err}"),
        }
    }
}

impl std::error::Error for IntegrateError {}

impl From<ParseExpError> for IntegrateError {
    fn from(err: ParseExpError) -> Self {
        Self::Parse(err)
    }
}

impl From<EvalError> for IntegrateError {
    fn from(err: EvalError) -> Self {
        Self::Eval(err)
    }
}

/// An integrand with a known antiderivative. Matching is by exact string
/// comparison after substituting the integration variable into `form`.
struct ClosedForm {
    form: fn(&str) -> String,
    antiderivative: fn(&str) -> String,
    eval: fn(f64) -> f64,
}

const CLOSED_FORMS: [ClosedForm; 6] = [
    ClosedForm {
        form: |v| format!("{v}^2"),
        antiderivative: |v| format!("{v}^3/3"),
        eval: |x| x.powi(3) / 3.0,
    },
    ClosedForm {
        form: str::to_owned,
        antiderivative: |v| format!("{v}^2/2"),
        eval: |x| x.powi(2) / 2.0,
    },
    ClosedForm {
        form: |_| "1".to_owned(),
        antiderivative: str::to_owned,
        eval: |x| x,
    },
    ClosedForm {
        form: |v| format!("{v}^3"),
        antiderivative: |v| format!("{v}^4/4"),
        eval: |x| x.powi(4) / 4.0,
    },
    ClosedForm {
        form: |v| format!("sin({v})"),
        antiderivative: |v| format!("-cos({v})"),
        eval: |x| -x.cos(),
    },
    ClosedForm {
        form: |v| format!("cos({v})"),
        antiderivative: |v| format!("sin({v})"),
        eval: f64::sin,
    },
];

/// Computes the definite integral of `source` in `var` over `lower..upper`.
///
/// Integrands with a tabulated antiderivative are resolved in closed form;
/// everything else falls back to the composite trapezoidal rule. Reversed
/// bounds negate the result.
pub fn integrate(
    source: &str,
    var: &str,
    lower: f64,
    upper: f64,
) -> Result<Integral, IntegrateError> {
    if !lower.is_finite() || !upper.is_finite() {
        return Err(IntegrateError::InvalidBounds { lower, upper });
    }

    let trimmed = source.trim();
    let mut steps = vec![format!(
        "Integrating {trimmed} with respect to {var} from {lower} to {upper}"
    )];

    if let Some(closed) = CLOSED_FORMS.iter().find(|c| (c.form)(var) == trimmed) {
        let anti = (closed.antiderivative)(var);
        let upper_val = (closed.eval)(upper);
        let lower_val = (closed.eval)(lower);
        let value = upper_val - lower_val;

        steps.push(format!("Step 1: Find the antiderivative of {trimmed}"));
        steps.push(format!("The antiderivative is {anti}"));
        steps.push("Step 2: Evaluate the antiderivative at the upper and lower bounds".to_owned());
        steps.push(format!(
            "{anti}|_{{{lower}}}^{{{upper}}} = {} - {}",
            anti.replace(var, &format!("({upper})")),
            anti.replace(var, &format!("({lower})")),
        ));
        steps.push(format!("= {upper_val:.6} - {lower_val:.6} = {value:.6}"));

        return Ok(Integral {
            value,
            steps,
            exact: true,
        });
    }

    let exp = Exp::from_str(trimmed)?;
    let value = trapezoid(&exp, var, lower, upper, SUBINTERVALS)?;
    steps.push(format!(
        "Using numerical integration (trapezoidal rule) with {SUBINTERVALS} intervals"
    ));
    steps.push(format!("The approximate value of the integral is {value:.6}"));

    Ok(Integral {
        value,
        steps,
        exact: false,
    })
}

/// Composite trapezoidal rule with `n` subintervals. Endpoint samples get
/// weight 1, interior samples weight 2, and the sum is scaled by `h/2`.
pub fn trapezoid(exp: &Exp, var: &str, lower: f64, upper: f64, n: usize) -> EvalResult<f64> {
    let h = (upper - lower) / n as f64;
    let mut bindings = HashMap::new();
    let mut sum = 0.0;

    for i in 0..=n {
        let x = lower + i as f64 * h;
        bindings.insert(var.to_owned(), x);
        let fx = exp.eval_num(&bindings)?;
        sum += if i == 0 || i == n { fx } else { 2.0 * fx };
    }

    Ok(h / 2.0 * sum)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_form_shortcut() {
        let integral = integrate("x^2", "x", 0.0, 1.0).unwrap();
        assert!(integral.exact);
        assert!((integral.value - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(integral.steps[1], "Step 1: Find the antiderivative of x^2");
        assert_eq!(integral.steps[2], "The antiderivative is x^3/3");
    }

    #[test]
    fn reversed_bounds_negate() {
        let integral = integrate("x^2", "x", 1.0, 0.0).unwrap();
        assert!((integral.value + 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn numeric_fallback_is_close() {
        let integral = integrate("x^2 + 1", "x", 0.0, 1.0).unwrap();
        assert!(!integral.exact);
        assert!((integral.value - 4.0 / 3.0).abs() < 1e-4);
        assert_eq!(
            integral.steps[1],
            "Using numerical integration (trapezoidal rule) with 1000 intervals"
        );
    }

    #[test]
    fn numeric_and_exact_paths_agree() {
        let exp: Exp = "sin(x)".parse().unwrap();
        let numeric = trapezoid(&exp, "x", 0.0, std::f64::consts::PI, SUBINTERVALS).unwrap();
        let exact = integrate("sin(x)", "x", 0.0, std::f64::consts::PI)
            .unwrap()
            .value;
        assert!((numeric - exact).abs() < 1e-4);
    }

    #[test]
    fn nonfinite_bounds_rejected() {
        assert!(matches!(
            integrate("x", "x", f64::NAN, 1.0),
            Err(IntegrateError::InvalidBounds { .. })
        ));
        assert!(matches!(
            integrate("x", "x", 0.0, f64::INFINITY),
            Err(IntegrateError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn pole_in_the_interval_propagates() {
        assert!(matches!(
            integrate("1/x", "x", 0.0, 1.0),
            Err(IntegrateError::Eval(EvalError::DivisionByZero))
        ));
    }
}
