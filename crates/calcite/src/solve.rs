use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use calcite_utils::strip_whitespace;
use lazy_regex::{Regex, regex};

use crate::{
    ast::Exp,
    eval::{EvalError, ExprError, evaluate},
    parse::ParseExpError,
};

/// Tolerance for treating a determinant or coefficient as zero.
pub const EPSILON: f64 = 1e-10;

/// One equation of the form `a·x + b·y = c`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearEquation {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinearSolution {
    Unique { x: f64, y: f64 },
    InfiniteSolutions,
    NoSolution,
}

impl Display for LinearSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unique { x, y } => write!(f, "x = {x:.4}, y = {y:.4}"),
            Self::InfiniteSolutions => write!(f, "The system has infinitely many solutions"),
            Self::NoSolution => write!(f, "The system has no solution"),
        }
    }
}

/// Result of solving or evaluating a single-variable input.
#[derive(Debug, Clone, PartialEq)]
pub enum EquationOutcome {
    Root { var: String, value: f64 },
    Value(f64),
}

impl Display for EquationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root { var, value } => write!(f, "{var} = {value}"),
            Self::Value(value) => write!(f, "Result: {value}"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum SolveError {
    MalformedEquation { line: String },
    UnsupportedSystemSize { got: usize },
    NotLinear { var: String },
    DegenerateEquation,
    Parse(ParseExpError),
    Eval(EvalError),
}

impl Display for SolveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedEquation { line } => {
                write!(f, "could not parse a linear equation from \"{line}\"")
            }
            Self::UnsupportedSystemSize { got } => {
                write!(f, "only 2x2 systems are supported, got {got} equations")
            }
            Self::NotLinear { var } => write!(f, "the equation is not linear in {var}"),
            Self::DegenerateEquation => write!(f, "the variable cancels out of the equation"),
            Self::Parse(err) => write!(f, "parse error: {err}"),
            Self::Eval(err) => write!(f, "evaluation error: {err}"),
        }
    }
}

impl std::error::Error for SolveError {}

impl From<ParseExpError> for SolveError {
    fn from(err: ParseExpError) -> Self {
        Self::Parse(err)
    }
}

impl From<EvalError> for SolveError {
    fn from(err: EvalError) -> Self {
        Self::Eval(err)
    }
}

impl From<ExprError> for SolveError {
    fn from(err: ExprError) -> Self {
        match err {
            ExprError::Parse(err) => Self::Parse(err),
            ExprError::Eval(err) => Self::Eval(err),
        }
    }
}

/// Raw coefficient text preceding the first occurrence of `var`, or None
/// when the variable is absent.
fn coefficient_of(standard: &str, var: &str) -> Option<String> {
    let pattern = Regex::new(&format!(
        r"([+-]?\s*\d*\.?\d*)\s*{}",
        lazy_regex::regex::escape(var)
    ))
    .expect("escaped variable name yields a valid pattern");
    pattern.captures(standard).map(|caps| caps[1].to_owned())
}

fn numeric_coefficient(raw: &str) -> Option<f64> {
    match raw.trim() {
        "" | "+" => Some(1.0),
        "-" => Some(-1.0),
        trimmed => strip_whitespace(trimmed).parse().ok(),
    }
}

/// Parses one line of the form `a·x + b·y = c` into its coefficients.
///
/// The right-hand side is folded into the left by rewriting `lhs = rhs` as
/// `lhs-(rhs)`, after which the first occurrence of each variable is scanned
/// for its leading coefficient and the trailing `constant)` group gives `c`.
/// Empty or `+` coefficients read as 1, a bare `-` as -1, an absent variable
/// as 0.
pub fn parse_linear_equation(
    line: &str,
    vars: (&str, &str),
) -> Result<LinearEquation, SolveError> {
    let malformed = || SolveError::MalformedEquation {
        line: line.to_owned(),
    };

    if !line.contains('=') {
        return Err(malformed());
    }
    let standard = format!("{})", regex!(r"\s*=\s*").replace(line, "-("));

    let a = match coefficient_of(&standard, vars.0) {
        Some(raw) => numeric_coefficient(&raw).ok_or_else(malformed)?,
        None => 0.0,
    };
    let b = match coefficient_of(&standard, vars.1) {
        Some(raw) => numeric_coefficient(&raw).ok_or_else(malformed)?,
        None => 0.0,
    };
    let c = match regex!(r"([+-]?\s*\d*\.?\d*)\)$").captures(&standard) {
        Some(caps) => strip_whitespace(&caps[1])
            .parse()
            .map_err(|_| malformed())?,
        None => 0.0,
    };

    if a == 0.0 && b == 0.0 {
        return Err(malformed());
    }

    Ok(LinearEquation { a, b, c })
}

/// Solves the pair by Cramer's rule, returning the solution and a derivation
/// trace. A determinant below [`EPSILON`] is classified as consistent
/// (infinitely many solutions) or inconsistent (none) before any ratio is
/// formed.
pub fn solve2x2(eq1: LinearEquation, eq2: LinearEquation) -> (LinearSolution, Vec<String>) {
    let LinearEquation {
        a: a1,
        b: b1,
        c: c1,
    } = eq1;
    let LinearEquation {
        a: a2,
        b: b2,
        c: c2,
    } = eq2;

    let mut steps = vec![
        "Writing in matrix form:".to_owned(),
        format!("[{a1} {b1}] [x] = [{c1}]"),
        format!("[{a2} {b2}] [y]   [{c2}]"),
    ];

    let determinant = a1 * b2 - a2 * b1;

    if determinant.abs() < EPSILON {
        return if (a1 * c2 - a2 * c1).abs() < EPSILON && (b1 * c2 - b2 * c1).abs() < EPSILON {
            steps.push("The determinant is zero and the system is consistent.".to_owned());
            steps.push("Therefore, the system has infinitely many solutions.".to_owned());
            (LinearSolution::InfiniteSolutions, steps)
        } else {
            steps.push("The determinant is zero but the system is inconsistent.".to_owned());
            steps.push("Therefore, the system has no solution.".to_owned());
            (LinearSolution::NoSolution, steps)
        };
    }

    steps.push("Using Cramer's rule to solve the system:".to_owned());
    steps.push(format!(
        "Determinant = {a1} × {b2} - {a2} × {b1} = {determinant}"
    ));

    let det_x = c1 * b2 - c2 * b1;
    let det_y = a1 * c2 - a2 * c1;
    steps.push(format!(
        "Determinant for x = {c1} × {b2} - {c2} × {b1} = {det_x}"
    ));
    steps.push(format!(
        "Determinant for y = {a1} × {c2} - {a2} × {c1} = {det_y}"
    ));

    let x = det_x / determinant;
    let y = det_y / determinant;
    steps.push(format!("x = {det_x} / {determinant} = {x}"));
    steps.push(format!("y = {det_y} / {determinant} = {y}"));

    (LinearSolution::Unique { x, y }, steps)
}

/// Parses a two-line system and solves it. Blank lines are skipped; any
/// other equation count fails with `UnsupportedSystemSize`.
pub fn solve_system(
    text: &str,
    vars: (&str, &str),
) -> Result<(LinearSolution, Vec<String>), SolveError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() != 2 {
        return Err(SolveError::UnsupportedSystemSize { got: lines.len() });
    }

    let eq1 = parse_linear_equation(lines[0], vars)?;
    let eq2 = parse_linear_equation(lines[1], vars)?;

    let mut steps = vec!["Starting with the system of equations:".to_owned()];
    steps.extend(lines.iter().map(|line| (*line).to_owned()));

    let (solution, mut solve_steps) = solve2x2(eq1, eq2);
    steps.append(&mut solve_steps);
    Ok((solution, steps))
}

/// Solves `lhs = rhs` for `var`, or evaluates the input when it has no `=`.
///
/// The residual `(lhs)-(rhs)` is simplified and probed at 0, 1 and 2 to read
/// off the linear coefficients. A nonzero second difference means the
/// residual is not linear in `var`.
pub fn solve_equation(
    input: &str,
    var: &str,
) -> Result<(EquationOutcome, Vec<String>), SolveError> {
    let Some((lhs, rhs)) = input.split_once('=') else {
        let value = evaluate(input, &HashMap::new())?;
        let steps = vec![
            format!("Evaluating expression: {}", input.trim()),
            format!("Result: {value}"),
        ];
        return Ok((EquationOutcome::Value(value), steps));
    };

    let mut steps = vec![format!("Starting with equation: {}", input.trim())];

    let residual = Exp::from_str(&format!("({})-({})", lhs.trim(), rhs.trim()))?.simplify();
    steps.push(format!("Rearranging to standard form: {residual} = 0"));

    if !residual.depends_on_var(var) {
        let value = residual.eval_num(&HashMap::new())?;
        steps.push(format!("Result: {value}"));
        return Ok((EquationOutcome::Value(value), steps));
    }

    let probe = |x: f64| -> Result<f64, SolveError> {
        let bindings = HashMap::from([(var.to_owned(), x)]);
        Ok(residual.eval_num(&bindings)?)
    };
    let p0 = probe(0.0)?;
    let p1 = probe(1.0)?;
    let p2 = probe(2.0)?;

    // a linear residual has a vanishing second difference
    if (p2 - 2.0 * p1 + p0).abs() > 1e-9 {
        return Err(SolveError::NotLinear {
            var: var.to_owned(),
        });
    }

    let coefficient = p1 - p0;
    if coefficient.abs() < EPSILON {
        return Err(SolveError::DegenerateEquation);
    }

    let root = -p0 / coefficient;
    steps.push(format!(
        "Isolating the variable: {coefficient}{var} + {p0} = 0"
    ));
    steps.push(format!("Solving for {var}: {var} = {root}"));

    Ok((
        EquationOutcome::Root {
            var: var.to_owned(),
            value: root,
        },
        steps,
    ))
}
