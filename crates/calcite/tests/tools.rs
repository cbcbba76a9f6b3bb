use std::collections::HashMap;
use std::str::FromStr;

use calcite::ast::Exp;
use calcite::calculus::{derivative, integrate};
use calcite::eval::{evaluate, evaluate_single_var};
use calcite::series::sample_series;
use calcite::solve::{EquationOutcome, LinearSolution, solve_equation, solve_system};
use calcite::table::{parse_csv, summarize};

fn assert_diff_eq(var: &str, input: &str, expected: &str) {
    let exp = Exp::from_str(input).expect("parse input");
    let got = derivative(&exp, var).expect("differentiate").simplify();
    let expected_exp = Exp::from_str(expected).expect("parse expected").simplify();
    assert_eq!(got, expected_exp, "d/d{var} {input}");
}

#[test]
fn parses_and_evaluates() {
    assert_eq!(evaluate("2 + 3 * 4", &HashMap::new()).unwrap(), 14.0);
    assert_eq!(evaluate_single_var("2x^2 + 1", "x", 3.0).unwrap(), 19.0);

    let exp = Exp::from_str("2x + y").expect("parse");
    assert_eq!(exp.to_string(), "2 * x + y");
}

#[test]
fn differentiates_through_the_string_surface() {
    assert_diff_eq("x", "x^3", "3*x^2");
    assert_diff_eq("x", "2*x^2 + 3*x", "4*x + 3");
    assert_diff_eq("x", "sin(x)", "cos(x)");
    assert_diff_eq("x", "cos(x)", "-sin(x)");
    assert_diff_eq("x", "sin(x^2)", "2*cos(x^2)*x");
}

#[test]
fn integrates_closed_forms_and_falls_back_to_trapezoids() {
    let exact = integrate("x^2", "x", 0.0, 1.0).expect("closed form");
    assert!(exact.exact);
    assert!((exact.value - 1.0 / 3.0).abs() < 1e-12);
    assert_eq!(
        exact.steps[0],
        "Integrating x^2 with respect to x from 0 to 1"
    );

    let numeric = integrate("x^2 + 1", "x", 0.0, 1.0).expect("trapezoid");
    assert!(!numeric.exact);
    assert!((numeric.value - 4.0 / 3.0).abs() < 1e-4);
}

#[test]
fn solves_a_parsed_system() {
    let (solution, steps) = solve_system("2x + y = 5\n3x - 2y = 4", ("x", "y")).expect("solve");
    assert_eq!(solution, LinearSolution::Unique { x: 2.0, y: 1.0 });
    assert_eq!(steps[0], "Starting with the system of equations:");

    let (solution, _) = solve_system("x + y = 5\nx + y = 3", ("x", "y")).expect("solve");
    assert_eq!(solution, LinearSolution::NoSolution);
}

#[test]
fn solves_a_single_variable_equation() {
    let (outcome, _) = solve_equation("x + 5 = 10", "x").expect("solve");
    assert_eq!(
        outcome,
        EquationOutcome::Root {
            var: "x".to_owned(),
            value: 5.0
        }
    );
}

#[test]
fn summarises_an_imported_column() {
    let table = parse_csv("t,v\n0,10\n1,20\n2,30").expect("parse csv");
    let column = table.numeric_column("v").expect("column exists");
    let summary = summarize(&column).expect("non-empty column");

    assert_eq!(summary.count, 3);
    assert_eq!(summary.mean, 20.0);
    assert_eq!(summary.median, 20.0);
    assert_eq!(summary.min, 10.0);
    assert_eq!(summary.max, 30.0);
}

#[test]
fn samples_a_formula_for_charting() {
    let points = sample_series("x^2 - 1", "x", &[0.0, 1.0, 2.0]).expect("sample");
    assert_eq!(points, vec![(0.0, -1.0), (1.0, 0.0), (2.0, 3.0)]);
}
