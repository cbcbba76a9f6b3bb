use std::{cmp::Ordering, fmt::Display, str::FromStr};

use calcite_utils::lower_superscript;
use itertools::Itertools;
use lazy_regex::{regex_captures, regex_is_match, regex_replace_all};

use crate::ast::*;

/// Rewrites the raw input into a form the precedence splitter understands:
/// strips whitespace, lowers unicode superscripts and inserts the implicit
/// multiplications a user leaves out (`2x`, `3(x+1)`, `)(`).
pub fn preparse(mut subject: String) -> String {
    // Superscript runs become explicit exponents: x² -> x^(2)
    subject = regex_replace_all!(r"[⁰¹²³⁴⁵⁶⁷⁸⁹⁺⁻]+", &subject, |sup: &str| format!(
        "^({})",
        lower_superscript(sup)
    ))
    .to_string();

    for symbol in [" ", "\t", "\n"] {
        subject = subject.replace(symbol, "");
    }

    // Juxtaposed parentheses
    subject = subject.replace(")(", ")*(");

    // Number next to parentheses
    subject = regex_replace_all!(
        r"(?<pre>(?:^|\W)[0-9]+(?:\.[0-9]+)?)(?<post>\()",
        &subject,
        |_, pre, post| format!("{pre}*{post}"),
    )
    .to_string();

    // Number next to variable
    subject = regex_replace_all!(
        r"(?<pre>(?:^|\W)[0-9]+(?:\.[0-9]+)?)(?<post>\p{L})",
        &subject,
        |_, pre, post| format!("{pre}*{post}"),
    )
    .to_string();

    // Closing parenthesis next to variable or number
    subject = regex_replace_all!(
        r"(?<pre>\))(?<post>[\p{L}0-9])",
        &subject,
        |_, pre, post| format!("{pre}*{post}"),
    )
    .to_string();

    // A leading minus binds weaker than exponentiation, so -x^2 must not
    // become (-x)^2. Anchoring it to an explicit zero keeps the splitter
    // honest.
    subject = regex_replace_all!(r"(?<pre>^|\()-", &subject, |_, pre| format!("{pre}0-"))
        .to_string();

    subject
}

#[derive(Debug, Clone)]
pub struct ParseExpError {
    message: &'static str,
    start: usize,
    end: usize,
}

pub type ParseResult<T> = Result<T, ParseExpError>;

impl Display for ParseExpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseExpError {}

impl ParseExpError {
    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    /// Prints the offending input with a caret line under the bad span.
    pub fn pretty_print(&self, subject: &str) {
        println!("{subject}");
        let width = (self.end - self.start).max(1);
        println!("{}{} {}", " ".repeat(self.start), "^".repeat(width), self);
    }
}

pub fn is_valid_identifier(s: &str) -> bool {
    regex_is_match!(r"^\p{L}[\p{L}0-9_]*$", s)
}

fn is_sign_position(prev: Option<char>) -> bool {
    prev.is_none_or(|c| c == '(' || infix_from_char(c).is_some())
}

/// Splits the subject at every top-level operator of the lowest precedence
/// present, keeping parenthesised groups intact. Signs following another
/// operator are not split points.
pub fn split_at_least_precedent(subject: &str) -> (Vec<&str>, Vec<(char, Infix)>) {
    let mut terms = Vec::new();
    let mut ops = Vec::new();

    let mut depth = 0usize;
    let mut lowest_precedence = u8::MAX;
    let mut next_term_start = 0;
    let mut prev = None;

    for (index, c) in subject.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {
                if 0 < index
                    && depth == 0
                    && !(matches!(c, '+' | '-') && is_sign_position(prev))
                    && let Some(infix) = infix_from_char(c)
                {
                    let prec = infix.precedence();
                    match prec.cmp(&lowest_precedence) {
                        Ordering::Less => {
                            terms.clear();
                            ops.clear();
                            lowest_precedence = prec;

                            terms.push(&subject[..index]);
                        }
                        Ordering::Equal => {
                            terms.push(&subject[next_term_start..index]);
                        }
                        Ordering::Greater => {
                            prev = Some(c);
                            continue;
                        }
                    }
                    ops.push((c, infix));
                    next_term_start = index + c.len_utf8();
                }
            }
        }
        prev = Some(c);
    }

    terms.push(&subject[next_term_start..]);

    (terms, ops)
}

fn parse_arguments(args_string: &str, start: usize) -> ParseResult<Vec<Exp>> {
    let mut args = Vec::new();

    let mut depth = 0usize;
    let mut next_term_start = 0;

    for (index, c) in args_string.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                let sub = &args_string[next_term_start..index];
                args.push(parse_bounded(sub, start + next_term_start)?);
                next_term_start = index + c.len_utf8();
            }
            _ => (),
        }
    }

    let tail = &args_string[next_term_start..];
    args.push(parse_bounded(tail, start + next_term_start)?);

    Ok(args)
}

pub fn parse(subject: &str) -> ParseResult<Exp> {
    parse_bounded(subject, 0)
}

fn parse_bounded(subject: &str, start: usize) -> ParseResult<Exp> {
    if subject.is_empty() {
        return Err(ParseExpError {
            message: "cannot parse empty expression",
            start,
            end: start,
        });
    }

    // Dyadic and associative operators
    let (mut terms, mut ops) = split_at_least_precedent(subject);
    if !ops.is_empty() {
        let mut start_indices = vec![start];

        let mut index = start;
        for (term, (c, _)) in terms.iter().zip(ops.iter()) {
            index += term.len() + c.len_utf8();
            start_indices.push(index);
        }

        let assoc = Infix::precedence_associativity(ops[0].1.precedence());

        if assoc == Associativity::Right {
            terms = terms.into_iter().rev().collect_vec();
            ops = ops.into_iter().rev().collect_vec();
            start_indices = start_indices.into_iter().rev().collect_vec();
        }

        let mut terms_iter = terms.into_iter();
        let mut indices_iter = start_indices.into_iter();

        let first_term = terms_iter.next().unwrap();

        let mut exp = parse_bounded(first_term, indices_iter.next().unwrap())?;

        for ((term, index), (op_char, infix)) in terms_iter.zip(indices_iter).zip(ops) {
            let mut parsed = parse_bounded(term, index)?;

            match op_char {
                '-' => parsed = Exp::assoc_combine(AssocOp::Mul, Exp::NEGATIVE_ONE, parsed),
                '/' => parsed = parsed.pow(Exp::NEGATIVE_ONE),
                _ => (),
            }

            let (left, right) = match assoc {
                Associativity::Left => (exp, parsed),
                Associativity::Right => (parsed, exp),
            };

            exp = match infix {
                Infix::Dyadic(op) => Exp::Dyadic {
                    op,
                    left: left.into(),
                    right: right.into(),
                },
                Infix::Assoc(op) => Exp::assoc_combine(op, left, right),
            };
        }

        return Ok(exp);
    }

    // Function calls
    if let Some((_, name, insides)) = regex_captures!(r"^(\p{L}[\p{L}_0-9]*)\((.*)\)$", subject) {
        let args = parse_arguments(insides, start + name.len() + 1)?;
        return Ok(Exp::function(name, args));
    }

    if subject.starts_with('(') && subject.ends_with(')') {
        return parse_bounded(&subject[1..subject.len() - 1], start + 1);
    }

    // Numbers
    if regex_is_match!(r"^[+-]?[0-9]*\.?[0-9]+$", subject) {
        let val = f64::from_str(subject).expect("failed parsing number");
        return Ok(Exp::Num(val));
    }

    // Variables
    if is_valid_identifier(subject) {
        return Ok(Exp::var(subject));
    }

    // Ignore unary plus
    if let Some(sub) = subject.strip_prefix('+') {
        return parse_bounded(sub, start + 1);
    }

    // Unary minus parsed as multiplication
    if let Some(sub) = subject.strip_prefix('-') {
        let parsed = parse_bounded(sub, start + 1)?;
        return Ok(Exp::assoc_combine(
            AssocOp::Mul,
            Exp::NEGATIVE_ONE,
            parsed,
        ));
    }

    Err(ParseExpError {
        message: "unparsable expression",
        start,
        end: start + subject.len(),
    })
}

impl FromStr for Exp {
    type Err = ParseExpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let preparsed = preparse(s.to_owned());
        parse(&preparsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_succesfully() {
        assert!(parse("2+2").is_ok());
        assert!(parse("2-3").is_ok());
        assert!(parse("9*2").is_ok());
        assert!(parse("4/7").is_ok());
        assert!("2*x^2 + 3*x + 1".parse::<Exp>().is_ok());
    }

    #[test]
    fn test_associativity() {
        let exp = parse("a^b^c").unwrap();

        assert_eq!(
            exp,
            Exp::var("a").pow(Exp::var("b").pow(Exp::var("c"))),
        );
    }

    #[test]
    fn implicit_multiplication() {
        assert_eq!(preparse("2x + y".to_owned()), "2*x+y");
        assert_eq!(
            "2x".parse::<Exp>().unwrap(),
            Exp::Num(2.0) * Exp::var("x"),
        );
        assert_eq!(preparse("3(x+1)".to_owned()), "3*(x+1)");
        assert_eq!(preparse("sin(x)".to_owned()), "sin(x)");
    }

    #[test]
    fn leading_minus_binds_weaker_than_power() {
        let exp = "-x^2".parse::<Exp>().unwrap();
        assert_eq!(
            exp,
            Exp::Num(0.0) - Exp::var("x").pow(Exp::Num(2.0)),
        );
    }

    #[test]
    fn negative_exponent() {
        let exp = parse("x^-2").unwrap();
        assert_eq!(exp, Exp::var("x").pow(Exp::Num(-2.0)));
    }

    #[test]
    fn function_calls() {
        assert_eq!(
            parse("sin(x)").unwrap(),
            Exp::function("sin", vec![Exp::var("x")]),
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("").is_err());
        assert!(parse("2+").is_err());

        let error = parse("$?").unwrap_err();
        assert_eq!(error.span(), (0, 2));
    }

    #[test]
    fn superscript_input() {
        assert_eq!(
            "x²".parse::<Exp>().unwrap(),
            Exp::var("x").pow(Exp::Num(2.0)),
        );
    }
}
