use calcite_utils::raise_superscript;
use itertools::Itertools;
use lazy_regex::regex_is_match;

use crate::ast::{AssocOp, DyadicOp, Exp};

#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOptions {
    pub unicode_exponents: bool,
}

fn is_enclosed(exp: &Exp) -> bool {
    match exp {
        Exp::Num(val) => *val >= 0.0,
        Exp::Var { .. } | Exp::Function { .. } => true,
        Exp::Dyadic { .. } | Exp::Pool { .. } => false,
    }
}

fn infix_precedence(exp: &Exp) -> Option<u8> {
    match exp {
        Exp::Dyadic { op, .. } => Some(op.precedence()),
        Exp::Pool { op, .. } => Some(op.precedence()),
        _ => None,
    }
}

fn wrap_if(s: &str, wrap: bool) -> String {
    if wrap {
        format!("({s})")
    } else {
        s.to_string()
    }
}

impl std::fmt::Display for Exp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_string_opts(PrintOptions::default()))
    }
}

impl Exp {
    pub fn to_string_opts(&self, opts: PrintOptions) -> String {
        use Exp::*;
        match self {
            Num(val) => val.to_string(),
            Var { name } => name.to_owned(),

            Dyadic { op, left, right } => {
                let prec = op.precedence();

                let left_str = wrap_if(&left.to_string_opts(opts), !is_enclosed(left));
                let right_str = right.to_string_opts(opts);

                if opts.unicode_exponents
                    && *op == DyadicOp::Pow
                    && regex_is_match!(r"^[-0123456789]+$", &right_str)
                {
                    let exponent_str = raise_superscript(&right_str);
                    return format!("{left_str}{exponent_str}");
                }

                let wrap_right = infix_precedence(right)
                    .is_some_and(|sub_prec| sub_prec <= prec)
                    || right_str.starts_with('-');

                let right_str = wrap_if(&right_str, wrap_right);

                format!("{left_str}{}{right_str}", op.symbol())
            }

            Pool { op, terms } => {
                let prec = op.precedence();

                let mut terms_iter = terms.iter();

                let mut s = match terms_iter.next() {
                    None => "".to_owned(),
                    Some(num) if *num == Exp::NEGATIVE_ONE && *op == AssocOp::Mul => "-".to_owned(),
                    Some(exp) => wrap_if(
                        &exp.to_string_opts(opts),
                        infix_precedence(exp).is_some_and(|sub_prec| sub_prec <= prec),
                    ),
                };

                for term in terms_iter {
                    let term_str = wrap_if(
                        &term.to_string_opts(opts),
                        infix_precedence(term).is_some_and(|sub_prec| sub_prec <= prec),
                    );

                    let prefixed_str = if let Some(rest) = term_str.strip_prefix('-')
                        && *op == AssocOp::Add
                    {
                        format!(" - {rest}")
                    } else if let Dyadic {
                        op: DyadicOp::Pow,
                        left,
                        right,
                    } = term
                        && **right == Exp::NEGATIVE_ONE
                        && *op == AssocOp::Mul
                    {
                        let sub_term_str = wrap_if(
                            &left.to_string_opts(opts),
                            infix_precedence(left).is_some_and(|sub_prec| sub_prec <= prec),
                        );
                        format!(" / {sub_term_str}")
                    } else if s == "-" && *op == AssocOp::Mul {
                        term_str
                    } else {
                        format!(" {} {}", op.symbol(), term_str)
                    };

                    s.push_str(&prefixed_str);
                }

                s
            }

            Function { name, args } => {
                let args_str = args.iter().map(|arg| arg.to_string_opts(opts)).join(", ");
                format!("{name}({args_str})")
            }
        }
    }
}
