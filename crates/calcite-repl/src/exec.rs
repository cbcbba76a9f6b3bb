use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, prelude::*};
use std::path::Path;

use itertools::Itertools;

use calcite::ast::Exp;
use calcite::calculus::{derivative, integrate};
use calcite::display::PrintOptions;
use calcite::parse::{is_valid_identifier, parse, preparse};
use calcite::solve::{solve_equation, solve_system};
use calcite::table::{parse_table, summarize};

#[derive(Default)]
pub struct ExecContext {
    pub is_repl: bool,
    pub debug_mode: bool,
    pub unicode_exponents: bool,
    pub bindings: HashMap<String, f64>,
}

fn render(exp: &Exp, exec_ctx: &ExecContext) -> String {
    exp.to_string_opts(PrintOptions {
        unicode_exponents: exec_ctx.unicode_exponents,
    })
}

pub enum ExecResult {
    Exit,
    Error,
}

pub fn exec_file(path: &Path, exec_ctx: &mut ExecContext) -> std::io::Result<()> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    for res in reader.lines() {
        let line = res?;
        if let Some(string) = line.strip_prefix('!') {
            println!("{}", string.trim());
            continue;
        }

        match exec_line(&line, exec_ctx) {
            Some(ExecResult::Error | ExecResult::Exit) => return Ok(()),
            None => (),
        }
    }
    Ok(())
}

pub fn exec_line(mut line: &str, exec_ctx: &mut ExecContext) -> Option<ExecResult> {
    if line.trim().is_empty() {
        return None;
    }

    if let Some(remainder) = line.trim().strip_prefix(':') {
        return eval_command(remainder, exec_ctx);
    }

    if let Some((body, _comment)) = line.split_once('#') {
        line = body;
    }

    if let Some((head, tail)) = line.split_once(":=") {
        return define_binding(head, tail, exec_ctx);
    }

    show_expression(line, exec_ctx)
}

fn define_binding(head: &str, tail: &str, exec_ctx: &mut ExecContext) -> Option<ExecResult> {
    let name = head.trim();
    if !is_valid_identifier(name) {
        println!("Invalid variable name: {name}");
        return Some(ExecResult::Error);
    }

    let preparsed = preparse(tail.to_owned());
    let parsed = match parse(&preparsed) {
        Ok(exp) => exp,
        Err(error) => {
            error.pretty_print(&preparsed);
            return Some(ExecResult::Error);
        }
    };

    // Definitions are evaluated immediately against the current bindings
    let value = match parsed.eval_num(&exec_ctx.bindings) {
        Ok(val) => val,
        Err(error) => {
            println!("Error: {error}");
            return Some(ExecResult::Error);
        }
    };

    exec_ctx.bindings.insert(name.to_owned(), value);
    if exec_ctx.is_repl {
        println!("Defined {name} = {value}");
    }
    None
}

fn show_expression(line: &str, exec_ctx: &ExecContext) -> Option<ExecResult> {
    let preparsed = preparse(line.to_owned());
    if exec_ctx.debug_mode {
        println!("Preparsed: {preparsed}");
    }

    let parsed = match parse(&preparsed) {
        Ok(exp) => exp,
        Err(error) => {
            error.pretty_print(&preparsed);
            return Some(ExecResult::Error);
        }
    };

    if exec_ctx.debug_mode {
        println!("AST: {parsed:?}");
    }

    let simplified = parsed.simplify();
    let fully_bound = simplified
        .vars()
        .iter()
        .all(|var| exec_ctx.bindings.contains_key(var));

    if fully_bound {
        match simplified.eval_num(&exec_ctx.bindings) {
            Ok(value) => println!("{value}"),
            Err(error) => {
                println!("Error: {error}");
                return Some(ExecResult::Error);
            }
        }
    } else {
        println!("{}", render(&simplified, exec_ctx));
    }
    None
}

fn eval_command(command: &str, exec_ctx: &mut ExecContext) -> Option<ExecResult> {
    let Some(kind) = command.chars().next() else {
        return None;
    };
    let args = command[kind.len_utf8()..].trim();

    match kind {
        'q' => return Some(ExecResult::Exit),
        'h' => print_help(),
        'l' => list_bindings(&exec_ctx.bindings),
        'r' => {
            exec_ctx.bindings.clear();
            println!("Cleared all bindings");
        }
        'd' => command_derivative(args, exec_ctx),
        'i' => command_integrate(args),
        'u' => {
            exec_ctx.unicode_exponents = !exec_ctx.unicode_exponents;
            if exec_ctx.unicode_exponents {
                println!("Printing exponents as superscripts");
            } else {
                println!("Printing exponents with ^");
            }
        }
        's' => command_solve(args),
        'g' => command_system(args),
        't' => command_table(args),
        _ => println!("Unknown command type {kind}. Ignoring"),
    }

    None
}

fn command_derivative(args: &str, exec_ctx: &ExecContext) {
    let Some((var, source)) = args.split_once(' ') else {
        println!("Usage: :d var expr");
        return;
    };

    let preparsed = preparse(source.to_owned());
    match parse(&preparsed) {
        Ok(exp) => match derivative(&exp, var.trim()) {
            Ok(dexp) => println!("{}", render(&dexp.simplify(), exec_ctx)),
            Err(error) => println!("Error: {error}"),
        },
        Err(error) => error.pretty_print(&preparsed),
    }
}

fn command_integrate(args: &str) {
    let mut parts = args.splitn(4, ' ');
    let (Some(var), Some(lo), Some(hi), Some(source)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        println!("Usage: :i var lower upper expr");
        return;
    };
    let (Ok(lower), Ok(upper)) = (lo.parse::<f64>(), hi.parse::<f64>()) else {
        println!("Bounds must be numbers");
        return;
    };

    match integrate(source, var, lower, upper) {
        Ok(integral) => {
            for step in &integral.steps {
                println!("{step}");
            }
            println!("= {:.6}", integral.value);
        }
        Err(error) => println!("Error: {error}"),
    }
}

fn command_solve(args: &str) {
    match solve_equation(args, "x") {
        Ok((outcome, steps)) => {
            for step in steps {
                println!("{step}");
            }
            println!("{outcome}");
        }
        Err(error) => println!("Error: {error}"),
    }
}

fn command_system(args: &str) {
    let text = args.split(';').map(str::trim).join("\n");
    match solve_system(&text, ("x", "y")) {
        Ok((solution, steps)) => {
            for step in steps {
                println!("{step}");
            }
            println!("{solution}");
        }
        Err(error) => println!("Error: {error}"),
    }
}

fn command_table(args: &str) {
    let mut parts = args.split_whitespace();
    let Some(path) = parts.next() else {
        println!("Usage: :t path [delimiter]");
        return;
    };
    let delimiter = parts
        .next()
        .and_then(|part| part.chars().next())
        .unwrap_or(',');

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(error) => {
            println!("Cannot open file: {error}");
            return;
        }
    };

    match parse_table(&raw, delimiter) {
        Ok(table) => {
            println!("{} columns, {} rows", table.headers.len(), table.rows.len());
            for header in &table.headers {
                let stats = table
                    .numeric_column(header)
                    .filter(|column| !column.is_empty())
                    .and_then(|column| summarize(&column));
                match stats {
                    Some(summary) => println!("{header}: {summary}"),
                    None => println!("{header}: no numeric data"),
                }
            }
        }
        Err(error) => println!("Error: {error}"),
    }
}

fn list_bindings(bindings: &HashMap<String, f64>) {
    if bindings.is_empty() {
        println!("No bindings defined");
        return;
    }
    for (name, value) in bindings.iter().sorted_by_key(|(name, _)| *name) {
        println!("  {name: <6} = {value}");
    }
}

fn print_help() {
    println!(
        "Calcite, a calculator that shows its work

To use the REPL, type an expression and it will be simplified and,
when every variable is bound, evaluated.
Use := to define variables.

Commands:
  :q                   quit
  :h                   this help
  :l                   list bindings
  :r                   reset bindings
  :d var expr          derivative of expr with respect to var
  :i var lo hi expr    definite integral with steps
  :s equation          solve a linear equation in x
  :g eq1; eq2          solve a 2x2 linear system in x and y
  :t path [delimiter]  summarise a delimited data file
  :u                   toggle unicode exponents"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unicode_exponents_follow_the_setting() {
        let exp: Exp = "x^2".parse().unwrap();
        let mut exec_ctx = ExecContext::default();
        assert_eq!(render(&exp, &exec_ctx), "x^2");

        exec_ctx.unicode_exponents = true;
        assert_eq!(render(&exp, &exec_ctx), "x²");
    }
}
