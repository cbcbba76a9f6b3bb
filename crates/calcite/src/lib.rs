pub mod ast;
pub mod calculus;
pub mod display;
pub mod eval;
pub mod parse;
pub mod series;
pub mod simplify;
pub mod solve;
pub mod table;
