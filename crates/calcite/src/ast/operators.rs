use std::{cell::LazyCell, collections::HashMap};
use strum::{EnumIter, IntoEnumIterator};

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum Associativity {
    Left,
    Right,
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy)]
pub enum Infix {
    Dyadic(DyadicOp),
    Assoc(AssocOp),
}

impl Infix {
    pub fn symbol(self) -> char {
        match self {
            Self::Dyadic(op) => op.symbol(),
            Self::Assoc(op) => op.symbol(),
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Self::Dyadic(op) => op.precedence(),
            Self::Assoc(op) => op.precedence(),
        }
    }

    pub fn precedence_associativity(prec: u8) -> Associativity {
        // Exponentiation is the only right-associative level
        match prec {
            10 => Associativity::Right,
            _ => Associativity::Left,
        }
    }
}

#[derive(Debug, Hash, PartialEq, Eq, Clone, Copy, EnumIter)]
pub enum DyadicOp {
    Pow,
}

impl DyadicOp {
    pub fn precedence(self) -> u8 {
        match self {
            Self::Pow => 10,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Self::Pow => '^',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum AssocOp {
    Add,
    Mul,
}

impl AssocOp {
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Mul => '*',
        }
    }

    pub fn precedence(self) -> u8 {
        match self {
            Self::Add => 7,
            Self::Mul => 8,
        }
    }
}

thread_local! {
    static CHAR_INFIX_MAP: LazyCell<HashMap<char, Infix>> = LazyCell::new(|| {
        let mut map = HashMap::new();
        for op in DyadicOp::iter() {
            map.insert(op.symbol(), Infix::Dyadic(op));
        }
        for op in AssocOp::iter() {
            map.insert(op.symbol(), Infix::Assoc(op));
        }
        map.insert('-', Infix::Assoc(AssocOp::Add));
        map.insert('/', Infix::Assoc(AssocOp::Mul));
        map
    });
}

pub fn infix_from_char(c: char) -> Option<Infix> {
    CHAR_INFIX_MAP.with(|map| map.get(&c).copied())
}
