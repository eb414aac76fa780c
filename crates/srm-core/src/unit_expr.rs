//! Parser for unit annotations such as `kg/m^3`, `J/kg/K`, `1/(m/s)` or `-`.
//!
//! Grammar (left-associative `*` and `/`):
//!
//! ```text
//! expr   := power (('*' | '·' | '/') power)*
//! power  := atom ('^' exponent)?
//! atom   := '(' expr ')' | number | symbol
//! ```
//!
//! Symbols are a base or derived SI unit with an optional SI prefix.

use crate::dimension::Dimension;
use crate::error::{CoreError, CoreResult};
use crate::units::Measured;
use core::ops::{Div, Mul};

/// Scale factor to SI plus the physical dimension of a unit expression.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Unit {
    /// Multiply a value in this unit by `factor` to get SI.
    pub factor: f64,
    pub dimension: Dimension,
}

impl Unit {
    pub const ONE: Unit = Unit {
        factor: 1.0,
        dimension: Dimension::DIMENSIONLESS,
    };

    pub const fn new(factor: f64, dimension: Dimension) -> Self {
        Self { factor, dimension }
    }

    pub fn powf(self, e: f64) -> Self {
        Self::new(self.factor.powf(e), self.dimension.powf(e))
    }

    pub fn to_si(&self, value: f64) -> f64 {
        value * self.factor
    }

    pub fn from_si(&self, value: f64) -> f64 {
        value / self.factor
    }

    /// Attach this unit to a number, producing an SI value.
    pub fn measure(&self, value: f64) -> Measured {
        Measured::new(self.to_si(value), self.dimension)
    }
}

impl Mul for Unit {
    type Output = Unit;

    fn mul(self, rhs: Unit) -> Unit {
        Unit::new(self.factor * rhs.factor, self.dimension * rhs.dimension)
    }
}

impl Div for Unit {
    type Output = Unit;

    fn div(self, rhs: Unit) -> Unit {
        Unit::new(self.factor / rhs.factor, self.dimension / rhs.dimension)
    }
}

const SYMBOLS: &[(&str, f64, Dimension)] = &[
    ("m", 1.0, Dimension::LENGTH),
    ("g", 1e-3, Dimension::MASS),
    ("s", 1.0, Dimension::TIME),
    ("min", 60.0, Dimension::TIME),
    ("K", 1.0, Dimension::TEMPERATURE),
    ("N", 1.0, Dimension::FORCE),
    ("Pa", 1.0, Dimension::PRESSURE),
    ("bar", 1e5, Dimension::PRESSURE),
    ("atm", 101_325.0, Dimension::PRESSURE),
    ("J", 1.0, Dimension::ENERGY),
    ("W", 1.0, Dimension::POWER),
];

const PREFIXES: &[(&str, f64)] = &[
    ("G", 1e9),
    ("M", 1e6),
    ("k", 1e3),
    ("c", 1e-2),
    ("m", 1e-3),
    ("u", 1e-6),
    ("µ", 1e-6),
    ("μ", 1e-6),
    ("n", 1e-9),
];

/// Parse a unit annotation into its SI factor and dimension.
///
/// `""`, `"-"` and `"1"` are dimensionless.
pub fn parse_unit(input: &str) -> CoreResult<Unit> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(Unit::ONE);
    }
    Parser::new(trimmed).parse()
}

/// Parse `"<number> <unit>"` (e.g. `"1000 kPa"`, `"10 cm^2"`, `"0.5"`) into an SI value.
pub fn parse_value(input: &str) -> CoreResult<Measured> {
    let trimmed = input.trim();
    let (number, unit) = match trimmed.split_once(char::is_whitespace) {
        Some((number, unit)) => (number, unit),
        None => (trimmed, ""),
    };
    let value: f64 = number.parse().map_err(|_| CoreError::ValueParse {
        input: input.to_string(),
        reason: format!("'{number}' is not a number"),
    })?;
    if !value.is_finite() {
        return Err(CoreError::ValueParse {
            input: input.to_string(),
            reason: "value is not finite".to_string(),
        });
    }
    let unit = parse_unit(unit)?;
    Ok(unit.measure(value))
}

fn lookup_symbol(input: &str, symbol: &str) -> CoreResult<Unit> {
    let exact = |s: &str| {
        SYMBOLS
            .iter()
            .find(|(name, _, _)| *name == s)
            .map(|&(_, factor, dim)| Unit::new(factor, dim))
    };

    if let Some(unit) = exact(symbol) {
        return Ok(unit);
    }
    for (prefix, scale) in PREFIXES {
        if let Some(rest) = symbol.strip_prefix(prefix) {
            if let Some(unit) = exact(rest) {
                return Ok(Unit::new(unit.factor * scale, unit.dimension));
            }
        }
    }
    Err(CoreError::UnknownUnit {
        input: input.to_string(),
        symbol: symbol.to_string(),
    })
}

struct Parser<'a> {
    input: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> CoreResult<Unit> {
        let unit = self.expr()?;
        self.skip_ws();
        if let Some(c) = self.peek() {
            return Err(self.error(format!("unexpected '{c}'")));
        }
        Ok(unit)
    }

    fn expr(&mut self) -> CoreResult<Unit> {
        let mut acc = self.power()?;
        loop {
            self.skip_ws();
            match self.peek() {
                Some('*') | Some('·') => {
                    self.pos += 1;
                    acc = acc * self.power()?;
                }
                Some('/') => {
                    self.pos += 1;
                    acc = acc / self.power()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn power(&mut self) -> CoreResult<Unit> {
        let base = self.atom()?;
        self.skip_ws();
        if self.peek() == Some('^') {
            self.pos += 1;
            let e = self.exponent()?;
            return Ok(base.powf(e));
        }
        Ok(base)
    }

    fn exponent(&mut self) -> CoreResult<f64> {
        self.skip_ws();
        if self.peek() == Some('(') {
            self.pos += 1;
            let e = self.signed_number()?;
            self.expect(')')?;
            return Ok(e);
        }
        self.signed_number()
    }

    fn atom(&mut self) -> CoreResult<Unit> {
        self.skip_ws();
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                let inner = self.expr()?;
                self.expect(')')?;
                Ok(inner)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => {
                let factor = self.number()?;
                Ok(Unit::new(factor, Dimension::DIMENSIONLESS))
            }
            Some(c) if c.is_alphabetic() => {
                let start = self.pos;
                while self.peek().is_some_and(char::is_alphabetic) {
                    self.pos += 1;
                }
                let symbol: String = self.chars[start..self.pos].iter().collect();
                lookup_symbol(self.input, &symbol)
            }
            Some(c) => Err(self.error(format!("unexpected '{c}'"))),
            None => Err(self.error("unexpected end of input".to_string())),
        }
    }

    fn signed_number(&mut self) -> CoreResult<f64> {
        self.skip_ws();
        let sign = match self.peek() {
            Some('-') => {
                self.pos += 1;
                -1.0
            }
            Some('+') => {
                self.pos += 1;
                1.0
            }
            _ => 1.0,
        };
        Ok(sign * self.number()?)
    }

    fn number(&mut self) -> CoreResult<f64> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_digit() || c == '.')
        {
            self.pos += 1;
        }
        // Scientific notation only when a digit (optionally signed) follows the 'e'.
        if matches!(self.peek(), Some('e') | Some('E')) {
            let after = self.chars.get(self.pos + 1).copied();
            let after2 = self.chars.get(self.pos + 2).copied();
            let digit_follows = match after {
                Some(c) if c.is_ascii_digit() => true,
                Some('-') | Some('+') => after2.is_some_and(|c| c.is_ascii_digit()),
                _ => false,
            };
            if digit_follows {
                self.pos += 2;
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.pos += 1;
                }
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map_err(|_| self.error(format!("expected a number, found '{text}'")))
    }

    fn expect(&mut self, want: char) -> CoreResult<()> {
        self.skip_ws();
        if self.peek() == Some(want) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{want}'")))
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, reason: String) -> CoreError {
        CoreError::UnitParse {
            input: self.input.to_string(),
            reason: format!("{reason} at position {}", self.pos),
        }
    }
}
