//! Runtime physical dimensions.
//!
//! `uom` checks dimensions at compile time, but constraints are assembled at
//! runtime from a declarative table, so homogeneity has to be checked on
//! values. Exponents are real because power laws (burn rate ~ P^0.35) carry
//! fractional dimensions through intermediate terms.

use core::fmt;
use core::ops::{Div, Mul};

/// Exponent tolerance when comparing dimensions.
const EXPONENT_EPS: f64 = 1e-9;

/// Exponents over the SI base dimensions used by the models.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Dimension {
    pub length: f64,
    pub mass: f64,
    pub time: f64,
    pub temperature: f64,
}

impl Dimension {
    pub const DIMENSIONLESS: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const LENGTH: Self = Self::new(1.0, 0.0, 0.0, 0.0);
    pub const MASS: Self = Self::new(0.0, 1.0, 0.0, 0.0);
    pub const TIME: Self = Self::new(0.0, 0.0, 1.0, 0.0);
    pub const TEMPERATURE: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const AREA: Self = Self::new(2.0, 0.0, 0.0, 0.0);
    pub const VOLUME: Self = Self::new(3.0, 0.0, 0.0, 0.0);
    pub const VELOCITY: Self = Self::new(1.0, 0.0, -1.0, 0.0);
    pub const MASS_RATE: Self = Self::new(0.0, 1.0, -1.0, 0.0);
    pub const DENSITY: Self = Self::new(-3.0, 1.0, 0.0, 0.0);
    pub const FORCE: Self = Self::new(1.0, 1.0, -2.0, 0.0);
    pub const PRESSURE: Self = Self::new(-1.0, 1.0, -2.0, 0.0);
    pub const ENERGY: Self = Self::new(2.0, 1.0, -2.0, 0.0);
    pub const POWER: Self = Self::new(2.0, 1.0, -3.0, 0.0);
    /// J/kg
    pub const SPECIFIC_ENERGY: Self = Self::new(2.0, 0.0, -2.0, 0.0);
    /// J/kg/K
    pub const SPECIFIC_HEAT: Self = Self::new(2.0, 0.0, -2.0, -1.0);

    pub const fn new(length: f64, mass: f64, time: f64, temperature: f64) -> Self {
        Self {
            length,
            mass,
            time,
            temperature,
        }
    }

    pub fn powf(self, e: f64) -> Self {
        Self::new(
            self.length * e,
            self.mass * e,
            self.time * e,
            self.temperature * e,
        )
    }

    pub fn recip(self) -> Self {
        self.powf(-1.0)
    }

    pub fn is_dimensionless(&self) -> bool {
        self.approx_eq(&Self::DIMENSIONLESS)
    }

    /// Exponent-wise equality up to a small tolerance.
    pub fn approx_eq(&self, other: &Self) -> bool {
        self.exponents()
            .iter()
            .zip(other.exponents().iter())
            .all(|(a, b)| (a - b).abs() <= EXPONENT_EPS)
    }

    fn exponents(&self) -> [f64; 4] {
        [self.mass, self.length, self.time, self.temperature]
    }
}

impl Mul for Dimension {
    type Output = Dimension;

    fn mul(self, rhs: Dimension) -> Dimension {
        Dimension::new(
            self.length + rhs.length,
            self.mass + rhs.mass,
            self.time + rhs.time,
            self.temperature + rhs.temperature,
        )
    }
}

impl Div for Dimension {
    type Output = Dimension;

    fn div(self, rhs: Dimension) -> Dimension {
        self * rhs.recip()
    }
}

impl fmt::Display for Dimension {
    /// Renders in SI base units, e.g. `kg·m^-1·s^-2`; dimensionless is `-`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SYMBOLS: [&str; 4] = ["kg", "m", "s", "K"];
        let mut wrote = false;
        for (symbol, exp) in SYMBOLS.iter().zip(self.exponents()) {
            if exp.abs() <= EXPONENT_EPS {
                continue;
            }
            if wrote {
                write!(f, "·")?;
            }
            if (exp - 1.0).abs() <= EXPONENT_EPS {
                write!(f, "{symbol}")?;
            } else if (exp - exp.round()).abs() <= EXPONENT_EPS {
                write!(f, "{symbol}^{}", exp.round() as i64)?;
            } else {
                write!(f, "{symbol}^{exp}")?;
            }
            wrote = true;
        }
        if !wrote {
            write!(f, "-")?;
        }
        Ok(())
    }
}
