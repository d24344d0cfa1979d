//! Dice rolling value objects and parsing
//!
//! Supports dice formulas like "1d20+5", "2d6-1", "d8", and bare side counts
//! such as "20" which mean a single die of that size.
//!
//! The domain layer never owns a random source. Rolling takes a closure
//! `FnMut(min, max) -> i32` returning a uniform value in the inclusive range,
//! which the engine backs with its `RandomPort`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error when parsing a dice formula
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiceParseError {
    /// The formula string is empty
    #[error("Empty dice formula")]
    Empty,
    /// Invalid format - expected N, XdY or XdY+Z
    #[error("Invalid dice format: {0}")]
    InvalidFormat(String),
    /// Dice count must be at least 1
    #[error("Dice count must be at least 1")]
    InvalidDiceCount,
    /// Die size must be at least 1
    #[error("Die size must be at least 1")]
    InvalidDieSize,
}

/// A parsed dice formula like "2d6+3"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiceFormula {
    /// Number of dice to roll (X in XdY)
    pub dice_count: u8,
    /// Size of each die (Y in XdY)
    pub die_size: u8,
    /// Modifier to add/subtract after rolling (+Z or -Z)
    pub modifier: i32,
}

impl DiceFormula {
    /// Create a new dice formula
    pub fn new(dice_count: u8, die_size: u8, modifier: i32) -> Result<Self, DiceParseError> {
        if dice_count == 0 {
            return Err(DiceParseError::InvalidDiceCount);
        }
        if die_size == 0 {
            return Err(DiceParseError::InvalidDieSize);
        }
        Ok(Self {
            dice_count,
            die_size,
            modifier,
        })
    }

    /// A single die with the given number of sides, e.g. `die(20)` is "1d20".
    pub const fn die(die_size: u8) -> Self {
        Self {
            dice_count: 1,
            die_size,
            modifier: 0,
        }
    }

    /// Compile-time constructor for static tables. Callers guarantee
    /// `dice_count >= 1` and `die_size >= 1`.
    pub const fn fixed(dice_count: u8, die_size: u8, modifier: i32) -> Self {
        Self {
            dice_count,
            die_size,
            modifier,
        }
    }

    /// Same formula with an extra flat modifier.
    pub fn plus(self, extra: i32) -> Self {
        Self {
            modifier: self.modifier + extra,
            ..self
        }
    }

    /// Parse a dice formula string.
    ///
    /// Supported formats:
    /// - "N" - Roll one die of size N
    /// - "XdY" - Roll X dice of size Y
    /// - "XdY+Z" / "XdY-Z" - Roll X dice of size Y with a flat modifier
    /// - "dY" - Roll 1 die of size Y (shorthand)
    pub fn parse(input: &str) -> Result<Self, DiceParseError> {
        let input = input.trim().to_lowercase();
        if input.is_empty() {
            return Err(DiceParseError::Empty);
        }

        let Some(d_pos) = input.find('d') else {
            // Bare integer: one die of that many sides
            let sides: u8 = input.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Missing 'd' separator in '{}'", input))
            })?;
            return Self::new(1, sides, 0);
        };

        let dice_count_str = &input[..d_pos];
        let dice_count: u8 = if dice_count_str.is_empty() {
            1
        } else {
            dice_count_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid dice count: '{}'", dice_count_str))
            })?
        };

        let after_d = &input[d_pos + 1..];
        let (die_size_str, modifier) = if let Some(plus_pos) = after_d.find('+') {
            let mod_str = &after_d[plus_pos + 1..];
            let modifier: i32 = mod_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid modifier: '+{}'", mod_str))
            })?;
            (&after_d[..plus_pos], modifier)
        } else if let Some(minus_pos) = after_d.find('-') {
            let mod_str = &after_d[minus_pos + 1..];
            let modifier: i32 = mod_str.parse().map_err(|_| {
                DiceParseError::InvalidFormat(format!("Invalid modifier: '-{}'", mod_str))
            })?;
            (&after_d[..minus_pos], -modifier)
        } else {
            (after_d, 0)
        };

        let die_size: u8 = die_size_str.parse().map_err(|_| {
            DiceParseError::InvalidFormat(format!("Invalid die size: '{}'", die_size_str))
        })?;

        Self::new(dice_count, die_size, modifier)
    }

    /// Roll the dice using the injected random source.
    ///
    /// `rng(min, max)` must return a value in `[min, max]`.
    pub fn roll_with(&self, mut rng: impl FnMut(i32, i32) -> i32) -> DiceRollResult {
        let individual_rolls: Vec<i32> = (0..self.dice_count)
            .map(|_| rng(1, self.die_size as i32))
            .collect();
        let dice_total: i32 = individual_rolls.iter().sum();

        DiceRollResult {
            formula: *self,
            individual_rolls,
            dice_total,
            total: dice_total + self.modifier,
        }
    }

    /// Roll and return only the total.
    pub fn roll_total(&self, rng: impl FnMut(i32, i32) -> i32) -> i32 {
        self.roll_with(rng).total
    }

    /// Get the minimum possible roll
    pub fn min_roll(&self) -> i32 {
        self.dice_count as i32 + self.modifier
    }

    /// Get the maximum possible roll
    pub fn max_roll(&self) -> i32 {
        (self.dice_count as i32 * self.die_size as i32) + self.modifier
    }

    /// Format as a display string (e.g., "1d20+5")
    pub fn display(&self) -> String {
        match self.modifier {
            0 => format!("{}d{}", self.dice_count, self.die_size),
            m if m > 0 => format!("{}d{}+{}", self.dice_count, self.die_size, m),
            m => format!("{}d{}{}", self.dice_count, self.die_size, m),
        }
    }
}

impl fmt::Display for DiceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl FromStr for DiceFormula {
    type Err = DiceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DiceFormula {
    type Error = DiceParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DiceFormula> for String {
    fn from(value: DiceFormula) -> Self {
        value.display()
    }
}

/// Result of rolling dice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRollResult {
    /// The formula that was rolled
    pub formula: DiceFormula,
    /// Individual die results
    pub individual_rolls: Vec<i32>,
    /// Sum of dice before modifier
    pub dice_total: i32,
    /// Final total (dice_total + modifier)
    pub total: i32,
}

impl DiceRollResult {
    /// Format as a breakdown string (e.g., "1d20(14) + 5 = 19")
    pub fn breakdown(&self) -> String {
        let rolls = if self.individual_rolls.len() == 1 {
            format!("({})", self.individual_rolls[0])
        } else {
            let parts: Vec<String> = self.individual_rolls.iter().map(|r| r.to_string()).collect();
            format!("[{}]", parts.join(", "))
        };
        let base = format!("{}d{}{}", self.formula.dice_count, self.formula.die_size, rolls);
        match self.formula.modifier {
            0 => format!("{} = {}", base, self.total),
            m if m > 0 => format!("{} + {} = {}", base, m, self.total),
            m => format!("{} - {} = {}", base, -m, self.total),
        }
    }

    /// Natural 20 on a single d20
    pub fn is_natural_20(&self) -> bool {
        self.formula.die_size == 20
            && self.formula.dice_count == 1
            && self.individual_rolls.first() == Some(&20)
    }
}

/// Roll an expression given either as a formula or a bare side count.
pub fn roll(expr: &str, rng: impl FnMut(i32, i32) -> i32) -> Result<i32, DiceParseError> {
    Ok(DiceFormula::parse(expr)?.roll_total(rng))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn max_rng(_min: i32, max: i32) -> i32 {
        max
    }

    fn min_rng(min: i32, _max: i32) -> i32 {
        min
    }

    #[test]
    fn test_parse_simple_d20() {
        let formula = DiceFormula::parse("1d20").unwrap();
        assert_eq!(formula, DiceFormula::die(20));
    }

    #[test]
    fn test_parse_shorthand_d20() {
        let formula = DiceFormula::parse("d20").unwrap();
        assert_eq!(formula.dice_count, 1);
        assert_eq!(formula.die_size, 20);
    }

    #[test]
    fn test_parse_bare_integer_is_single_die() {
        let formula = DiceFormula::parse("6").unwrap();
        assert_eq!(formula, DiceFormula::die(6));
    }

    #[test]
    fn test_parse_with_modifiers() {
        let formula = DiceFormula::parse("2d6+3").unwrap();
        assert_eq!((formula.dice_count, formula.die_size, formula.modifier), (2, 6, 3));

        let formula = DiceFormula::parse("1D20-3").unwrap();
        assert_eq!(formula.modifier, -3);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(DiceFormula::parse("  "), Err(DiceParseError::Empty));
        assert!(matches!(
            DiceFormula::parse("abc"),
            Err(DiceParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            DiceFormula::parse("2d6+x"),
            Err(DiceParseError::InvalidFormat(_))
        ));
        assert_eq!(DiceFormula::parse("0d20"), Err(DiceParseError::InvalidDiceCount));
        assert_eq!(DiceFormula::parse("1d0"), Err(DiceParseError::InvalidDieSize));
    }

    #[test]
    fn test_roll_bounds() {
        let formula = DiceFormula::parse("3d6+2").unwrap();
        assert_eq!(formula.roll_total(max_rng), formula.max_roll());
        assert_eq!(formula.roll_total(min_rng), formula.min_roll());
        assert_eq!(formula.max_roll(), 20);
        assert_eq!(formula.min_roll(), 5);
    }

    #[test]
    fn test_roll_uses_every_die() {
        let mut calls = 0;
        let result = DiceFormula::parse("4d8").unwrap().roll_with(|_, _| {
            calls += 1;
            calls
        });
        assert_eq!(result.individual_rolls, vec![1, 2, 3, 4]);
        assert_eq!(result.total, 10);
    }

    #[test]
    fn test_roll_free_function() {
        assert_eq!(roll("20", max_rng).unwrap(), 20);
        assert_eq!(roll("1d4+1", min_rng).unwrap(), 2);
        assert!(roll("nope", max_rng).is_err());
    }

    #[test]
    fn test_breakdown() {
        let result = DiceFormula::parse("1d20+5").unwrap().roll_with(|_, _| 14);
        assert_eq!(result.breakdown(), "1d20(14) + 5 = 19");

        let result = DiceFormula::parse("2d6").unwrap().roll_with(|_, _| 3);
        assert_eq!(result.breakdown(), "2d6[3, 3] = 6");
    }

    #[test]
    fn test_serde_as_string() {
        let formula = DiceFormula::parse("2d8-1").unwrap();
        let json = serde_json::to_string(&formula).unwrap();
        assert_eq!(json, "\"2d8-1\"");
        let back: DiceFormula = serde_json::from_str(&json).unwrap();
        assert_eq!(back, formula);
    }
}
