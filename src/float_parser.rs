//! Shared signed-decimal float sub-parser (spec §4.3), used by FREQUENCY
//! and RUNTEST.
//!
//! Grammar: `DIGIT+ ('.' DIGIT+)? ('E' ('+'|'-')? DIGIT+)?`. No leading
//! sign, no empty mantissa, no repeated decimal point — matching
//! `parse_float()` in `svfparser.cpp`.

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Init,
    Int,
    Frac,
    E,
    Exp,
    Error,
}

/// Parsed pieces of a float literal, kept as separate integer fields (the
/// same representation `struct S_float` uses) rather than an actual `f64`,
/// since the spec treats the value as advisory and never arithmetically
/// combines it with anything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvfFloat {
    pub integer: u64,
    pub fractional_digits: u64,
    /// Count of digits folded into `fractional_digits`, kept separately so
    /// leading zeros in the fraction (e.g. the `05` in `1.05`) aren't lost
    /// when reconstructing an `f64` — `fractional_digits` alone can't tell
    /// `05` from `5`.
    pub fractional_digit_count: u32,
    pub exp_sign: i8,
    pub exp_magnitude: u32,
}

impl Default for SvfFloat {
    fn default() -> Self {
        Self {
            integer: 0,
            fractional_digits: 0,
            fractional_digit_count: 0,
            exp_sign: 1,
            exp_magnitude: 0,
        }
    }
}

impl SvfFloat {
    /// Collapse to an `f64` for logging/advisory use (e.g. `frequency_hz`).
    #[must_use]
    pub fn to_f64(self) -> f64 {
        let frac = self.fractional_digits as f64 / 10f64.powi(self.fractional_digit_count as i32);
        let mantissa = self.integer as f64 + frac;
        mantissa * 10f64.powi(self.exp_sign as i32 * self.exp_magnitude as i32)
    }
}

/// Per-command float sub-parser. One instance is reset (`FloatParser::new`
/// or [`FloatParser::reset`]) at the start of each float literal.
#[derive(Debug, Clone)]
pub struct FloatParser {
    state: State,
    value: SvfFloat,
}

impl Default for FloatParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FloatParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Init,
            value: SvfFloat::default(),
        }
    }

    /// Reset to start a new float literal.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// True once at least one digit has been accepted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !matches!(self.state, State::Init | State::Error)
    }

    #[must_use]
    pub fn value(&self) -> SvfFloat {
        self.value
    }

    /// Feed one character. Returns an error once the grammar is violated;
    /// the caller decides whether that's fatal to the enclosing command.
    pub fn feed(&mut self, c: char) -> Result<(), Error> {
        match self.state {
            State::Init => {
                if c.is_ascii_digit() {
                    self.value.integer = digit(c) as u64;
                    self.state = State::Int;
                    Ok(())
                } else {
                    self.state = State::Error;
                    Err(Error::Syntax {
                        command: "FLOAT",
                        detail: format!("expected digit, got '{c}'"),
                    })
                }
            }
            State::Int => match c {
                '0'..='9' => {
                    self.value.integer = self.value.integer * 10 + digit(c) as u64;
                    Ok(())
                }
                '.' => {
                    self.state = State::Frac;
                    Ok(())
                }
                'E' => {
                    self.state = State::E;
                    Ok(())
                }
                _ => {
                    self.state = State::Error;
                    Err(Error::Syntax {
                        command: "FLOAT",
                        detail: format!("unexpected '{c}' after integer part"),
                    })
                }
            },
            State::Frac => match c {
                '0'..='9' => {
                    self.value.fractional_digits = self.value.fractional_digits * 10 + digit(c) as u64;
                    self.value.fractional_digit_count += 1;
                    Ok(())
                }
                'E' => {
                    self.state = State::E;
                    Ok(())
                }
                _ => {
                    self.state = State::Error;
                    Err(Error::Syntax {
                        command: "FLOAT",
                        detail: format!("unexpected '{c}' after fraction"),
                    })
                }
            },
            State::E => match c {
                '0'..='9' => {
                    self.value.exp_magnitude = self.value.exp_magnitude * 10 + digit(c) as u32;
                    self.state = State::Exp;
                    Ok(())
                }
                '+' => {
                    self.value.exp_sign = 1;
                    self.state = State::Exp;
                    Ok(())
                }
                '-' => {
                    self.value.exp_sign = -1;
                    self.state = State::Exp;
                    Ok(())
                }
                _ => {
                    self.state = State::Error;
                    Err(Error::Syntax {
                        command: "FLOAT",
                        detail: format!("unexpected '{c}' after 'E'"),
                    })
                }
            },
            State::Exp => {
                if c.is_ascii_digit() {
                    self.value.exp_magnitude = self.value.exp_magnitude * 10 + digit(c) as u32;
                    Ok(())
                } else {
                    self.state = State::Error;
                    Err(Error::Syntax {
                        command: "FLOAT",
                        detail: format!("unexpected '{c}' in exponent"),
                    })
                }
            }
            State::Error => Err(Error::Syntax {
                command: "FLOAT",
                detail: "parser already in error state".into(),
            }),
        }
    }
}

fn digit(c: char) -> u8 {
    c as u8 - b'0'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> FloatParser {
        let mut p = FloatParser::new();
        for c in s.chars() {
            p.feed(c).unwrap();
        }
        p
    }

    #[test]
    fn plain_integer() {
        let p = parse("42");
        assert_eq!(p.value().integer, 42);
        assert_eq!(p.value().fractional_digits, 0);
    }

    #[test]
    fn fraction_and_exponent() {
        let p = parse("1.5E-3");
        let v = p.value();
        assert_eq!(v.integer, 1);
        assert_eq!(v.fractional_digits, 5);
        assert_eq!(v.exp_sign, -1);
        assert_eq!(v.exp_magnitude, 3);
        assert!((v.to_f64() - 1.5e-3).abs() < 1e-12);
    }

    #[test]
    fn fraction_keeps_leading_zero() {
        let p = parse("1.05");
        let v = p.value();
        assert_eq!(v.fractional_digits, 5);
        assert_eq!(v.fractional_digit_count, 2);
        assert!((v.to_f64() - 1.05).abs() < 1e-12);
    }

    #[test]
    fn rejects_leading_dot() {
        let mut p = FloatParser::new();
        assert!(p.feed('.').is_err());
    }

    #[test]
    fn rejects_double_dot() {
        let mut p = FloatParser::new();
        p.feed('1').unwrap();
        p.feed('.').unwrap();
        p.feed('2').unwrap();
        assert!(p.feed('.').is_err());
    }
}
