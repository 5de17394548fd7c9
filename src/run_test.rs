//! `RUNTEST` sub-parser (spec §4.5): `[run_state] count (TCK|SCK|SEC)
//! [MAXIMUM float SEC] [ENDSTATE state] ;`.
//!
//! Grounded on `cmd_runtest()` in the original C implementation, which
//! classifies each whitespace-delimited token as a TAP state name, one of
//! the five reserved words, or a float, and uses the *previous* token
//! (`trtword_prev`) to decide what a trailing float/`SEC` pair means. This
//! port keeps that same one-token-of-context approach rather than a fixed
//! grammar position, since real SVF streams put `MAXIMUM .. SEC` and the
//! bare run-time `.. SEC` in either order relative to the clock count.

use crate::error::Error;
use crate::float_parser::{FloatParser, SvfFloat};
use crate::tap::TapState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockSource {
    Tck,
    Sck,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Tck,
    Sck,
    Sec,
    Maximum,
    Endstate,
}

impl Keyword {
    fn from_str(s: &str) -> Option<Keyword> {
        match s {
            "TCK" => Some(Keyword::Tck),
            "SCK" => Some(Keyword::Sck),
            "SEC" => Some(Keyword::Sec),
            "MAXIMUM" => Some(Keyword::Maximum),
            "ENDSTATE" => Some(Keyword::Endstate),
            _ => None,
        }
    }
}

/// Parsed `RUNTEST` parameters. Every field is optional because SVF lets
/// a `RUNTEST` specify only what changed since the last one.
#[derive(Debug, Clone, Default)]
pub struct RunTestResult {
    pub run_state: Option<TapState>,
    pub count: Option<SvfFloat>,
    pub clock: Option<ClockSource>,
    pub min_time_sec: Option<SvfFloat>,
    pub max_time_sec: Option<SvfFloat>,
    pub end_state: Option<TapState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Alpha,
    Numeric,
}

#[derive(Debug, Clone)]
pub struct RunTestParser {
    token_kind: Option<TokenKind>,
    name_buf: String,
    float_parser: FloatParser,
    token_index: usize,
    pending_float: Option<SvfFloat>,
    after_maximum: bool,
    expect_endstate: bool,
    result: RunTestResult,
}

impl Default for RunTestParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RunTestParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            token_kind: None,
            name_buf: String::new(),
            float_parser: FloatParser::new(),
            token_index: 0,
            pending_float: None,
            after_maximum: false,
            expect_endstate: false,
            result: RunTestResult::default(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[must_use]
    pub fn result(&self) -> &RunTestResult {
        &self.result
    }

    pub fn feed(&mut self, c: char, name_maxlen: usize) -> Result<(), Error> {
        if c == ' ' {
            return self.end_token();
        }
        match self.token_kind {
            None => {
                if c.is_ascii_digit() {
                    self.token_kind = Some(TokenKind::Numeric);
                    self.float_parser.reset();
                    self.float_parser.feed(c)
                } else if c.is_ascii_alphabetic() {
                    self.token_kind = Some(TokenKind::Alpha);
                    self.name_buf.clear();
                    self.name_buf.push(c);
                    Ok(())
                } else {
                    Err(Error::Syntax {
                        command: "RUNTEST",
                        detail: format!("unexpected '{c}'"),
                    })
                }
            }
            Some(TokenKind::Numeric) => self.float_parser.feed(c),
            Some(TokenKind::Alpha) => {
                if self.name_buf.len() >= name_maxlen {
                    return Err(Error::Semantic(format!(
                        "RUNTEST token longer than {name_maxlen} chars"
                    )));
                }
                self.name_buf.push(c);
                Ok(())
            }
        }
    }

    /// Commit the pending token, if any, then advance the token index.
    fn end_token(&mut self) -> Result<(), Error> {
        match self.token_kind.take() {
            None => Ok(()),
            Some(TokenKind::Numeric) => {
                if self.pending_float.is_some() {
                    return Err(Error::Semantic(
                        "two numbers without an intervening unit keyword".into(),
                    ));
                }
                self.pending_float = Some(self.float_parser.value());
                self.token_index += 1;
                Ok(())
            }
            Some(TokenKind::Alpha) => {
                self.process_alpha_token()?;
                self.token_index += 1;
                Ok(())
            }
        }
    }

    fn process_alpha_token(&mut self) -> Result<(), Error> {
        let name = std::mem::take(&mut self.name_buf);
        let as_state = TapState::from_name(&name);
        let as_kw = Keyword::from_str(&name);

        if as_state.is_some() && as_kw.is_some() {
            return Err(Error::Semantic(format!(
                "'{name}' is ambiguous between a TAP state and a RUNTEST keyword"
            )));
        }

        if self.expect_endstate {
            let state = as_state
                .ok_or_else(|| Error::Semantic(format!("'{name}' is not a TAP state")))?;
            self.result.end_state = Some(state);
            self.expect_endstate = false;
            return Ok(());
        }

        if let Some(kw) = as_kw {
            match kw {
                Keyword::Tck | Keyword::Sck => {
                    let count = self.pending_float.take().ok_or_else(|| {
                        Error::Semantic(format!("{name} without a preceding count"))
                    })?;
                    self.result.count = Some(count);
                    self.result.clock = Some(if kw == Keyword::Tck {
                        ClockSource::Tck
                    } else {
                        ClockSource::Sck
                    });
                }
                Keyword::Sec => {
                    let t = self.pending_float.take().ok_or_else(|| {
                        Error::Semantic("SEC without a preceding time value".into())
                    })?;
                    if self.after_maximum {
                        self.result.max_time_sec = Some(t);
                        self.after_maximum = false;
                    } else {
                        self.result.min_time_sec = Some(t);
                    }
                }
                Keyword::Maximum => self.after_maximum = true,
                Keyword::Endstate => self.expect_endstate = true,
            }
            return Ok(());
        }

        if let Some(state) = as_state {
            if self.token_index == 0 {
                self.result.run_state = Some(state);
                return Ok(());
            }
            return Err(Error::Semantic(format!(
                "unexpected TAP state name '{name}' mid-RUNTEST"
            )));
        }

        Err(Error::Semantic(format!(
            "'{name}' is neither a TAP state nor a RUNTEST keyword"
        )))
    }

    /// Commit a trailing token with no separator before `;`.
    pub fn finish(&mut self) -> Result<(), Error> {
        self.end_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> RunTestResult {
        let mut p = RunTestParser::new();
        for c in s.chars() {
            p.feed(c, 9).unwrap();
        }
        p.finish().unwrap();
        p.result().clone()
    }

    #[test]
    fn count_and_clock() {
        let r = parse("100 TCK");
        assert_eq!(r.count.unwrap().integer, 100);
        assert_eq!(r.clock, Some(ClockSource::Tck));
    }

    #[test]
    fn min_time_then_maximum_and_endstate() {
        let r = parse("100 TCK 1.0E-3 SEC MAXIMUM 10.0E-3 SEC ENDSTATE IDLE");
        assert_eq!(r.clock, Some(ClockSource::Tck));
        assert_eq!(r.min_time_sec.unwrap().integer, 1);
        assert_eq!(r.max_time_sec.unwrap().integer, 10);
        assert_eq!(r.end_state, Some(TapState::Idle));
    }

    #[test]
    fn leading_run_state() {
        let r = parse("IDLE 100 SCK");
        assert_eq!(r.run_state, Some(TapState::Idle));
        assert_eq!(r.clock, Some(ClockSource::Sck));
    }

    #[test]
    fn bare_sec_without_count_is_error() {
        let mut p = RunTestParser::new();
        for c in "SEC".chars() {
            p.feed(c, 9).unwrap();
        }
        assert!(p.finish().is_err());
    }
}
