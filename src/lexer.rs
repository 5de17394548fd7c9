//! Packet-resumable lexer (spec §4.1): strips comments, collapses
//! whitespace, tracks paren nesting, and upper-cases everything it forwards.
//!
//! Grounded on the `LS_SPACE`/`LS_SLASH`/`LS_COMMENT`/`LS_TEXT` states of
//! `parse_svf_packet()` in the original C implementation. Unlike that
//! function, which interleaves lexing with dispatch in one big loop, this
//! lexer only emits [`LexEvent`]s; [`crate::dispatcher::Dispatcher`] owns
//! everything downstream of a token boundary.

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Space,
    Slash,
    Comment,
    Text,
}

/// What the lexer hands to the dispatcher for one input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexEvent {
    /// An upper-cased, non-whitespace, non-comment character.
    Text(char),
    /// A word boundary: one or more whitespace bytes outside parens, or a
    /// comment, collapsed to a single separator.
    Sep,
}

/// Streaming lexer. Persists `state` and `paren_depth` across [`Lexer::feed`]
/// calls so a stream can be lexed one packet at a time (spec §5, P2).
#[derive(Debug, Clone)]
pub struct Lexer {
    state: State,
    paren_depth: u32,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: State::Space,
            paren_depth: 0,
        }
    }

    /// Called by the owning parser on stream reset (`offset == 0`).
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed one input byte. Returns at most one event; whitespace runs and
    /// comments collapse to `None` or a single trailing [`LexEvent::Sep`].
    ///
    /// A lone `/` not followed by a second `/` is a [`Error::Lexical`]; the
    /// lexer drops the offending byte and resumes at [`State::Space`] rather
    /// than aborting the stream.
    ///
    /// `!` and `//` start a comment unconditionally, even inside parens,
    /// matching the original's unconditional `switch(c)` handling of both
    /// cases; only whitespace-collapsing is gated on paren depth.
    pub fn feed(&mut self, byte: u8) -> Result<Option<LexEvent>, Error> {
        let c = (byte as char).to_ascii_uppercase();
        let is_ws = matches!(byte, b' ' | b'\t' | b'\n' | b'\r');

        if self.state == State::Comment {
            if byte == b'\n' {
                self.state = State::Space;
            }
            return Ok(None);
        }

        if self.state == State::Slash {
            if byte == b'/' {
                self.state = State::Comment;
                return Ok(None);
            }
            self.state = State::Space;
            return Err(Error::Lexical(format!("lone '/' followed by '{c}'")));
        }

        if byte == b'!' {
            let was_text = self.state == State::Text;
            self.state = State::Comment;
            return Ok(was_text.then_some(LexEvent::Sep));
        }
        if byte == b'/' {
            let was_text = self.state == State::Text;
            self.state = State::Slash;
            return Ok(was_text.then_some(LexEvent::Sep));
        }
        if is_ws && self.paren_depth == 0 {
            let was_text = self.state == State::Text;
            self.state = State::Space;
            return Ok(was_text.then_some(LexEvent::Sep));
        }
        if is_ws {
            // Inside parens whitespace is dropped entirely, even mid-word,
            // so hex data spanning packet or line boundaries joins cleanly.
            return Ok(None);
        }

        match byte {
            b'(' => self.paren_depth += 1,
            b')' => self.paren_depth = self.paren_depth.saturating_sub(1),
            _ => {}
        }
        self.state = State::Text;
        Ok(Some(LexEvent::Text(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(s: &str) -> Result<Vec<LexEvent>, Error> {
        let mut l = Lexer::new();
        let mut out = Vec::new();
        for b in s.bytes() {
            if let Some(ev) = l.feed(b)? {
                out.push(ev);
            }
        }
        Ok(out)
    }

    #[test]
    fn strips_bang_comment() {
        let out = lex("AB ! a comment\nCD").unwrap();
        let text: String = out
            .iter()
            .map(|e| match e {
                LexEvent::Text(c) => *c,
                LexEvent::Sep => ' ',
            })
            .collect();
        assert_eq!(text, "AB CD");
    }

    #[test]
    fn strips_slash_slash_comment() {
        let out = lex("SDR // comment\n8").unwrap();
        let text: String = out
            .iter()
            .map(|e| match e {
                LexEvent::Text(c) => *c,
                LexEvent::Sep => ' ',
            })
            .collect();
        assert_eq!(text, "SDR 8");
    }

    #[test]
    fn coalesces_whitespace_runs() {
        let out = lex("A   \t\n  B").unwrap();
        assert_eq!(
            out,
            vec![
                LexEvent::Text('A'),
                LexEvent::Sep,
                LexEvent::Text('B'),
            ]
        );
    }

    #[test]
    fn drops_whitespace_inside_parens() {
        let out = lex("TDI(AB\n  CD)").unwrap();
        let text: String = out
            .iter()
            .filter_map(|e| match e {
                LexEvent::Text(c) => Some(*c),
                LexEvent::Sep => None,
            })
            .collect();
        assert_eq!(text, "TDI(ABCD)");
    }

    #[test]
    fn uppercases_text() {
        let out = lex("sdr").unwrap();
        let text: String = out
            .iter()
            .filter_map(|e| match e {
                LexEvent::Text(c) => Some(*c),
                LexEvent::Sep => None,
            })
            .collect();
        assert_eq!(text, "SDR");
    }

    #[test]
    fn bang_starts_a_comment_even_inside_parens() {
        // Matches the original's unconditional comment detection: `!`
        // inside a paren-nested field still starts a comment, absorbing
        // everything through the next newline.
        let out = lex("TDI(AB!CD\n)").unwrap();
        let text: String = out
            .iter()
            .filter_map(|e| match e {
                LexEvent::Text(c) => Some(*c),
                LexEvent::Sep => None,
            })
            .collect();
        assert_eq!(text, "TDI(AB)");
    }

    #[test]
    fn lone_slash_is_lexical_error_but_resumes() {
        let mut l = Lexer::new();
        assert!(l.feed(b'/').unwrap().is_none());
        assert!(l.feed(b'X').is_err());
        // lexer resumed at Space; next printable char starts a new word.
        assert_eq!(l.feed(b'Y').unwrap(), Some(LexEvent::Text('Y')));
    }

    #[test]
    fn packet_boundary_invariance() {
        let whole = lex("SDR 8 TDI(AB);").unwrap();
        let mut l = Lexer::new();
        let mut split = Vec::new();
        for chunk in ["SDR 8 TDI(", "AB);"] {
            for b in chunk.bytes() {
                if let Some(ev) = l.feed(b).unwrap() {
                    split.push(ev);
                }
            }
        }
        assert_eq!(whole, split);
    }
}
