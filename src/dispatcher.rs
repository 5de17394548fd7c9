//! Command dispatcher (spec §4.2): reserved-word lookup plus routing of
//! `EXEC`-state characters to the matching sub-parser.
//!
//! Grounded on the outer `switch` in `parse_svf_command()` in the original C
//! implementation, which buffers a word until a separator, looks it up in a
//! fixed command table, then calls the matching `cmd_*()` handler for every
//! subsequent character up to `;`. This port keeps that INIT/ACCUM/EXEC
//! shape but folds the original's separate per-command "unknown word" and
//! "sub-parser rejected its input" recoveries into one `Swallow` state:
//! both cases absorb characters up to the next `;` and never abort the
//! stream (spec §7).

use log::warn;

use crate::bit_sequence::{BitSeqParser, ScanKind};
use crate::end_state::EndStateParser;
use crate::error::Error;
use crate::frequency::FrequencyParser;
use crate::lexer::LexEvent;
use crate::run_test::RunTestParser;
use crate::runtime::{CompletedCommand, RuntimeState};
use crate::state_path::StatePathParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DispState {
    Init,
    Accum,
    Exec,
    /// Reached either from an unrecognized command word or from a
    /// sub-parser error; absorbs everything up to the next `;`.
    Swallow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveCommand {
    Scan(ScanKind),
    EndDr,
    EndIr,
    State,
    RunTest,
    Frequency,
    Trst,
    PioMap,
    Pio,
}

/// What a [`Dispatcher::feed`] call accomplished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchStatus {
    /// Still inside a command (or idle between commands).
    Pending,
    /// `;` was seen; [`RuntimeState::completed_command`] names what finished
    /// (`None` for a stray `;` with no preceding command word).
    CommandComplete,
}

/// Command-level FSM sitting between the lexer and the per-command
/// sub-parsers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    state: DispState,
    word_buf: String,
    active: Option<ActiveCommand>,
    bitseq: BitSeqParser,
    end_state: EndStateParser,
    state_path: StatePathParser,
    run_test: RunTestParser,
    frequency: FrequencyParser,
    stub_buf: String,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: DispState::Init,
            word_buf: String::new(),
            active: None,
            bitseq: BitSeqParser::new(),
            end_state: EndStateParser::new(),
            state_path: StatePathParser::new(),
            run_test: RunTestParser::new(),
            frequency: FrequencyParser::new(),
            stub_buf: String::new(),
        }
    }

    /// Called by [`crate::parser::SvfParser`] on stream reset.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Feed one lexer event. Only [`Error::Resource`] ever escapes: every
    /// other error kind is logged, counted in `rt.stats`, and recovered
    /// from by swallowing the rest of the command (spec §7).
    pub fn feed(&mut self, ev: LexEvent, rt: &mut RuntimeState) -> Result<DispatchStatus, Error> {
        rt.completed_command = CompletedCommand::None;

        match ev {
            LexEvent::Text(';') => self.finish_command(rt),
            LexEvent::Text(c) => {
                self.handle_text(c, rt)?;
                Ok(DispatchStatus::Pending)
            }
            LexEvent::Sep => {
                self.handle_sep(rt)?;
                Ok(DispatchStatus::Pending)
            }
        }
    }

    fn handle_text(&mut self, c: char, rt: &mut RuntimeState) -> Result<(), Error> {
        match self.state {
            DispState::Init => {
                self.word_buf.clear();
                self.word_buf.push(c);
                self.state = DispState::Accum;
                Ok(())
            }
            DispState::Accum => {
                if self.word_buf.len() < rt.config.cmds_max_chars {
                    self.word_buf.push(c);
                }
                Ok(())
            }
            DispState::Exec => self.forward(c, rt),
            DispState::Swallow => Ok(()),
        }
    }

    fn handle_sep(&mut self, rt: &mut RuntimeState) -> Result<(), Error> {
        match self.state {
            DispState::Init | DispState::Swallow => Ok(()),
            DispState::Accum => {
                self.enter_exec(rt);
                Ok(())
            }
            DispState::Exec => self.forward(' ', rt),
        }
    }

    /// Look up the buffered word and transition `ACCUM -> EXEC` (or
    /// `Swallow` on a miss), resetting the matching sub-parser and
    /// `BitSequence` command-entry state along the way.
    fn enter_exec(&mut self, rt: &mut RuntimeState) {
        let word = std::mem::take(&mut self.word_buf);
        match classify(&word) {
            Some(cmd) => {
                if cmd == ActiveCommand::Pio {
                    warn!("PIO is unsupported; swallowing its body");
                }
                self.reset_sub_parser(cmd, rt);
                self.active = Some(cmd);
                self.state = DispState::Exec;
            }
            None => {
                rt.stats.unknown_commands += 1;
                warn!("unknown SVF command '{word}'");
                self.active = None;
                self.state = DispState::Swallow;
            }
        }
    }

    fn reset_sub_parser(&mut self, cmd: ActiveCommand, rt: &mut RuntimeState) {
        match cmd {
            ActiveCommand::Scan(kind) => {
                self.bitseq.reset();
                rt.scan_mut(kind).on_command_entry();
            }
            ActiveCommand::EndDr | ActiveCommand::EndIr => self.end_state.reset(),
            ActiveCommand::State => self.state_path.reset(),
            ActiveCommand::RunTest => self.run_test.reset(),
            ActiveCommand::Frequency => self.frequency.reset(),
            ActiveCommand::Trst | ActiveCommand::PioMap | ActiveCommand::Pio => {
                self.stub_buf.clear();
            }
        }
    }

    /// Forward one character to whichever sub-parser is active, converting
    /// a recoverable error into a `Swallow` transition. `Resource` errors
    /// propagate unchanged: they're the one terminal condition.
    fn forward(&mut self, c: char, rt: &mut RuntimeState) -> Result<(), Error> {
        let Some(cmd) = self.active else {
            return Ok(());
        };
        let result = match cmd {
            ActiveCommand::Scan(kind) => {
                let reverse = rt.reverse;
                let config = rt.config;
                let (overruns_before, truncations_before) = {
                    let seq = rt.scan(kind);
                    (seq.overruns, seq.truncations)
                };
                let r = self.bitseq.feed(c, rt.scan_mut(kind), &reverse, &config);
                let (overruns_after, truncations_after) = {
                    let seq = rt.scan(kind);
                    (seq.overruns, seq.truncations)
                };
                rt.stats.overruns += overruns_after - overruns_before;
                rt.stats.truncated_allocs += truncations_after - truncations_before;
                r
            }
            ActiveCommand::EndDr | ActiveCommand::EndIr => {
                self.end_state.feed(c, rt.config.tap_name_maxlen)
            }
            ActiveCommand::State => self.state_path.feed(c, rt.config.tap_name_maxlen),
            ActiveCommand::RunTest => self.run_test.feed(c, rt.config.runtest_name_maxlen),
            ActiveCommand::Frequency => self.frequency.feed(c),
            ActiveCommand::Trst => {
                if c == ' ' {
                    Ok(())
                } else if c.is_ascii_alphabetic() {
                    self.stub_buf.push(c);
                    Ok(())
                } else {
                    Err(Error::Syntax {
                        command: "TRST",
                        detail: format!("unexpected '{c}' in TRST value"),
                    })
                }
            }
            // PIO/PIOMAP are stubs: every byte of the body is swallowed
            // silently (spec §9's supplement: parsed, never driven).
            ActiveCommand::PioMap | ActiveCommand::Pio => Ok(()),
        };

        match result {
            Ok(()) => Ok(()),
            Err(Error::Resource(msg)) => Err(Error::Resource(msg)),
            Err(e) => {
                self.record_error(&e, rt);
                self.state = DispState::Swallow;
                Ok(())
            }
        }
    }

    fn record_error(&self, e: &Error, rt: &mut RuntimeState) {
        match e {
            Error::Syntax { .. } | Error::Lexical(_) => rt.stats.syntax_errors += 1,
            Error::Semantic(_) => rt.stats.semantic_errors += 1,
            Error::Overrun(_) => rt.stats.overruns += 1,
            Error::UnknownCommand(_) | Error::Resource(_) => {}
        }
        warn!("{e}");
    }

    /// Handle `;`: commit whatever the active sub-parser has pending, tag
    /// `rt.completed_command`, and return to `INIT`.
    fn finish_command(&mut self, rt: &mut RuntimeState) -> Result<DispatchStatus, Error> {
        match self.state {
            DispState::Init => return Ok(DispatchStatus::Pending),
            DispState::Accum => self.enter_exec(rt),
            DispState::Exec | DispState::Swallow => {}
        }

        let completed = match (self.state, self.active) {
            (DispState::Swallow, _) | (_, None) => CompletedCommand::None,
            (_, Some(cmd)) => {
                self.commit(cmd, rt)?;
                match cmd {
                    ActiveCommand::Scan(kind) => CompletedCommand::Scan(kind),
                    ActiveCommand::EndDr => CompletedCommand::EndDr,
                    ActiveCommand::EndIr => CompletedCommand::EndIr,
                    ActiveCommand::State => CompletedCommand::State,
                    ActiveCommand::RunTest => CompletedCommand::RunTest,
                    ActiveCommand::Frequency => CompletedCommand::Frequency,
                    ActiveCommand::Trst => CompletedCommand::Trst,
                    ActiveCommand::PioMap => CompletedCommand::PioMap,
                    ActiveCommand::Pio => CompletedCommand::Pio,
                }
            }
        };

        rt.completed_command = completed;
        self.active = None;
        self.state = DispState::Init;
        Ok(DispatchStatus::CommandComplete)
    }

    /// Flush a sub-parser's pending trailing token and copy its result into
    /// `rt`. A `finish()` error is recorded the same way a mid-command one
    /// is; the command still counts as complete since `;` was reached.
    fn commit(&mut self, cmd: ActiveCommand, rt: &mut RuntimeState) -> Result<(), Error> {
        match cmd {
            ActiveCommand::Scan(kind) => {
                let config = rt.config;
                match self.bitseq.finish(rt.scan_mut(kind), &config) {
                    Ok(()) => {}
                    Err(Error::Resource(msg)) => return Err(Error::Resource(msg)),
                    Err(e) => self.record_error(&e, rt),
                }
            }
            ActiveCommand::EndDr => match self.end_state.finish() {
                Ok(()) => {
                    if let Some(s) = self.end_state.result() {
                        rt.end_state_dr = s;
                    }
                }
                Err(e) => self.record_error(&e, rt),
            },
            ActiveCommand::EndIr => match self.end_state.finish() {
                Ok(()) => {
                    if let Some(s) = self.end_state.result() {
                        rt.end_state_ir = s;
                    }
                }
                Err(e) => self.record_error(&e, rt),
            },
            ActiveCommand::State => match self.state_path.finish() {
                Ok(()) => rt.state_path = self.state_path.path().to_vec(),
                Err(e) => self.record_error(&e, rt),
            },
            ActiveCommand::RunTest => match self.run_test.finish() {
                Ok(()) => rt.last_run_test = Some(self.run_test.result().clone()),
                Err(e) => self.record_error(&e, rt),
            },
            ActiveCommand::Frequency => rt.frequency_hz = self.frequency.hz(),
            ActiveCommand::Trst => {
                rt.last_trst = Some(std::mem::take(&mut self.stub_buf));
            }
            ActiveCommand::PioMap | ActiveCommand::Pio => {}
        }
        Ok(())
    }
}

/// Reserved-word lookup (exact match, no prefix matching — spec §4.2).
fn classify(word: &str) -> Option<ActiveCommand> {
    if let Some(kind) = ScanKind::from_name(word) {
        return Some(ActiveCommand::Scan(kind));
    }
    match word {
        "ENDDR" => Some(ActiveCommand::EndDr),
        "ENDIR" => Some(ActiveCommand::EndIr),
        "STATE" => Some(ActiveCommand::State),
        "RUNTEST" => Some(ActiveCommand::RunTest),
        "FREQUENCY" => Some(ActiveCommand::Frequency),
        "TRST" => Some(ActiveCommand::Trst),
        "PIOMAP" => Some(ActiveCommand::PioMap),
        "PIO" => Some(ActiveCommand::Pio),
        _ => None,
    }
}
