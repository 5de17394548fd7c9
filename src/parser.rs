//! Top-level streaming entry point (spec §6.1, §5).
//!
//! Grounded on `svf_run()`/`parse_svf_packet()` in the original C
//! implementation, which the original's `main.c` calls once per chunk read
//! off disk (`packetize()`), resetting all state when the chunk starts at
//! byte 0 of the file and closing the HAL once the last chunk is seen. This
//! port keeps that one-call-per-chunk shape as [`SvfParser::feed`] rather
//! than exposing the lexer/dispatcher pipeline directly.

use log::{error, warn};

use crate::bit_sequence::ScanKind;
use crate::config::Config;
use crate::dispatcher::{Dispatcher, DispatchStatus};
use crate::error::Error;
use crate::hal::{ComparePlan, Hal};
use crate::lexer::Lexer;
use crate::plan::plan;
use crate::runtime::{CompletedCommand, RuntimeState};

/// More input expected; stream continues normally.
pub const FEED_CONTINUE: i8 = 0;
/// `is_final` was set and the stream closed cleanly.
pub const FEED_DONE: i8 = 1;
/// A [`Error::Resource`] made the stream unrecoverable; no further `feed`
/// calls should be made without a fresh reset (`offset == 0`).
pub const FEED_FATAL: i8 = -1;

/// Drives the lexer, dispatcher and HAL across one or more packets of SVF
/// text. Owns all state that must persist between [`SvfParser::feed`]
/// calls; a caller gets a fresh stream simply by calling `feed` again with
/// `offset == 0`.
pub struct SvfParser {
    lexer: Lexer,
    dispatcher: Dispatcher,
    rt: RuntimeState,
    hal: Box<dyn Hal>,
}

impl SvfParser {
    #[must_use]
    pub fn new(config: Config, hal: Box<dyn Hal>) -> Self {
        Self {
            lexer: Lexer::new(),
            dispatcher: Dispatcher::new(),
            rt: RuntimeState::new(config),
            hal,
        }
    }

    #[must_use]
    pub fn runtime(&self) -> &RuntimeState {
        &self.rt
    }

    /// Feed one packet. `offset` is this packet's byte offset within the
    /// overall stream: `0` triggers a full reset (lexer, dispatcher,
    /// sub-parsers, runtime state, and a fresh `HAL::open`) before any byte
    /// in `bytes` is consumed, exactly as the original re-opens the JTAG
    /// link on every new file. `final` signals the last packet; the HAL is
    /// closed once, after the packet's bytes are processed.
    ///
    /// Returns [`FEED_CONTINUE`], [`FEED_DONE`], or [`FEED_FATAL`]. Only a
    /// buffer allocation failure produces `FEED_FATAL`; every other error
    /// is recovered from internally and reflected in
    /// [`crate::runtime::Stats`] instead.
    pub fn feed(&mut self, bytes: &[u8], offset: u32, is_final: bool) -> i8 {
        if offset == 0 {
            self.lexer.reset();
            self.dispatcher.reset();
            let config = self.rt.config;
            self.rt.reset(config);
            self.hal.open();
        }

        for &byte in bytes {
            match self.lexer.feed(byte) {
                Ok(Some(ev)) => match self.dispatcher.feed(ev, &mut self.rt) {
                    Ok(DispatchStatus::CommandComplete) => self.react_to_completion(),
                    Ok(DispatchStatus::Pending) => {}
                    Err(fatal) => {
                        error!("fatal SVF error, stopping stream: {fatal}");
                        return FEED_FATAL;
                    }
                },
                Ok(None) => {}
                Err(Error::Lexical(detail)) => {
                    self.rt.stats.lexical_errors += 1;
                    warn!("lexical error: {detail}");
                }
                Err(other) => {
                    // The lexer only ever produces `Lexical`; anything else
                    // would be a bug, not a malformed stream.
                    warn!("unexpected lexer error: {other}");
                }
            }
        }

        if is_final {
            self.hal.close();
            FEED_DONE
        } else {
            FEED_CONTINUE
        }
    }

    /// After a completed `SDR`/`SIR`, build its [`crate::plan::ScanPlan`]
    /// and drive the HAL (spec §5: every other command only updates
    /// bookkeeping, no HAL traffic).
    fn react_to_completion(&mut self) {
        let CompletedCommand::Scan(kind) = self.rt.completed_command else {
            return;
        };
        if !matches!(kind, ScanKind::Sdr | ScanKind::Sir) {
            return;
        }

        let scan_plan = plan(self.rt.scan(kind));
        let Some(tdi) = scan_plan.tdi else {
            return;
        };
        let compare = match (scan_plan.tdo, scan_plan.mask) {
            (Some(tdo), Some(mask)) => Some(ComparePlan { tdo, mask }),
            _ => None,
        };
        let mismatches = self.hal.tdi_tdo(&tdi, compare.as_ref());
        if mismatches > 0 {
            warn!("{kind:?}: {mismatches} TDO bit mismatch(es)");
        }
    }
}
