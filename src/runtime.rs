//! Process-wide parser state (spec §3 `RuntimeState`): sticky scan buffers,
//! TAP end-states, the reverse-nibble table, and diagnostic counters.
//!
//! Per the design note on avoiding "truly global state", this is an
//! ordinary struct owned by [`crate::parser::SvfParser`] and threaded
//! explicitly into every sub-parser — nothing here is a `static`.

use std::collections::HashMap;

use crate::bit_sequence::{BitSequence, ScanKind};
use crate::config::Config;
use crate::reverse_nibble::ReverseTable;
use crate::run_test::RunTestResult;
use crate::tap::TapState;

/// Tags the most recently completed command, so the planner knows whether
/// (and how) to react. Only [`CompletedCommand::Scan`] of `SDR`/`SIR`
/// triggers a HAL transaction (spec §5); the rest just update bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletedCommand {
    None,
    Scan(ScanKind),
    EndDr,
    EndIr,
    Frequency,
    State,
    RunTest,
    Trst,
    PioMap,
    Pio,
}

/// Warning counters supplementing the spec's bare error taxonomy (§7) with
/// observability the original only expressed as `fprintf(stderr, ...)`
/// calls scattered through `svfparser.cpp`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub lexical_errors: u64,
    pub unknown_commands: u64,
    pub syntax_errors: u64,
    pub semantic_errors: u64,
    pub overruns: u64,
    pub truncated_allocs: u64,
}

/// All state that must survive across `feed()` calls for a single stream,
/// and reset together when `offset == 0` (spec §5).
#[derive(Debug, Clone)]
pub struct RuntimeState {
    pub config: Config,
    pub reverse: ReverseTable,
    pub end_state_dr: TapState,
    pub end_state_ir: TapState,
    pub frequency_hz: f64,
    pub completed_command: CompletedCommand,
    scans: HashMap<ScanKind, BitSequence>,
    /// Full path recorded by the most recent `STATE` command, endpoint
    /// last (supplements the spec's "destination only" wording — the
    /// original records every intermediate name too, useful to a TAP
    /// walker even though walking itself is out of scope here).
    pub state_path: Vec<TapState>,
    /// Parameters from the most recently completed `RUNTEST`. `None` until
    /// the stream has seen one.
    pub last_run_test: Option<RunTestResult>,
    /// Captured stub value from the most recently completed `TRST` (spec
    /// §9's TRST supplement: parsed but not driven).
    pub last_trst: Option<String>,
    pub stats: Stats,
}

const ALL_SCAN_KINDS: [ScanKind; 6] = [
    ScanKind::Hdr,
    ScanKind::Hir,
    ScanKind::Sdr,
    ScanKind::Sir,
    ScanKind::Tdr,
    ScanKind::Tir,
];

impl RuntimeState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        let reverse = ReverseTable::build(config.reverse_nibble);
        let scans = ALL_SCAN_KINDS
            .into_iter()
            .map(|k| (k, BitSequence::new()))
            .collect();
        Self {
            config,
            reverse,
            end_state_dr: TapState::Idle,
            end_state_ir: TapState::Idle,
            frequency_hz: 0.0,
            completed_command: CompletedCommand::None,
            scans,
            state_path: Vec::new(),
            last_run_test: None,
            last_trst: None,
            stats: Stats::default(),
        }
    }

    /// Stream reset: rebuild everything from `config`, in the order the
    /// spec prescribes (lexer/dispatcher reset happens in
    /// [`crate::parser::SvfParser`]; this covers the runtime record and
    /// the reverse table).
    pub fn reset(&mut self, config: Config) {
        *self = Self::new(config);
    }

    #[must_use]
    pub fn scan(&self, kind: ScanKind) -> &BitSequence {
        self.scans.get(&kind).expect("all ScanKind variants are pre-populated")
    }

    pub fn scan_mut(&mut self, kind: ScanKind) -> &mut BitSequence {
        self.scans.get_mut(&kind).expect("all ScanKind variants are pre-populated")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let rt = RuntimeState::new(Config::default());
        assert_eq!(rt.end_state_dr, TapState::Idle);
        assert_eq!(rt.end_state_ir, TapState::Idle);
        assert_eq!(rt.frequency_hz, 0.0);
        assert_eq!(rt.completed_command, CompletedCommand::None);
    }

    #[test]
    fn scan_kinds_are_independent() {
        let mut rt = RuntimeState::new(Config::default());
        rt.scan_mut(ScanKind::Sdr).length_bits = 16;
        assert_eq!(rt.scan(ScanKind::Sir).length_bits, 0);
    }

    #[test]
    fn reset_clears_sticky_state() {
        let mut rt = RuntimeState::new(Config::default());
        rt.scan_mut(ScanKind::Sdr).length_bits = 32;
        rt.end_state_dr = TapState::Reset;
        rt.reset(Config::default());
        assert_eq!(rt.scan(ScanKind::Sdr).length_bits, 0);
        assert_eq!(rt.end_state_dr, TapState::Idle);
    }
}
