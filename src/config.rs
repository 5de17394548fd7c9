//! Compile-time-ish limits from spec §6.4.
//!
//! Unlike `rustradio`, which takes its knobs as constructor parameters on
//! individual blocks, the SVF parser has one small bundle of limits shared
//! by every sub-parser, so it gets its own `Config` passed once to
//! [`crate::parser::SvfParser::new`].

/// Parser limits and wire-order flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Cap, in bytes, on any single bit-field buffer (TDI/TDO/MASK/SMASK).
    pub max_alloc: usize,

    /// When true, hex digits are bit-reversed at ingestion so the wire
    /// engine can shift MSB-first. When false, the reverse table is
    /// identity and wire-level reversal (if any) is the HAL's job.
    pub reverse_nibble: bool,

    /// Max buffered characters while detecting a command keyword.
    pub cmds_max_chars: usize,

    /// Max length of a bit-field name (`SMASK` is the longest, at 5).
    pub bf_name_maxlen: usize,

    /// Max length of a RUNTEST keyword/state token (`ENDSTATE` is 8,
    /// but the original reserves 9).
    pub runtest_name_maxlen: usize,

    /// Max length of a TAP state name (`DRCAPTURE` etc, 9 chars).
    pub tap_name_maxlen: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_alloc: 30_000,
            reverse_nibble: false,
            cmds_max_chars: 15,
            bf_name_maxlen: 5,
            runtest_name_maxlen: 9,
            tap_name_maxlen: 9,
        }
    }
}
