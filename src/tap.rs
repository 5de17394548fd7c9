//! JTAG TAP (Test Access Port) state names, tokenized the way
//! `svfparser.cpp`'s `libxsvf_tap_state` enum and `Tap_states[]` table do.

/// The 1149.1 TAP state machine's states, in the original's enumeration
/// order (used only for readability; lookups go by name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TapState {
    /// Pseudo-state meaning "not yet entered any real state".
    Init,
    Reset,
    Idle,
    DrSelect,
    DrCapture,
    DrShift,
    DrExit1,
    DrPause,
    DrExit2,
    DrUpdate,
    IrSelect,
    IrCapture,
    IrShift,
    IrExit1,
    IrPause,
    IrExit2,
    IrUpdate,
}

impl TapState {
    /// All states in the order the original table defines them, paired
    /// with their SVF name.
    const ALL: &'static [(TapState, &'static str)] = &[
        (TapState::Init, "INIT"),
        (TapState::Reset, "RESET"),
        (TapState::Idle, "IDLE"),
        (TapState::DrSelect, "DRSELECT"),
        (TapState::DrCapture, "DRCAPTURE"),
        (TapState::DrShift, "DRSHIFT"),
        (TapState::DrExit1, "DREXIT1"),
        (TapState::DrPause, "DRPAUSE"),
        (TapState::DrExit2, "DREXIT2"),
        (TapState::DrUpdate, "DRUPDATE"),
        (TapState::IrSelect, "IRSELECT"),
        (TapState::IrCapture, "IRCAPTURE"),
        (TapState::IrShift, "IRSHIFT"),
        (TapState::IrExit1, "IREXIT1"),
        (TapState::IrPause, "IRPAUSE"),
        (TapState::IrExit2, "IREXIT2"),
        (TapState::IrUpdate, "IRUPDATE"),
    ];

    /// Exact (case already normalized to uppercase by the lexer), no
    /// prefix matching, just like `search_name()` in the original.
    #[must_use]
    pub fn from_name(name: &str) -> Option<TapState> {
        Self::ALL
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(s, _)| *s)
    }

    /// SVF spelling of this state.
    #[must_use]
    pub fn name(self) -> &'static str {
        Self::ALL.iter().find(|(s, _)| *s == self).unwrap().1
    }

    /// The four states valid as an ENDDR/ENDIR target (spec §4.5).
    #[must_use]
    pub fn is_valid_end_state(self) -> bool {
        matches!(
            self,
            TapState::Idle | TapState::Reset | TapState::DrPause | TapState::IrPause
        )
    }
}
