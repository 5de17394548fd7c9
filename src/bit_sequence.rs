//! Bit-sequence sub-parser and sticky field storage (spec §4.4), shared by
//! HDR/HIR/SDR/SIR/TDR/TIR.
//!
//! Grounded on `struct S_bitseq` and `cmd_bitsequence()` in the original C
//! implementation. Packing keeps the original's byte-level LSB-first-within-
//! SVF convention: the rightmost hex digit of a field lands in byte 0's low
//! nibble, and `digit_cursor` counts down from `ceil(length/4)-1` to `-1`.

use log::warn;

use crate::config::Config;
use crate::error::Error;
use crate::reverse_nibble::ReverseTable;

/// One of the four named bit fields a scan command can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitField {
    Tdi,
    Tdo,
    Mask,
    Smask,
}

impl BitField {
    const ALL: [(BitField, &'static str); 4] = [
        (BitField::Tdi, "TDI"),
        (BitField::Tdo, "TDO"),
        (BitField::Mask, "MASK"),
        (BitField::Smask, "SMASK"),
    ];

    #[must_use]
    pub fn from_name(name: &str) -> Option<BitField> {
        Self::ALL.iter().find(|(_, n)| *n == name).map(|(f, _)| *f)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        Self::ALL.iter().find(|(f, _)| *f == self).unwrap().1
    }

    fn index(self) -> usize {
        match self {
            BitField::Tdi => 0,
            BitField::Tdo => 1,
            BitField::Mask => 2,
            BitField::Smask => 3,
        }
    }

    /// Value new bytes are filled with when a field is (re)sized: all-ones
    /// for the compare masks, all-zeros for the data fields (spec §3).
    #[must_use]
    pub fn pad_value(self) -> u8 {
        match self {
            BitField::Mask | BitField::Smask => 0xFF,
            BitField::Tdi | BitField::Tdo => 0x00,
        }
    }
}

/// The six scan kinds a bit sequence can belong to. Each gets independent
/// sticky storage (spec §3): an `SDR` never inherits `SIR`'s TDI buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanKind {
    Hdr,
    Hir,
    Sdr,
    Sir,
    Tdr,
    Tir,
}

impl ScanKind {
    #[must_use]
    pub fn from_name(name: &str) -> Option<ScanKind> {
        match name {
            "HDR" => Some(ScanKind::Hdr),
            "HIR" => Some(ScanKind::Hir),
            "SDR" => Some(ScanKind::Sdr),
            "SIR" => Some(ScanKind::Sir),
            "TDR" => Some(ScanKind::Tdr),
            "TIR" => Some(ScanKind::Tir),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct FieldState {
    buffer: Vec<u8>,
    allocated: usize,
    length_prev: usize,
    /// Counts down from `ceil(length/4)-1` to `-1` (buffer full/empty of
    /// remaining writes). `-1` is a valid resting value, hence `i64`.
    digit_cursor: i64,
}

/// Sticky state for one scan kind: the packed buffers plus cursor/length
/// bookkeeping for its four bit fields.
#[derive(Debug, Clone)]
pub struct BitSequence {
    pub length_bits: usize,
    fields: [FieldState; 4],
    pub overruns: u64,
    pub truncations: u64,
    /// Whether `TDO` received at least one hex digit in the current
    /// command. Drives I4 (MASK only emitted alongside a present TDO);
    /// cheaper and less error-prone than inferring it from cursor
    /// arithmetic, since the cursor's command-entry reset point depends on
    /// `TDO`'s *allocated* size rather than the current `length_bits`.
    tdo_written: bool,
}

impl Default for BitSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl BitSequence {
    #[must_use]
    pub fn new() -> Self {
        Self {
            length_bits: 0,
            fields: Default::default(),
            overruns: 0,
            truncations: 0,
            tdo_written: false,
        }
    }

    /// True once `TDO` has been written at least one digit in the current
    /// command (spec I4).
    #[must_use]
    pub fn tdo_written(&self) -> bool {
        self.tdo_written
    }

    #[must_use]
    pub fn buffer(&self, field: BitField) -> &[u8] {
        &self.fields[field.index()].buffer
    }

    #[must_use]
    pub fn digit_cursor(&self, field: BitField) -> i64 {
        self.fields[field.index()].digit_cursor
    }

    #[must_use]
    pub fn allocated(&self, field: BitField) -> usize {
        self.fields[field.index()].allocated
    }

    /// The `ceil(length/4)-1` top-of-buffer digit index for the sequence's
    /// current `length_bits`.
    #[must_use]
    pub fn top_digit(length_bits: usize) -> i64 {
        if length_bits == 0 {
            -1
        } else {
            ((length_bits + 3) / 4) as i64 - 1
        }
    }

    /// Command-entry reset (spec §4.4, corrected per the design note on
    /// `cmd_bitsequence`'s inconsistent `\0` vs `!` reset values) — TDO's
    /// cursor is repositioned to the top of its *currently allocated*
    /// buffer on every command entry, so a TDO not re-specified this round
    /// contributes no meaningful digits to the planner. TDI/MASK/SMASK are
    /// untouched — they stay sticky until explicitly re-opened.
    pub fn on_command_entry(&mut self) {
        let tdo = &mut self.fields[BitField::Tdo.index()];
        tdo.digit_cursor = if tdo.allocated == 0 {
            -1
        } else {
            tdo.allocated as i64 * 2 - 1
        };
        self.tdo_written = false;
    }

    /// Resize `field`'s buffer to `length_bits` (capped at
    /// `config.max_alloc`, with an overrun-style truncation warning) and,
    /// if `length_bits` differs from the length this field was last sized
    /// at, auto-fill MASK/SMASK to all-ones (spec §3, P6) and record the
    /// new `length_prev`. Shared by [`BitSequence::open_field`] (a field
    /// explicitly reopened with `NAME(`) and [`BitSequence::set_length`]
    /// (every field-less length change, so a sticky MASK/SMASK that is
    /// never reopened this command still sees the auto-fill).
    fn ensure_allocated(&mut self, field: BitField, length_bits: usize, config: &Config) -> Result<(), Error> {
        let length_changed = {
            let fs = &self.fields[field.index()];
            length_bits != fs.length_prev
        };

        let wanted_bytes = length_bits.div_ceil(8);
        let capped = wanted_bytes.min(config.max_alloc);
        if capped < wanted_bytes {
            self.truncations += 1;
            warn!(
                "{:?} buffer truncated: wanted {wanted_bytes} bytes, capped at {capped}",
                field
            );
        }

        let fs = &mut self.fields[field.index()];
        if capped > fs.buffer.len() {
            fs.buffer
                .try_reserve_exact(capped - fs.buffer.len())
                .map_err(|e| {
                    Error::Resource(format!("{:?} buffer growth to {capped} bytes failed: {e}", field))
                })?;
        }
        fs.buffer.resize(capped, 0);
        fs.allocated = capped;
        if length_changed {
            if matches!(field, BitField::Mask | BitField::Smask) {
                fs.buffer.fill(field.pad_value());
            }
            fs.length_prev = length_bits;
        }
        Ok(())
    }

    /// Per-field `(` handler (spec §4.4 algorithm). Resizes the field's
    /// buffer to the command's `length_bits` via [`Self::ensure_allocated`]
    /// and resets the field's digit cursor to the top so incoming hex
    /// digits overwrite from scratch.
    pub fn open_field(&mut self, field: BitField, config: &Config) -> Result<(), Error> {
        let length_bits = self.length_bits;
        self.ensure_allocated(field, length_bits, config)?;
        self.fields[field.index()].digit_cursor = Self::top_digit(length_bits);
        Ok(())
    }

    /// Commit a newly parsed bit length (spec §4.4 algorithm, step 1).
    /// MASK/SMASK must auto-fill to all-ones on any length change even in
    /// a command that never reopens them with `NAME(` — `open_field`
    /// alone only runs for fields the command actually names, so a later,
    /// unrelated command that changes `length_bits` without touching MASK
    /// or SMASK would otherwise leave their stale raw bytes in place
    /// (spec §3, P6).
    pub fn set_length(&mut self, length_bits: usize, config: &Config) -> Result<(), Error> {
        self.length_bits = length_bits;
        self.ensure_allocated(BitField::Mask, length_bits, config)?;
        self.ensure_allocated(BitField::Smask, length_bits, config)?;
        Ok(())
    }

    /// Insert one hex digit (0..=15, already nibble-reversed by the caller
    /// if wire mode requires it) at the field's current cursor, then
    /// decrement the cursor. A digit lands in the low nibble of
    /// `buffer[cursor/2]` when `cursor` is even, the high nibble (low
    /// nibble preserved) when odd — the rightmost hex digit of a field
    /// always has the lowest cursor value, so it lands in byte 0's low
    /// nibble as the LSB-first convention requires. Digits arriving after
    /// the cursor reaches `-1` are silently dropped with an overrun count
    /// bumped (spec §7).
    pub fn insert_digit(&mut self, field: BitField, digit: u8, reverse: &ReverseTable) {
        if field == BitField::Tdo {
            self.tdo_written = true;
        }
        let fs = &mut self.fields[field.index()];
        if fs.digit_cursor < 0 {
            self.overruns += 1;
            warn!("{:?} hex digit overrun, dropped", field);
            return;
        }
        let d = reverse.lookup(digit);
        let byte_index = (fs.digit_cursor as usize) / 2;
        if byte_index >= fs.buffer.len() {
            self.overruns += 1;
            warn!("{:?} hex digit past allocated buffer, dropped", field);
            fs.digit_cursor -= 1;
            return;
        }
        if fs.digit_cursor % 2 == 0 {
            fs.buffer[byte_index] = (fs.buffer[byte_index] & 0xF0) | d;
        } else {
            fs.buffer[byte_index] = (fs.buffer[byte_index] & 0x0F) | (d << 4);
        }
        fs.digit_cursor -= 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubState {
    Init,
    Length,
    FieldReady,
    Name,
    Value,
}

/// FSM driving one scan command's body: `LENGTH ( NAME '(' HEXDIGITS ')' )*`.
/// The dispatcher intercepts the terminating `;` itself (spec §4.2) and
/// never forwards it here; [`BitSeqParser::finish`] lets a bare-length
/// command (e.g. `SIR 0;`) still commit its length.
#[derive(Debug, Clone)]
pub struct BitSeqParser {
    state: SubState,
    length_acc: usize,
    name_buf: String,
    current_field: Option<BitField>,
}

impl Default for BitSeqParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BitSeqParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: SubState::Init,
            length_acc: 0,
            name_buf: String::new(),
            current_field: None,
        }
    }

    /// Called by the dispatcher on command entry, before the sequence's own
    /// [`BitSequence::on_command_entry`].
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn feed(
        &mut self,
        c: char,
        seq: &mut BitSequence,
        reverse: &ReverseTable,
        config: &Config,
    ) -> Result<(), Error> {
        match self.state {
            SubState::Init => {
                if let Some(d) = c.to_digit(10) {
                    self.length_acc = d as usize;
                    self.state = SubState::Length;
                    Ok(())
                } else if c == ' ' {
                    Ok(())
                } else {
                    Err(Error::Syntax {
                        command: "BITSEQ",
                        detail: format!("expected bit length, got '{c}'"),
                    })
                }
            }
            SubState::Length => {
                if let Some(d) = c.to_digit(10) {
                    self.length_acc = self.length_acc * 10 + d as usize;
                    Ok(())
                } else if c == ' ' {
                    seq.set_length(self.length_acc, config)?;
                    self.state = SubState::FieldReady;
                    Ok(())
                } else {
                    Err(Error::Syntax {
                        command: "BITSEQ",
                        detail: format!("unexpected '{c}' in bit length"),
                    })
                }
            }
            SubState::FieldReady => {
                if c == ' ' {
                    Ok(())
                } else if c.is_ascii_alphabetic() {
                    self.name_buf.clear();
                    self.name_buf.push(c);
                    self.state = SubState::Name;
                    Ok(())
                } else {
                    Err(Error::Syntax {
                        command: "BITSEQ",
                        detail: format!("expected a field name, got '{c}'"),
                    })
                }
            }
            SubState::Name => {
                if c == '(' {
                    let field = BitField::from_name(&self.name_buf).ok_or_else(|| Error::Semantic(
                        format!("unknown bit field name '{}'", self.name_buf),
                    ))?;
                    seq.open_field(field, config)?;
                    self.current_field = Some(field);
                    self.state = SubState::Value;
                    Ok(())
                } else if c.is_ascii_alphabetic() {
                    if self.name_buf.len() >= config.bf_name_maxlen {
                        return Err(Error::Semantic(format!(
                            "field name longer than {} chars",
                            config.bf_name_maxlen
                        )));
                    }
                    self.name_buf.push(c);
                    Ok(())
                } else {
                    Err(Error::Syntax {
                        command: "BITSEQ",
                        detail: format!("unexpected '{c}' in field name"),
                    })
                }
            }
            SubState::Value => {
                if c == ')' {
                    self.current_field = None;
                    self.name_buf.clear();
                    self.state = SubState::FieldReady;
                    Ok(())
                } else if let Some(d) = c.to_digit(16) {
                    let field = self.current_field.expect("Value state always has a field");
                    seq.insert_digit(field, d as u8, reverse);
                    Ok(())
                } else if c == ' ' {
                    // The lexer drops in-paren whitespace; tolerate it here
                    // too in case a caller feeds raw bytes directly.
                    Ok(())
                } else {
                    Err(Error::Syntax {
                        command: "BITSEQ",
                        detail: format!("'{c}' is not a hex digit"),
                    })
                }
            }
        }
    }

    /// Commit a pending bare length (`SIR 0;`, no fields at all) when the
    /// dispatcher sees `;` without ever sending a trailing separator.
    pub fn finish(&mut self, seq: &mut BitSequence, config: &Config) -> Result<(), Error> {
        if self.state == SubState::Length {
            seq.set_length(self.length_acc, config)?;
        }
        Ok(())
    }
}
