//! HAL (hardware abstraction layer) contract (spec §6.2): the only
//! interface the core speaks to the outside world through.
//!
//! Grounded on `jtaghw_print.cpp` (a trivial logging backend) and
//! `jtaghw_esp32.cpp`'s `struct S_jtaghw`/`jtag_tdi_tdo` (an SPI backend
//! that counts `tdo_mismatch`). The core never picks a backend; callers
//! hand in a `Box<dyn Hal>`, the same seam `rustradio`'s `Block` trait
//! uses to let `file_source`/`tcp_source` be swapped without touching the
//! graph that consumes them.

use crate::plan::TransmissionPlan;

/// Driven/compare plan pair for one `tdi_tdo` transaction. `compare` is
/// `None` when the command had no TDO (no comparison is made; mismatches
/// can't be counted against nothing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparePlan {
    pub tdo: TransmissionPlan,
    pub mask: TransmissionPlan,
}

/// The three operations an SVF stream drives (spec §6.2, §5): `open` once
/// per stream, `tdi_tdo` once per completed `SDR`/`SIR`, `close` on the
/// final packet.
pub trait Hal {
    fn open(&mut self);

    /// Shift `plan_in` out on TDI; when `plan_out` is present, compare the
    /// sampled TDO against it under MASK and return the mismatch count.
    /// Returns `0` when `plan_out` is `None` (nothing to compare).
    fn tdi_tdo(&mut self, plan_in: &TransmissionPlan, plan_out: Option<&ComparePlan>) -> u32;

    fn close(&mut self);
}

/// Discards everything. Useful for fuzzing the parser without a real
/// target, and as the default in tests that only care about parse
/// correctness, not HAL traffic.
#[derive(Debug, Default)]
pub struct NullHal;

impl Hal for NullHal {
    fn open(&mut self) {}
    fn tdi_tdo(&mut self, _plan_in: &TransmissionPlan, _plan_out: Option<&ComparePlan>) -> u32 {
        0
    }
    fn close(&mut self) {}
}

/// Logs every transaction instead of driving hardware. Grounded on
/// `jtaghw_print.cpp`'s `jtag_open`/`jtag_tdi_tdo`/`jtag_close`, which
/// print the shifted bytes rather than shift them.
#[derive(Debug, Default)]
pub struct PrintHal {
    pub transactions: usize,
}

impl Hal for PrintHal {
    fn open(&mut self) {
        log::info!("jtag: open");
    }

    fn tdi_tdo(&mut self, plan_in: &TransmissionPlan, plan_out: Option<&ComparePlan>) -> u32 {
        self.transactions += 1;
        log::debug!(
            "jtag: tdi_tdo #{} header_bits={} data={:02X?} trailer_bits={}",
            self.transactions,
            plan_in.header_bits,
            plan_in.data,
            plan_in.trailer_bits,
        );
        match plan_out {
            Some(cmp) => {
                log::debug!(
                    "jtag: expect tdo={:02X?} mask={:02X?}",
                    cmp.tdo.data,
                    cmp.mask.data
                );
                0
            }
            None => 0,
        }
    }

    fn close(&mut self) {
        log::info!("jtag: close");
    }
}

/// Records every call verbatim. Used by integration tests to assert on
/// the exact HAL call sequence a stream produces (spec P2).
#[derive(Debug, Default, Clone)]
pub struct RecordingHal {
    pub opened: bool,
    pub closed: bool,
    pub calls: Vec<(TransmissionPlan, Option<ComparePlan>)>,
}

impl Hal for RecordingHal {
    fn open(&mut self) {
        self.opened = true;
    }

    fn tdi_tdo(&mut self, plan_in: &TransmissionPlan, plan_out: Option<&ComparePlan>) -> u32 {
        self.calls.push((plan_in.clone(), plan_out.cloned()));
        0
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
