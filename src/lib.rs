#![warn(missing_docs)]
/*! A streaming parser and bit-level sequencer for Serial Vector Format
(SVF) JTAG test vectors.

An [`SvfParser`](parser::SvfParser) consumes SVF text one packet at a time
([`SvfParser::feed`](parser::SvfParser::feed)) and drives a
[`Hal`](hal::Hal) implementation: `TDI`/`TDO`/`MASK`/`SMASK` scan data
accumulates across packet boundaries exactly as if the whole file had been
fed at once, and a completed `SDR`/`SIR` is handed to the HAL as a
[`TransmissionPlan`](plan::TransmissionPlan) pair ready to shift onto the
wire.

# Example

```
use svf::config::Config;
use svf::hal::NullHal;
use svf::parser::SvfParser;

let mut parser = SvfParser::new(Config::default(), Box::new(NullHal));
let rc = parser.feed(b"SIR 8 TDI(AB);\nSDR 8 TDI(CD);\n", 0, true);
assert_eq!(rc, svf::parser::FEED_DONE);
```
*/

pub mod bit_sequence;
pub mod config;
pub mod dispatcher;
pub mod end_state;
pub mod error;
pub mod float_parser;
pub mod frequency;
pub mod hal;
pub mod lexer;
pub mod plan;
pub mod reverse_nibble;
pub mod run_test;
pub mod runtime;
pub mod state_path;
pub mod tap;

pub mod parser;
