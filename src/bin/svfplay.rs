//! Demo CLI: feeds an SVF file through [`svf::parser::SvfParser`] in
//! fixed-size chunks and logs every transaction via [`svf::hal::PrintHal`].
//!
//! Grounded on `packetize()` in the original C implementation, which reads
//! a file in 1436-byte chunks ("simulate network") and calls the parser
//! once per chunk, marking the last short read as `final`.

use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use svf::config::Config;
use svf::hal::PrintHal;
use svf::parser::{FEED_FATAL, SvfParser};

#[derive(clap::Parser, Debug)]
#[command(version, about)]
struct Opt {
    /// SVF file to play.
    file: PathBuf,

    /// Verbosity level.
    #[arg(short, long, default_value_t = 2)]
    verbose: usize,

    /// Bytes read per `feed()` call; the original hard-codes 1436 to
    /// simulate a network MTU.
    #[arg(long, default_value_t = 1436)]
    chunk_size: usize,
}

fn main() -> Result<()> {
    let opt = Opt::parse();
    stderrlog::new()
        .module(module_path!())
        .module("svf")
        .quiet(false)
        .verbosity(opt.verbose)
        .timestamp(stderrlog::Timestamp::Off)
        .init()?;

    let mut file = File::open(&opt.file)
        .with_context(|| format!("opening {}", opt.file.display()))?;

    let mut parser = SvfParser::new(Config::default(), Box::new(PrintHal::default()));
    let mut buf = vec![0u8; opt.chunk_size];
    let mut offset: u32 = 0;

    loop {
        let n = file.read(&mut buf)?;
        let is_final = n < opt.chunk_size;
        let rc = parser.feed(&buf[..n], offset, is_final);
        if rc == FEED_FATAL {
            anyhow::bail!("fatal parser error at offset {offset}");
        }
        offset += n as u32;
        if is_final {
            break;
        }
    }

    let stats = parser.runtime().stats;
    log::info!(
        "done: {offset} bytes, {} unknown command(s), {} syntax error(s), {} semantic error(s)",
        stats.unknown_commands,
        stats.syntax_errors,
        stats.semantic_errors,
    );
    Ok(())
}
