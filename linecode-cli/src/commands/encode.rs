use anyhow::{Context, Result};
use colored::*;
use linecode_core::{
    decoder::LineDecoder,
    encoder::LineEncoder,
    framer::stuff,
    textcodec::parse_bitstream,
    types::{level_text, to_bit_string, SignalPoint},
    Symbol, Technique,
};
use tracing::info;

/// Signal and round trip for one bitstream
#[derive(Debug, Clone)]
pub struct EncodeOutput {
    /// Points emitted for each transmitted bit
    pub signal: Vec<Vec<SignalPoint>>,

    /// What a decoder recovers from `signal`
    pub decoded: Vec<Symbol>,
}

/// Line-code a bitstream (framing it first for the stuffing techniques)
pub fn execute(bits: &str, technique: Technique) -> Result<EncodeOutput> {
    let bits = parse_bitstream(bits).with_context(|| format!("Invalid bitstream {:?}", bits))?;
    let framed = stuff(technique.framing(), &bits);
    let code = technique.line_code();

    info!("Encoding {} bits with {}", framed.stuffed.len(), technique);

    let mut encoder = LineEncoder::new(code);
    let mut decoder = LineDecoder::new(code);

    println!("\n=== {} ===", technique);
    let mut signal = Vec::with_capacity(framed.stuffed.len());
    let mut decoded = Vec::with_capacity(framed.stuffed.len());

    for (index, &bit) in framed.stuffed.iter().enumerate() {
        let before = encoder.state().level();
        let points = encoder.encode(bit);
        let symbol = decoder.decode(&points);

        let state = before.map_or_else(|| "N/A".to_string(), |l| l.to_string());
        let marker = if framed.is_synthetic(index) { "*" } else { " " };
        println!(
            "{:>5}{} {}  {:<10} {:<4} -> {}",
            index,
            marker,
            bit,
            level_text(&points),
            state,
            symbol
        );

        signal.push(points);
        decoded.push(symbol);
    }

    let sent = to_bit_string(&framed.stuffed);
    let received = to_bit_string(&decoded);
    println!("\nSent:      {}", sent);
    println!("Decoded:   {}", received);
    if sent == received {
        println!("{} Round trip exact", "✓".green());
    } else {
        println!("{} Round trip differs", "✗".red());
    }

    Ok(EncodeOutput { signal, decoded })
}
