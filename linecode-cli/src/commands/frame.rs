use anyhow::{Context, Result};
use colored::*;
use linecode_core::{
    framer::{destuff, stuff, Destuffed, StuffingResult},
    textcodec::prepare_input,
    types::{bits_to_symbols, format_grouped, to_bit_string},
    InputKind,
};
use tracing::info;

use crate::FrameMode;

/// Frame the input, then deframe the clean result
pub fn execute(input: &str, kind: InputKind, mode: FrameMode) -> Result<(StuffingResult, Destuffed)> {
    let prepared = prepare_input(input, kind)
        .with_context(|| format!("Failed to prepare input {:?}", input))?;

    info!("Framing {} bits with {:?} stuffing", prepared.bits.len(), mode);

    let framed = stuff(mode.framing(), &prepared.bits);
    let restored = destuff(framed.framing, &bits_to_symbols(&framed.stuffed));

    println!("\n=== Framing ===");
    println!("Input bits:        {}", format_grouped(&prepared.bits));
    println!("Framed bits:       {}", format_grouped(&framed.stuffed));
    println!(
        "Framed length:     {} ({} payload, {} inserted)",
        framed.stuffed.len(),
        framed.payload_len(),
        framed.synthetic_len()
    );

    let positions: Vec<String> = framed
        .inserted_positions
        .iter()
        .map(|p| p.to_string())
        .collect();
    if positions.is_empty() {
        println!("Inserted at:       none");
    } else {
        println!("Inserted at:       {}", positions.join(", "));
    }

    if framed.truncated_bits > 0 {
        println!(
            "{} {} trailing bit(s) did not fill a byte and were not framed",
            "!".yellow(),
            framed.truncated_bits
        );
    }

    println!("\n=== Deframing ===");
    println!("Restored bits:     {}", format_grouped(&restored.bits));
    match &restored.error {
        Some(err) => println!("{} {}", "✗".red(), err),
        None if to_bit_string(&restored.bits) == to_bit_string(&prepared.bits) => {
            println!("{} Restored exactly", "✓".green())
        }
        None => println!("{} Restored bits differ from the input", "!".yellow()),
    }

    Ok((framed, restored))
}
