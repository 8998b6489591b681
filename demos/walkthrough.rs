//! Step a short message through every technique

use linecode_core::{
    session::FinalMessage,
    types::{format_grouped, level_text},
    InputKind, Session, Technique,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Linecode Walkthrough\n");

    let message = "Hi";

    for technique in Technique::ALL {
        let mut session = Session::new();
        session.start(message, InputKind::Auto, technique)?;

        println!("== {} ==", technique);
        println!("Transmitting: {}", format_grouped(session.processed_data()));

        while let Some(step) = session.tick() {
            let marker = if step.synthetic { " (framing)" } else { "" };
            println!(
                "  bit {:>2}: {} -> {:<10} -> {}{}",
                step.index,
                step.bit,
                level_text(&step.points),
                step.decoded,
                marker
            );
        }

        if let Some(report) = session.report() {
            match &report.message {
                FinalMessage::Text(text) => println!("Received: {:?}", text),
                FinalMessage::Bits(bits) => println!("Received: {}", bits),
                FinalMessage::Empty => println!("Received nothing"),
            }
        }
        println!();
    }

    Ok(())
}
