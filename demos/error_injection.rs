//! Corrupt bits in flight and watch what each technique makes of it

use linecode_core::{BitErrorKind, InputKind, Session, SessionState, Technique};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Linecode Error Injection Example\n");

    let scenarios = [
        ("1010", Technique::NrzL, vec![2]),
        ("1101 0011", Technique::NrzI, vec![1, 5]),
        ("OK", Technique::Manchester, vec![9]),
        ("01111110111110", Technique::BitStuff, vec![6]),
        ("~}", Technique::ByteStuff, vec![0]),
    ];

    for (input, technique, inject_at) in scenarios {
        let mut session = Session::new();
        session.start(input, InputKind::Auto, technique)?;

        // Pause half way to show that nothing is lost
        let halfway = session.processed_data().len() / 2;

        while session.state() != SessionState::Completed {
            if session.state() == SessionState::Paused {
                println!("  paused at bit {}, resuming", session.position());
                session.resume()?;
            }
            if inject_at.contains(&session.position()) {
                session.arm_error_injection()?;
            }
            if session.tick().is_none() {
                break;
            }
            if session.position() == halfway && session.state() == SessionState::Running {
                session.pause()?;
            }
        }

        let Some(report) = session.report() else {
            continue;
        };

        println!("{} via {}", input, technique);
        for position in &report.error_positions {
            let kind = match session.error_at(*position) {
                Some(BitErrorKind::Injected) => "flipped",
                Some(BitErrorKind::InvalidPattern) => "invalid signal",
                None => "unknown",
            };
            println!("  error at framed bit {}: {}", position, kind);
        }
        if let Some(err) = &report.frame_error {
            println!("  deframing failed: {}", err);
        }
        println!("  received: {:?}", report.message);
        if let Some(verdict) = report.verdict {
            println!("  verdict:  {:?}", verdict);
        }
        println!();
    }

    Ok(())
}
