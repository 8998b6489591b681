use anyhow::{Context, Result};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use linecode_core::{
    session::{FinalMessage, Verdict},
    types::level_text,
    CompletionReport, InputKind, Session, SessionConfig, SessionState, Step, Technique,
};
use serde::Serialize;
use std::fs;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Completion report as written to JSON, with the received bytes in hex
#[derive(Debug, Serialize)]
pub struct SessionReport {
    #[serde(flatten)]
    pub report: CompletionReport,

    /// Received payload as hex, when it is whole bytes with no `?`
    pub bytes_hex: Option<String>,
}

impl From<CompletionReport> for SessionReport {
    fn from(report: CompletionReport) -> Self {
        let bytes_hex = report.deframed_bytes().map(hex::encode);
        Self { report, bytes_hex }
    }
}

/// Run one session to completion, arming injection before every listed index
///
/// `on_step` sees every step as it happens.
pub fn run_session<F>(
    input: &str,
    config: &SessionConfig,
    inject_at: &[usize],
    mut on_step: F,
) -> Result<CompletionReport>
where
    F: FnMut(&Session, &Step),
{
    let mut session = Session::new();
    session
        .start_with(config, input)
        .with_context(|| format!("Failed to start session for input {:?}", input))?;

    let total = session.processed_data().len();
    for &index in inject_at.iter().filter(|&&i| i >= total) {
        warn!("Injection index {} is past the last bit ({})", index, total);
    }

    while session.state() == SessionState::Running {
        if inject_at.contains(&session.position()) {
            session.arm_error_injection()?;
        }
        let Some(step) = session.tick() else {
            break;
        };
        on_step(&session, &step);
    }

    session
        .report()
        .cloned()
        .context("Session stopped before completing")
}

pub fn execute(
    input: &str,
    kind: InputKind,
    technique: Technique,
    inject_at: &[usize],
    trace: bool,
    delay_ms: u64,
    report_path: Option<&str>,
) -> Result<CompletionReport> {
    info!("Simulating {} with {}", input, technique);

    let progress = if delay_ms > 0 {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner} [{bar:40}] {pos}/{len} bits {msg}")?
                .progress_chars("=> "),
        );
        Some(bar)
    } else {
        None
    };

    if trace {
        println!("\n=== Transmission ===");
        println!("{:>5}  {:>4}  {:<3} {:<10} {:<8} {}", "bit", "orig", "in", "levels", "state", "out");
    }

    let config = SessionConfig::new(technique, kind);
    let report = run_session(input, &config, inject_at, |session, step| {
        if let Some(bar) = &progress {
            bar.set_length(session.processed_data().len() as u64);
            bar.set_position(session.position() as u64);
            thread::sleep(Duration::from_millis(delay_ms));
        }
        if trace {
            print_step(step);
        }
    })?;

    if let Some(bar) = progress {
        bar.finish_with_message("done");
    }

    print_summary(&report);

    if let Some(path) = report_path {
        let json = serde_json::to_string_pretty(&SessionReport::from(report.clone()))
            .with_context(|| "Failed to serialize completion report")?;
        fs::write(path, json).with_context(|| format!("Failed to write report file: {}", path))?;
        info!("Report written to: {}", path);
    }

    Ok(report)
}

fn print_step(step: &Step) {
    let original = step
        .original_index
        .map_or_else(|| "-".to_string(), |i| i.to_string());
    let state = step
        .level_before
        .map_or_else(|| "N/A".to_string(), |l| l.to_string());
    let bit = if step.synthetic {
        step.bit.to_string().cyan()
    } else {
        step.bit.to_string().normal()
    };
    let decoded = match step.error {
        Some(_) => step.decoded.to_string().red().bold(),
        None => step.decoded.to_string().green(),
    };

    println!(
        "{:>5}  {:>4}  {:<3} {:<10} {:<8} {}",
        step.index,
        original,
        bit,
        level_text(&step.points),
        state,
        decoded
    );
}

fn print_summary(report: &CompletionReport) {
    println!("\n=== Transmission Complete ===");
    println!("Technique:         {}", report.technique);
    println!("Input:             {}", report.original);
    println!("Bits transmitted:  {}", report.total_steps);

    let errors = report.error_count();
    let summary = format!(
        "{} ({} injected, {} invalid pattern)",
        errors, report.injected_errors, report.invalid_patterns
    );
    if errors > 0 {
        println!("Errors:            {}", summary.red());
        let positions: Vec<String> = report.error_positions.iter().map(|p| p.to_string()).collect();
        println!("Error positions:   {}", positions.join(", "));
    } else {
        println!("Errors:            {}", summary);
    }

    if report.bits_removed > 0 {
        println!("Framing removed:   {} bits", report.bits_removed);
    }
    if report.escapes_removed > 0 || report.flags_removed > 0 {
        println!(
            "Bytes stripped:    {} flag(s), {} escape(s)",
            report.flags_removed, report.escapes_removed
        );
    }
    if report.truncated_bits > 0 {
        println!(
            "{} {} trailing bit(s) did not fill a byte and were not framed",
            "!".yellow(),
            report.truncated_bits
        );
    }
    if let Some(err) = &report.frame_error {
        println!("{} Deframing failed: {}", "✗".red(), err);
    }

    match &report.message {
        FinalMessage::Text(text) => println!("Received text:     {}", text),
        FinalMessage::Bits(bits) => println!("Received bits:     {}", bits),
        FinalMessage::Empty => println!("{} Nothing received: no valid output", "✗".red()),
    }
    if let Some(bytes) = report.deframed_bytes() {
        println!("Received bytes:    {}", hex::encode(bytes));
    }

    match report.verdict {
        Some(Verdict::Match) => println!("{} Received bitstream matches the input", "✓".green()),
        Some(Verdict::Mismatch) => println!("{} Received bitstream differs from the input", "✗".red()),
        None => {}
    }
}
