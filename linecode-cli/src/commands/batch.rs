use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use linecode_core::SessionConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use tracing::{info, warn};

use super::simulate::{run_session, SessionReport};

/// One scenario in a batch input file
#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub input: String,

    /// Technique and input kind, defaulting to NRZ-L with auto detection
    #[serde(flatten)]
    pub config: SessionConfig,

    /// Framed-bit indices to flip
    #[serde(default)]
    pub inject_at: Vec<usize>,
}

/// Result of one scenario
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Completed(SessionReport),
    Rejected { input: String, error: String },
}

/// Run every scenario in `input` and write the reports to `output`
pub fn execute(input: &str, output: &str, progress: bool) -> Result<Vec<BatchEntry>> {
    info!("Running batch from {} to {}", input, output);

    let content = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input file: {}", input))?;

    let scenarios: Vec<Scenario> =
        serde_json::from_str(&content).with_context(|| "Failed to parse JSON input")?;

    info!("Found {} scenarios", scenarios.len());

    let bar = if progress {
        let bar = ProgressBar::new(scenarios.len() as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40}] {pos}/{len} scenarios")?
                .progress_chars("=> "),
        );
        Some(bar)
    } else {
        None
    };

    let mut entries = Vec::with_capacity(scenarios.len());
    for (i, scenario) in scenarios.iter().enumerate() {
        let outcome = run_session(
            &scenario.input,
            &scenario.config,
            &scenario.inject_at,
            |_, _| {},
        );

        let entry = match outcome {
            Ok(report) => BatchEntry::Completed(report.into()),
            Err(e) => {
                warn!("Scenario {} rejected: {:#}", i, e);
                BatchEntry::Rejected {
                    input: scenario.input.clone(),
                    error: format!("{:#}", e),
                }
            }
        };
        entries.push(entry);

        if let Some(bar) = &bar {
            bar.inc(1);
        }
    }

    if let Some(bar) = bar {
        bar.finish();
    }

    let json = serde_json::to_string_pretty(&entries)
        .with_context(|| "Failed to serialize batch results")?;
    fs::write(output, json).with_context(|| format!("Failed to write output file: {}", output))?;

    let rejected = entries
        .iter()
        .filter(|e| matches!(e, BatchEntry::Rejected { .. }))
        .count();
    info!(
        "Completed {} scenarios ({} rejected)",
        entries.len(),
        rejected
    );

    Ok(entries)
}
