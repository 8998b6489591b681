use anyhow::Result;
use clap::{Parser, Subcommand};
use linecode_cli::{commands, FrameMode};
use linecode_core::{InputKind, Technique};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "linecode")]
#[command(about = "Linecode - Step messages through framing, line coding and a noisy link", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transmit a message bit by bit and report what arrived
    Simulate {
        /// Message text or bitstream
        #[arg(short, long)]
        input: String,

        /// How to interpret the input (auto, bitstream)
        #[arg(short, long, default_value = "auto")]
        kind: InputKind,

        /// nrzl, nrzi, manchester, diffmanchester, bitstuff, bytestuff
        #[arg(short, long, default_value = "nrzl")]
        technique: Technique,

        /// Flip the received value of this framed bit (repeatable)
        #[arg(long = "inject-at")]
        inject_at: Vec<usize>,

        /// Print every step
        #[arg(long)]
        trace: bool,

        /// Delay between steps, with a progress bar
        #[arg(long, default_value = "0")]
        delay_ms: u64,

        /// Write the completion report as JSON
        #[arg(short, long)]
        report: Option<String>,
    },

    /// Show bit or byte stuffing of a message
    Frame {
        /// Message text or bitstream
        #[arg(short, long)]
        input: String,

        /// How to interpret the input (auto, bitstream)
        #[arg(short, long, default_value = "auto")]
        kind: InputKind,

        /// Stuffing scheme
        #[arg(short, long, value_enum, default_value = "bit")]
        mode: FrameMode,
    },

    /// Print the signal a bitstream produces
    Encode {
        /// Bitstream to encode
        #[arg(short, long)]
        bits: String,

        /// nrzl, nrzi, manchester, diffmanchester, bitstuff, bytestuff
        #[arg(short, long, default_value = "nrzl")]
        technique: Technique,
    },

    /// Run a JSON array of scenarios and write their reports
    Batch {
        /// Input JSON file (array of scenarios)
        #[arg(short, long)]
        input: String,

        /// Output JSON file for reports
        #[arg(short, long)]
        output: String,

        /// Show a progress bar
        #[arg(long)]
        progress: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    // Execute command
    match cli.command {
        Commands::Simulate {
            input,
            kind,
            technique,
            inject_at,
            trace,
            delay_ms,
            report,
        } => commands::simulate::execute(
            &input,
            kind,
            technique,
            &inject_at,
            trace,
            delay_ms,
            report.as_deref(),
        )
        .map(|_| ()),

        Commands::Frame { input, kind, mode } => {
            commands::frame::execute(&input, kind, mode).map(|_| ())
        }

        Commands::Encode { bits, technique } => {
            commands::encode::execute(&bits, technique).map(|_| ())
        }

        Commands::Batch {
            input,
            output,
            progress,
        } => commands::batch::execute(&input, &output, progress).map(|_| ()),
    }
}
