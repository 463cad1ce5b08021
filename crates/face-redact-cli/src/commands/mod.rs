//! CLI command definitions and handlers.

pub mod redact;

use clap::Parser;

/// Face Redact - anonymize or annotate the faces in a photo
#[derive(Parser)]
#[command(name = "face-redact")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input image, face source and strategy options.
    #[command(flatten)]
    pub redact: redact::RedactArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// The output image was written.
    Success,
    /// Anything failed; nothing was written.
    Error,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        match code {
            ExitCode::Success => Self::SUCCESS,
            ExitCode::Error => Self::FAILURE,
        }
    }
}
