//! voxpost: final-text post-processing for voice transcripts.
//!
//! Reads a finished transcript from the argument or stdin, applies trailing
//! trimming and preset shortcuts, optionally runs the AI rewrite, and prints
//! the committed text to stdout. The process always exits 0 with best-effort
//! text; AI failure details go to stderr.

use anyhow::Result;
use clap::Parser;
use std::io::Read;

use voxpost_core::{
    OpenAiCompatibleProcessor, Settings, process_simple, process_with_ai, set_verbose,
};

#[derive(Parser)]
#[command(
    name = "voxpost",
    version,
    about = "Clean up and optionally AI-rewrite a voice transcript before committing it"
)]
struct Cli {
    /// Transcript text; reads stdin when omitted
    text: Option<String>,

    /// Run the AI rewrite path (honors the enabled flag and brevity gate)
    #[arg(long)]
    ai: bool,

    /// Force the AI rewrite even when disabled or under the brevity threshold
    #[arg(long)]
    force_ai: bool,

    /// Do not trim trailing punctuation and emoji
    #[arg(long)]
    no_trim: bool,

    /// Override the rewrite prompt for this invocation
    #[arg(long)]
    prompt: Option<String>,

    /// Print processing status details to stderr
    #[arg(long)]
    show_status: bool,

    /// Verbose debug output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    set_verbose(cli.verbose);

    let input = match &cli.text {
        Some(text) => text.clone(),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let input = input.trim_end_matches(['\n', '\r']);

    let mut settings = Settings::load();
    if cli.no_trim {
        settings.post_processing.trim_trailing_punctuation = false;
    }

    if cli.ai || cli.force_ai {
        let processor =
            OpenAiCompatibleProcessor::new(settings.post_processing.endpoint.clone());
        let result = process_with_ai(
            &settings.post_processing,
            &settings.presets,
            input,
            &processor,
            cli.prompt.as_deref(),
            cli.force_ai,
        )
        .await?;

        if cli.show_status {
            eprintln!(
                "ok={} used_ai={} http_status={}",
                result.ok,
                result.used_ai,
                result
                    .http_status
                    .map_or_else(|| "-".to_string(), |s| s.to_string())
            );
        }
        if !result.ok
            && let Some(message) = &result.error_message
        {
            eprintln!("voxpost: AI rewrite failed, using transcript as-is: {message}");
        }
        println!("{}", result.text);
    } else {
        println!(
            "{}",
            process_simple(&settings.post_processing, &settings.presets, input)
        );
    }

    Ok(())
}
