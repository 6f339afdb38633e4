//! # Kanji Pad
//!
//! Replays a handwriting script and prints the recognized text.

use clap::Parser;
use kanji_core::{ClipboardSink, InteractionController};
use kanji_model::load_classifier;
use kanji_pad::{load_script, CliArgs, Driver, FileClipboard, PadConfig, StdoutClipboard};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the outcome.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kanji_pad=info,kanji_core=info,kanji_model=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = PadConfig::from(CliArgs::parse());
    tracing::info!("Model: {}", config.assets.model.display());

    let classifier = load_classifier(&config.assets, config.classifier);
    if !classifier.is_ready() {
        tracing::warn!("Recognition unavailable; strokes will produce no candidates");
    }

    let actions = load_script(&config.script)?;
    tracing::info!("Replaying {} actions", actions.len());

    if let Some(dir) = &config.dump_raster {
        std::fs::create_dir_all(dir)?;
    }

    let mut controller = InteractionController::new(&config.session, classifier);
    let mut clipboard: Box<dyn ClipboardSink> = match &config.clipboard {
        Some(path) => Box::new(FileClipboard::new(path)),
        None => Box::new(StdoutClipboard),
    };

    let outcome = Driver::new(&mut controller, clipboard.as_mut())
        .with_dump_dir(config.dump_raster.clone())
        .run(actions)
        .await?;

    if config.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        println!("text: {}", outcome.text);
        for candidate in &outcome.candidates {
            println!(
                "  {:>2}. {} ({:.3})",
                candidate.index + 1,
                candidate.label,
                candidate.confidence
            );
        }
    }

    tracing::info!(
        evaluations = outcome.evaluations,
        rejected = outcome.rejected,
        "Done"
    );
    Ok(())
}
