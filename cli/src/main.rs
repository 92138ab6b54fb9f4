//! deckedit - inspect, edit, and re-export presentation files
//!
//! ```sh
//! deckedit inspect deck.pptx
//! deckedit set-text deck.pptx --slide 2 --element 0 --text "New title" -o out.pptx
//! deckedit roundtrip deck.pptx -o copy.pptx
//! ```
//!
//! Logging is controlled with `RUST_LOG`, e.g. `RUST_LOG=store=debug`.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use doc_model::{Document, Element};
use serde_json::{json, Value};
use session::Editor;
use std::path::{Path, PathBuf};
use store::{export_pptx, import_pptx, ExportOutcome, SettingsManager};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "deckedit", about = "Inspect and edit presentation files", version)]
struct Cli {
    /// Directory holding settings.json
    #[arg(long, value_name = "DIR", global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a JSON summary of slides and elements
    Inspect {
        input: PathBuf,
    },

    /// Replace the text of one element and export the result
    SetText {
        input: PathBuf,

        /// 1-based slide number
        #[arg(long)]
        slide: u32,

        /// 0-based element index on the slide
        #[arg(long)]
        element: usize,

        /// New text; newlines separate paragraphs
        #[arg(long)]
        text: String,

        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Load and export without edits
    Roundtrip {
        input: PathBuf,

        #[arg(short, long, value_name = "OUTPUT")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config_dir).await?;

    match cli.command {
        Command::Inspect { input } => {
            let loaded = import_pptx(&input).with_context(|| format!("loading {}", input.display()))?;
            println!("{}", serde_json::to_string_pretty(&summarize(&loaded.document))?);
        }
        Command::SetText {
            input,
            slide,
            element,
            text,
            output,
        } => {
            let mut editor = Editor::new(settings);
            open(&mut editor, &input).await?;
            if !editor.select_slide_number(slide) {
                bail!("{} has no slide {}", input.display(), slide);
            }
            let id = editor
                .current_slide()
                .and_then(|s| s.elements.get(element))
                .map(|e| e.id)
                .with_context(|| format!("slide {} has no element {}", slide, element))?;
            if !editor.update_text(id, &text) {
                bail!("element {} on slide {} does not hold text", element, slide);
            }
            save(&mut editor, &output)?;
        }
        Command::Roundtrip { input, output } => {
            let loaded = import_pptx(&input).with_context(|| format!("loading {}", input.display()))?;
            let outcome = export_pptx(&loaded.document, &loaded.package, &settings.export, &output)
                .with_context(|| format!("writing {}", output.display()))?;
            report(&outcome);
            eprintln!("Wrote {}", output.display());
        }
    }

    Ok(())
}

async fn load_settings(config_dir: Option<PathBuf>) -> anyhow::Result<store::EditorSettings> {
    let Some(dir) = config_dir else {
        return Ok(store::EditorSettings::default());
    };
    let mut manager = SettingsManager::new(dir);
    Ok(manager.load().await?.clone())
}

async fn open(editor: &mut Editor, input: &Path) -> anyhow::Result<()> {
    let bytes = store::read_presentation(input)
        .await
        .with_context(|| format!("reading {}", input.display()))?;
    editor
        .load(&bytes)
        .with_context(|| format!("loading {}", input.display()))?;
    tracing::info!("Opened {} ({} slides)", input.display(), editor.slides().len());
    Ok(())
}

fn save(editor: &mut Editor, output: &Path) -> anyhow::Result<()> {
    let outcome = editor
        .save_as(output)
        .with_context(|| format!("writing {}", output.display()))?;
    report(&outcome);
    eprintln!("Wrote {}", output.display());
    Ok(())
}

fn report(outcome: &ExportOutcome) {
    tracing::debug!("Export capabilities: {:?}", outcome.capabilities);
    for warning in &outcome.warnings {
        eprintln!("warning: {}: {}", warning.part, warning.message);
    }
    for skipped in &outcome.skipped {
        eprintln!(
            "not written: element {} ({:?})",
            skipped.element_id, skipped.reason
        );
    }
}

fn summarize(document: &Document) -> Value {
    let slides: Vec<Value> = document
        .slides
        .iter()
        .map(|slide| {
            json!({
                "number": slide.number,
                "part": slide.part_name,
                "name": slide.name,
                "elements": slide.elements.iter().map(element_summary).collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "title": document.metadata.title,
        "author": document.metadata.author,
        "slide_size": [document.slide_size.width, document.slide_size.height],
        "slides": slides,
    })
}

fn element_summary(element: &Element) -> Value {
    json!({
        "kind": element.kind.as_str(),
        "text": element.text_value(),
        "position": [element.position.x, element.position.y],
        "size": [element.size.width, element.size.height],
        "z_order": element.z_order,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_set_text() {
        let cli = Cli::try_parse_from([
            "deckedit", "set-text", "in.pptx", "--slide", "2", "--element", "0", "--text", "Hi",
            "-o", "out.pptx",
        ])
        .unwrap();
        match cli.command {
            Command::SetText { slide, element, text, .. } => {
                assert_eq!((slide, element, text.as_str()), (2, 0, "Hi"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_summarize_empty_document() {
        let summary = summarize(&Document::new());
        assert_eq!(summary["slides"], json!([]));
        assert_eq!(summary["slide_size"], json!([720.0, 540.0]));
    }
}
