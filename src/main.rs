mod assets;
mod error;
mod html;
mod patch;
mod scan;
mod settings;
mod store;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::warn;

use error::ErrorResponse;
use settings::Settings;

#[derive(Parser)]
#[command(name = "site_content", about = "Scan and patch editable content in static HTML pages")]
struct Cli {
    /// Config file (default: site_content.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List editable text, images and testimonials
    Scan {
        /// Print the full scan response as JSON
        #[arg(long)]
        json: bool,
        /// Only show one page (e.g. "Home")
        #[arg(short, long)]
        page: Option<String>,
    },
    /// Show the section markers detected in each document
    Sections,
    /// Apply a batch of edits ({"edits": [...]}) from a file, or "-" for stdin
    Patch { input: PathBuf },
    /// Copy an image into the site's images directory
    Upload { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    let result = match cli.command {
        Commands::Scan { json, page } => {
            let mut result = scan::scan_site(&settings);
            if let Some(page) = &page {
                result.pages.retain(|p| p.page.eq_ignore_ascii_case(page));
                if result.pages.is_empty() {
                    bail!("No content found for page {:?}", page);
                }
                result
                    .items
                    .retain(|i| settings.page_name(i.file()).is_some_and(|p| p.eq_ignore_ascii_case(page)));
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
                return Ok(());
            }
            print_scan(&result);
            Ok(())
        }
        Commands::Sections => {
            for spec in &settings.documents {
                let loaded = match store::load(&settings.site_root, &spec.file) {
                    Ok(doc) => doc,
                    Err(e) => {
                        warn!("{}", e);
                        continue;
                    }
                };
                let doc = html::Document::parse(&loaded.source);
                let sections = scan::sections::detect_sections(&doc, &settings.rules.sections);
                println!("{} ({}): {} sections", spec.page, spec.file, sections.len());
                for s in &sections {
                    println!("  {:>7}  {}", s.offset, s.name);
                }
            }
            Ok(())
        }
        Commands::Patch { input } => {
            let body = read_body(&input)?;
            match patch::batch::handle_patch(&body, &settings.site_root, &settings.rules) {
                Ok(resp) => {
                    println!("{}", serde_json::to_string_pretty(&resp)?);
                    Ok(())
                }
                Err(e) => {
                    println!("{}", serde_json::to_string_pretty(&ErrorResponse::from(&e))?);
                    Err(e.into())
                }
            }
        }
        Commands::Upload { file } => {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let bytes = std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
            let stored = assets::store_image(&settings.images_dir, &name, &bytes)?;
            println!("{}", serde_json::to_string_pretty(&stored)?);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_body(input: &Path) -> anyhow::Result<String> {
    if input == Path::new("-") {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read patch body from stdin")?;
        return Ok(body);
    }
    std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input.display()))
}

fn print_scan(result: &scan::ScanResult) {
    for page in &result.pages {
        println!("== {} ==", page.page);
        for section in &page.sections {
            println!("  [{}]", section.name);
            for item in &section.items {
                println!("    {:<11} | {:<40} | {}", item.kind(), truncate(item.id(), 40), truncate(&item.preview(), 60));
            }
        }
        println!();
    }

    let failed: Vec<_> = result.documents.iter().filter(|d| d.error.is_some()).collect();
    if !failed.is_empty() {
        println!("--- Unreadable ---");
        for d in &failed {
            println!("  {}: {}", d.file, d.error.as_deref().unwrap_or_default());
        }
        println!();
    }

    println!(
        "{} items across {} pages ({} documents)",
        result.items.len(),
        result.pages.len(),
        result.documents.len()
    );
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
