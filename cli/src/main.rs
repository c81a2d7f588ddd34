//! housestyle CLI - render job postings and CVs into house-styled document IR

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use housestyle::batch::{process_with_progress, Outcome};
use housestyle::profile::vocabulary;
use housestyle::render::DEFAULT_PLACEHOLDER;
use housestyle::writer::{TextPreviewWriter, WriteJob};
use housestyle::{
    detect, load_file, BatchItem, BatchOptions, DocumentWriter, Engine, Error, FormatCode,
    JsonFormat, JsonIrWriter, RenderOptions, RetryPolicy, WriterPool,
};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "housestyle")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Render job postings and CVs into house-styled document IR", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the document type of a record
    Detect {
        /// Input record (.json, .yaml, .yml)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Validate a record against its schema
    Validate {
        /// Input record (.json, .yaml, .yml)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Render a record to JSON IR
    Render {
        /// Input record (.json, .yaml, .yml)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Target format (first compatible format if not specified)
        #[arg(short, long, value_name = "CODE")]
        format: Option<FormatCode>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Token rendered for missing required values
        #[arg(long, env = "HOUSESTYLE_PLACEHOLDER", default_value = DEFAULT_PLACEHOLDER)]
        placeholder: String,
    },

    /// Render a record to a plain text preview
    Preview {
        /// Input record (.json, .yaml, .yml)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Target format (first compatible format if not specified)
        #[arg(short, long, value_name = "CODE")]
        format: Option<FormatCode>,

        /// Wrap deduced content in [~ ~]
        #[arg(long)]
        mark_inferred: bool,

        /// Token rendered for missing required values
        #[arg(long, env = "HOUSESTYLE_PLACEHOLDER", default_value = DEFAULT_PLACEHOLDER)]
        placeholder: String,
    },

    /// Render many records to many formats
    Batch {
        /// Input records or directories
        #[arg(value_name = "PATH", required = true)]
        inputs: Vec<PathBuf>,

        /// Target formats (every compatible format if none given)
        #[arg(short, long = "format", value_name = "CODE")]
        formats: Vec<FormatCode>,

        /// Output directory
        #[arg(short, long, value_name = "DIR", default_value = "housestyle_output")]
        output: PathBuf,

        /// Worker threads
        #[arg(short, long, env = "HOUSESTYLE_WORKERS")]
        workers: Option<usize>,

        /// Process pairs one at a time
        #[arg(long)]
        sequential: bool,

        /// Exit non-zero when any record fails detection or validation
        #[arg(long)]
        strict: bool,

        /// Time budget per pair, in milliseconds
        #[arg(long, value_name = "MS")]
        timeout_ms: Option<u64>,

        /// Write attempts per artifact
        #[arg(long, default_value = "3")]
        retries: u32,

        /// Also write plain text previews
        #[arg(long)]
        preview: bool,

        /// Token rendered for missing required values
        #[arg(long, env = "HOUSESTYLE_PLACEHOLDER", default_value = DEFAULT_PLACEHOLDER)]
        placeholder: String,
    },

    /// List supported formats
    Formats,

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Detect { input } => cmd_detect(&input),
        Commands::Validate { input } => cmd_validate(&input),
        Commands::Render {
            input,
            format,
            output,
            compact,
            placeholder,
        } => cmd_render(&input, format, output.as_deref(), compact, &placeholder),
        Commands::Preview {
            input,
            format,
            mark_inferred,
            placeholder,
        } => cmd_preview(&input, format, mark_inferred, &placeholder),
        Commands::Batch {
            inputs,
            formats,
            output,
            workers,
            sequential,
            strict,
            timeout_ms,
            retries,
            preview,
            placeholder,
        } => {
            let mut options = BatchOptions::new().strict(strict);
            if sequential {
                options = options.sequential();
            }
            if let Some(n) = workers {
                options = options.with_workers(n);
            }
            if let Some(ms) = timeout_ms {
                options = options.with_timeout(Duration::from_millis(ms));
            }
            cmd_batch(
                &inputs,
                &formats,
                &output,
                &options,
                retries,
                preview,
                &placeholder,
            )
        }
        Commands::Formats => {
            cmd_formats();
            Ok(0)
        }
        Commands::Version => {
            cmd_version();
            Ok(0)
        }
    };

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

fn engine(placeholder: &str) -> Engine {
    Engine::new().with_options(RenderOptions::new().with_placeholder(placeholder))
}

/// Explicit format, or the first one the record can target.
fn pick_format(engine: &Engine, raw: &serde_json::Value, format: Option<FormatCode>) -> CliResult<FormatCode> {
    if let Some(format) = format {
        return Ok(format);
    }
    let record = engine.validate(raw)?;
    engine
        .registry()
        .compatible_formats(&record)
        .first()
        .copied()
        .ok_or_else(|| format!("No format can render {}", record.doc_type()).into())
}

fn cmd_detect(input: &Path) -> CliResult<i32> {
    let raw = load_file(input)?;
    let doc_type = detect(&raw)?;
    println!("{}", doc_type);
    Ok(0)
}

fn cmd_validate(input: &Path) -> CliResult<i32> {
    let raw = load_file(input)?;
    match Engine::new().validate(&raw) {
        Ok(record) => {
            println!(
                "{} {} ({}, {})",
                "Valid".green().bold(),
                input.display(),
                record.doc_type(),
                record.language()
            );
            Ok(0)
        }
        Err(Error::Validation(errors)) => {
            println!(
                "{} {} ({} violations)",
                "Invalid".red().bold(),
                input.display(),
                errors.len()
            );
            for violation in &errors.violations {
                let path = if violation.path.is_empty() {
                    "<root>"
                } else {
                    violation.path.as_str()
                };
                println!(
                    "  {} {} {}",
                    "├─".dimmed(),
                    path.yellow(),
                    violation.message
                );
            }
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_render(
    input: &Path,
    format: Option<FormatCode>,
    output: Option<&Path>,
    compact: bool,
    placeholder: &str,
) -> CliResult<i32> {
    let engine = engine(placeholder);
    let raw = load_file(input)?;
    let format = pick_format(&engine, &raw, format)?;
    let doc = engine.render(&raw, format)?;

    let json_format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = housestyle::render::to_json(&doc, json_format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!("{} {} ({})", "Saved to".green(), path.display(), format);
    } else {
        println!("{}", json);
    }
    Ok(0)
}

fn cmd_preview(
    input: &Path,
    format: Option<FormatCode>,
    mark_inferred: bool,
    placeholder: &str,
) -> CliResult<i32> {
    let engine = engine(placeholder);
    let raw = load_file(input)?;
    let format = pick_format(&engine, &raw, format)?;
    let doc = engine.render(&raw, format)?;
    println!("{}", housestyle::render::to_text(&doc, mark_inferred));
    Ok(0)
}

/// Record files named on the command line, expanding directories one level.
fn collect_inputs(inputs: &[PathBuf]) -> CliResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut entries: Vec<PathBuf> = fs::read_dir(input)?
                .filter_map(|e| e.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && housestyle::InputFormat::from_path(p).is_ok())
                .collect();
            entries.sort();
            log::debug!("{}: {} records", input.display(), entries.len());
            files.extend(entries);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn cmd_batch(
    inputs: &[PathBuf],
    formats: &[FormatCode],
    output: &Path,
    options: &BatchOptions,
    retries: u32,
    preview: bool,
    placeholder: &str,
) -> CliResult<i32> {
    let files = collect_inputs(inputs)?;
    if files.is_empty() {
        println!("{}", "No input records found".yellow());
        return Ok(0);
    }
    let items: Vec<BatchItem> = files.iter().map(BatchItem::load).collect();
    let engine = engine(placeholder);

    let pb = if formats.is_empty() {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {pos} pairs {msg}")
                .unwrap(),
        );
        pb
    } else {
        let pb = ProgressBar::new((items.len() * formats.len()) as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap()
                .progress_chars("#>-"),
        );
        pb
    };
    pb.set_message("Rendering...");

    let report = process_with_progress(&engine, &items, formats, options, |outcome| {
        pb.set_message(outcome.artifact_stem());
        pb.inc(1);
    });
    pb.finish_with_message("Done!");

    let jobs: Vec<WriteJob> = report
        .outcomes
        .iter()
        .filter_map(|o| {
            o.document()
                .map(|doc| WriteJob::new(o.artifact_stem(), doc.clone()))
        })
        .collect();

    let retry = RetryPolicy::new().with_max_attempts(retries);
    let workers = options.workers.unwrap_or(4);
    let mut writers: Vec<Arc<dyn DocumentWriter>> = vec![Arc::new(JsonIrWriter::new())];
    if preview {
        writers.push(Arc::new(TextPreviewWriter::new()));
    }

    let mut write_failures = 0;
    for writer in writers {
        let pool = WriterPool::new(writer, output)
            .with_workers(workers)
            .with_retry(retry);
        for outcome in pool.write_all(jobs.clone())? {
            if let Err(e) = &outcome.result {
                write_failures += 1;
                eprintln!("{} {}: {}", "Write failed".red(), outcome.stem, e);
            }
        }
    }

    fs::create_dir_all(output)?;
    fs::write(output.join("report.json"), report.to_json()?)?;

    println!();
    println!("{}", "Batch Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Records".bold(), report.items);
    println!("{}: {}", "Pairs".bold(), report.total());
    println!("{}: {}", "Succeeded".bold(), report.succeeded.to_string().green());
    println!("{}: {}", "Failed".bold(), report.failed.to_string().red());
    println!("{}: {}", "Cache hits".bold(), report.cache_hits);
    if write_failures > 0 {
        println!("{}: {}", "Write failures".bold(), write_failures.to_string().red());
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!();
        println!("{}", "Failures".red().bold());
        for (i, failure) in failures.iter().enumerate() {
            let branch = if i + 1 == failures.len() { "└─" } else { "├─" };
            if let Outcome::Failure { error } = &failure.outcome {
                println!(
                    "  {} {} [{:?}/{:?}] {}",
                    branch.dimmed(),
                    failure.artifact_stem(),
                    error.stage,
                    error.kind,
                    error.message
                );
                for violation in &error.violations {
                    println!("       {} {}", violation.path.yellow(), violation.message);
                }
            }
        }
    }

    println!();
    println!("{} {}", "Report:".green(), output.join("report.json").display());
    Ok(report.exit_code(options.strict))
}

fn cmd_formats() {
    let engine = Engine::new();
    println!("{}", "Supported Formats".cyan().bold());
    println!("{}", "─".repeat(60).dimmed());
    for code in engine.registry().formats() {
        let Some(profile) = engine.registry().profile(code) else {
            continue;
        };
        let language = code
            .fixed_language()
            .map(|l| l.code().to_string())
            .unwrap_or_else(|| "record".to_string());
        println!(
            "{:<12} {:<16} {:<7} {} v{}",
            code.as_str().bold(),
            code.doc_type().as_str(),
            language,
            profile.font.name,
            profile.version
        );
        if let Some(lang) = code.fixed_language() {
            let titles: Vec<&str> = (0..vocabulary(lang).section_count(code.doc_type()))
                .filter_map(|slot| vocabulary(lang).section_title(code.doc_type(), slot))
                .collect();
            println!("{:<12} {}", "", titles.join(" · ").dimmed());
        }
    }
}

fn cmd_version() {
    println!("{} {}", "housestyle".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("House-style rendering of job postings and CVs");
    println!();
    println!("License: MIT");
}
