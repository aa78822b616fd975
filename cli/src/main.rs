//! pdf-outline CLI - heading outline extraction tool

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pdf_outline::features::LineFeatures;
use pdf_outline::layout::SpanCollector;
use pdf_outline::{
    load_layout, ClassifierKind, Dataset, ExtractOptions, FeatureExtractor, HeadingModel,
    JsonFormat, Label, OutlineExtractor, StratifyBy, TrainOptions, FEATURE_NAMES,
};

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(version)]
#[command(about = "Extract title and heading outlines from PDF layouts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract outlines from layout JSON files
    Extract {
        /// Input layout files
        #[arg(value_name = "FILES", required = true)]
        inputs: Vec<PathBuf>,

        /// Output directory (stdout if not specified)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Use a trained heading model instead of the rank heuristic
        #[arg(long, value_name = "FILE", env = "PDF_OUTLINE_MODEL")]
        model: Option<PathBuf>,

        /// Labeled CSV used to train the model when it does not exist yet
        #[arg(long, value_name = "FILE", env = "PDF_OUTLINE_DATASET", requires = "model")]
        dataset: Option<PathBuf>,

        /// Maximum heading length in characters
        #[arg(long, default_value = "120")]
        max_heading_len: usize,

        /// Do not insert the title as the first outline entry
        #[arg(long)]
        no_title_entry: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Train a heading model from a labeled CSV file
    Train {
        /// Labeled feature CSV
        #[arg(value_name = "CSV")]
        input: PathBuf,

        /// Output model file
        #[arg(short, long, value_name = "FILE", default_value = "heading_model.json")]
        output: PathBuf,

        /// Number of trees
        #[arg(long, default_value = "100")]
        trees: usize,

        /// Maximum tree depth
        #[arg(long, default_value = "12")]
        max_depth: usize,

        /// Random seed for the split and the forest
        #[arg(long, default_value = "42", env = "PDF_OUTLINE_SEED")]
        seed: u64,

        /// Fraction of rows used for training
        #[arg(long, default_value = "0.8")]
        ratio: f64,

        /// Do not stratify the hold-out split by label
        #[arg(long)]
        no_stratify: bool,
    },

    /// Write per-line features of a layout file as a training CSV
    Features {
        /// Input layout file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Extract {
            inputs,
            output,
            model,
            dataset,
            max_heading_len,
            no_title_entry,
            compact,
        } => {
            let mut options = ExtractOptions::new()
                .with_max_heading_len(max_heading_len)
                .with_title_injection(!no_title_entry);
            if let Some(model_path) = model {
                options = options.with_classifier(ClassifierKind::Learned {
                    model_path,
                    dataset_path: dataset,
                });
            }
            cmd_extract(&inputs, output.as_deref(), options, compact)
        }
        Commands::Train {
            input,
            output,
            trees,
            max_depth,
            seed,
            ratio,
            no_stratify,
        } => {
            let stratify = if no_stratify {
                StratifyBy::None
            } else {
                StratifyBy::Label
            };
            let options = TrainOptions::new()
                .with_trees(trees)
                .with_max_depth(max_depth)
                .with_seed(seed)
                .with_train_ratio(ratio)
                .with_stratify(stratify);
            cmd_train(&input, &output, &options)
        }
        Commands::Features { input, output } => cmd_features(&input, output.as_deref()),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_extract(
    inputs: &[PathBuf],
    output: Option<&Path>,
    options: ExtractOptions,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let extractor = OutlineExtractor::from_options(options, &TrainOptions::default())?;
    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    if let Some(dir) = output {
        fs::create_dir_all(dir)?;
    }

    let pb = ProgressBar::new(inputs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    if output.is_none() {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }

    let mut failed = 0;
    for input in inputs {
        pb.set_message(input.display().to_string());

        let outline = match extractor.extract_file(input) {
            Ok(outline) => outline,
            Err(e) => {
                pb.suspend(|| eprintln!("{} {}", "Skipped:".red(), e));
                failed += 1;
                pb.inc(1);
                continue;
            }
        };
        let json = outline.to_json(format)?;

        match output {
            Some(dir) => {
                let path = dir.join(output_name(input));
                fs::write(&path, &json)?;
            }
            None => println!("{}", json),
        }
        pb.inc(1);
    }

    pb.finish_and_clear();

    if let Some(dir) = output {
        println!(
            "{} {} outlines written to {}",
            "Done!".green().bold(),
            inputs.len() - failed,
            dir.display()
        );
    }
    if failed > 0 {
        eprintln!("{} {} files could not be read", "Warning:".yellow(), failed);
    }

    Ok(())
}

fn output_name(input: &Path) -> String {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let stem = stem.strip_suffix(".layout").unwrap_or(&stem);
    format!("{}.json", stem)
}

fn cmd_train(
    input: &Path,
    output: &Path,
    options: &TrainOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    pb.set_message("Reading dataset...");
    let dataset = Dataset::from_csv_path(input)?;

    pb.set_message(format!("Training {} trees...", options.n_trees));
    let outcome = HeadingModel::train(&dataset, options)?;
    outcome.model.save(output)?;
    pb.finish_and_clear();

    println!("{}", "Training Summary".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Dataset".bold(), input.display());
    println!("{}: {}", "Training rows".bold(), outcome.train_size);
    println!("{}: {}", "Hold-out rows".bold(), outcome.holdout_size);
    if outcome.malformed_rows > 0 {
        println!(
            "{}: {}",
            "Skipped rows".bold(),
            outcome.malformed_rows.to_string().yellow()
        );
    }
    println!();
    println!("{}", "Hold-out Evaluation".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}", outcome.evaluation);

    println!("{} {}", "Saved to".green(), output.display());

    Ok(())
}

fn cmd_features(input: &Path, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let layout = load_layout(input)?;
    let doc = SpanCollector::new(&ExtractOptions::default()).collect(&layout);
    let lines = FeatureExtractor::new().extract(&doc);

    if let Some(path) = output {
        write_feature_csv(&lines, fs::File::create(path)?)?;
        println!(
            "{} {} lines to {}",
            "Saved".green(),
            lines.len(),
            path.display()
        );
    } else {
        write_feature_csv(&lines, io::stdout().lock())?;
    }

    Ok(())
}

/// Rows in the training CSV layout, every line labeled `Body` for hand editing.
fn write_feature_csv<W: Write>(lines: &[LineFeatures], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header = vec!["text", "page"];
    header.extend(FEATURE_NAMES);
    header.push("label");
    wtr.write_record(&header)?;

    for line in lines {
        let mut record = vec![line.text.clone(), line.page.to_string()];
        record.extend(line.features.to_array().iter().map(|v| v.to_string()));
        record.push(Label::Body.to_string());
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "pdf-outline".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("PDF heading outline extraction tool");
    println!();
    println!("License: MIT");
}
