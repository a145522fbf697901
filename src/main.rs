//! cutquote - CLI tool to turn laser cut reports into quote workbook models.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use cutquote_core::{
    aggregate, generate_from_review, load_reports, OutputMode, PricingConfig, QuoteTotals,
    ReviewState, WorkbookModel,
};

/// Convert CAM cut reports into priced quote and work-order workbook models.
#[derive(Parser, Debug)]
#[command(name = "cutquote")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Print the result as JSON instead of writing it
    #[arg(long, global = true)]
    debug: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract parts from report text files into a review state
    Extract {
        /// Report text files, in sheet order
        #[arg(required = true)]
        reports: Vec<PathBuf>,

        /// Pricing configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Review state output path
        #[arg(short, long, default_value = "review.json")]
        state: PathBuf,
    },

    /// Generate a workbook model from a reviewed state
    Generate {
        /// Review state produced by `extract`
        #[arg(short, long)]
        state: PathBuf,

        /// Pricing configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output shape: quote or work-order
        #[arg(short, long, default_value = "quote")]
        mode: OutputMode,

        /// Workbook model output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract and generate without a review pause
    Convert {
        /// Report text files, in sheet order
        #[arg(required = true)]
        reports: Vec<PathBuf>,

        /// Pricing configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output shape: quote or work-order
        #[arg(short, long, default_value = "quote")]
        mode: OutputMode,

        /// Workbook model output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    match args.command {
        Command::Extract {
            reports,
            config,
            state,
        } => {
            let config = load_config(config.as_deref())?;
            let review = extract(&reports, &config)?;

            if args.debug {
                println!("{}", serde_json::to_string_pretty(&review)?);
                return Ok(());
            }

            review
                .save(&state)
                .with_context(|| format!("Failed to write {}", state.display()))?;
            info!("Review state: {}", state.display());
        }
        Command::Generate {
            state,
            config,
            mode,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let review = ReviewState::load(&state)
                .with_context(|| format!("Failed to load {}", state.display()))?;
            let model = generate(&review, &config, mode)?;
            let output = output.unwrap_or_else(|| default_output(&state, mode));
            write_model(&model, &output, args.debug)?;
        }
        Command::Convert {
            reports,
            config,
            mode,
            output,
        } => {
            let config = load_config(config.as_deref())?;
            let review = extract(&reports, &config)?;
            let model = generate(&review, &config, mode)?;
            let output = output.unwrap_or_else(|| default_output(&reports[0], mode));
            write_model(&model, &output, args.debug)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PricingConfig> {
    match path {
        Some(path) => PricingConfig::load(path)
            .with_context(|| format!("Failed to load pricing config {}", path.display())),
        None => Ok(PricingConfig::default()),
    }
}

fn extract(paths: &[PathBuf], config: &PricingConfig) -> Result<ReviewState> {
    for path in paths {
        info!("Processing: {}", path.display());
    }

    let reports = load_reports(paths).context("Failed to read reports")?;
    let aggregation = aggregate(&reports, config).context("Failed to extract parts")?;

    info!(
        "Extracted {} part(s) from {} report(s), {} sheet(s)",
        aggregation.catalogue.len(),
        aggregation.sheet_runs.len(),
        aggregation.total_sheet_count()
    );

    Ok(ReviewState::from(aggregation))
}

fn generate(review: &ReviewState, config: &PricingConfig, mode: OutputMode) -> Result<WorkbookModel> {
    let model =
        generate_from_review(review, config, mode).context("Failed to generate workbook")?;

    let totals =
        QuoteTotals::compute(&review.parts, &review.sheet_runs, config, &config.default_gas)?;
    info!(
        "{} parts, {:.2} min, {:.2} lb, {} sheet(s)",
        totals.quantity, totals.machine_time_min, totals.weight_lb, totals.sheet_count
    );
    info!(
        "Cost ${:.2}, price ${:.2}, sheet stock ${:.2}",
        totals.total_cost, totals.price, totals.sheet_cost
    );

    Ok(model)
}

/// `<mode folder>/<input stem>.json`
fn default_output(input: &Path, mode: OutputMode) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("workbook");
    Path::new(mode.folder()).join(format!("{}.json", stem))
}

fn write_model(model: &WorkbookModel, output: &Path, debug: bool) -> Result<()> {
    let json = model.to_json_pretty()?;

    // Debug output
    if debug {
        println!("{}", json);
        return Ok(());
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!("Generated: {}", output.display());
    Ok(())
}
