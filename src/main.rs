use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use irr::{output, parse_blocks, read_path, Analyzer, FleissVariance, ObservationMatrix};

/// Inter-rater reliability: Krippendorff's alpha, Fleiss' kappa and
/// Cohen's kappa for every variable block of a comma-separated file.
#[derive(Parser, Debug)]
#[command(name = "irr", version)]
#[command(after_help = "\
Input: one block per variable, separated by empty lines.

  variable,observer1,observer2
  @scale,ordinal,Low,Mid,High
  unit1,Low,Mid
  unit2,,High")]
struct Cli {
    /// Input file (reads stdin when omitted)
    file: Option<PathBuf>,

    /// Bootstrap resamples for Krippendorff's alpha (0 disables)
    #[arg(long, env = "IRR_RESAMPLES", default_value = "20000")]
    resamples: usize,

    /// Deterministic bootstrap seed
    #[arg(long, env = "IRR_SEED")]
    seed: Option<u64>,

    /// Confidence level, repeatable (default: 0.95 and 0.99)
    #[arg(long = "level", value_name = "P")]
    levels: Vec<f64>,

    /// Report Fleiss' kappa without interval or p-values
    #[arg(long)]
    no_fleiss_variance: bool,

    /// Stop bootstrapping after this many milliseconds per variable
    #[arg(long, env = "IRR_DEADLINE_MS")]
    deadline_ms: Option<u64>,

    /// Emit JSON, one report per line
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn analyzer(&self) -> Analyzer {
        let mut analyzer = Analyzer::new().resamples(self.resamples);
        if let Some(seed) = self.seed {
            analyzer = analyzer.seed(seed);
        }
        if !self.levels.is_empty() {
            analyzer = analyzer.confidence_levels(self.levels.clone());
        }
        if self.no_fleiss_variance {
            analyzer = analyzer.fleiss_variance(FleissVariance::Disabled);
        }
        if let Some(ms) = self.deadline_ms {
            analyzer = analyzer.max_duration_ms(ms);
        }
        analyzer
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let analyzer = cli.analyzer();

    let blocks: Box<dyn Iterator<Item = irr::Result<ObservationMatrix>>> = match &cli.file {
        Some(path) => Box::new(
            read_path(path).with_context(|| format!("cannot read {}", path.display()))?,
        ),
        None => Box::new(parse_blocks(io::stdin().lock())),
    };

    run(blocks, &analyzer, cli.json, &mut io::stdout().lock())
}

fn run(
    blocks: impl Iterator<Item = irr::Result<ObservationMatrix>>,
    analyzer: &Analyzer,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let mut failed = 0usize;
    let mut total = 0usize;

    for block in blocks {
        total += 1;
        let report = block.and_then(|matrix| {
            analyzer.analyze(&matrix).map_err(|e| {
                error!(variable = matrix.variable(), error = %e, "analysis failed");
                e
            })
        });
        match report {
            Ok(report) if json => writeln!(out, "{}", output::to_json(&report)?)?,
            Ok(report) => writeln!(out, "{}", output::format_report(&report))?,
            Err(e) => {
                failed += 1;
                eprintln!("irr: {}", e);
            }
        }
    }
    out.flush()?;

    if failed > 0 {
        bail!("{} of {} variables failed", failed, total);
    }
    Ok(())
}
