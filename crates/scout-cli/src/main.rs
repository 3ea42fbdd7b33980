//! stock-scout: momentum screening and AI commentary for Taiwan stocks
//!
//! # Usage
//!
//! ```bash
//! export GEMINI_API_KEY="..."
//!
//! # Analyse a hand-picked list
//! stock-scout analyze --tickers "2330, 2317"
//!
//! # Scan the TW-50 universe, then analyse the shortlist
//! stock-scout scan --sample-size 15
//!
//! # Run several triggers in one session
//! stock-scout interactive
//! ```

mod render;
mod repl;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use scout_llm::LLMProvider;
use scout_llm::providers::{GeminiConfig, GeminiProvider};
use scout_stock::config::DEFAULT_SAMPLE_SIZE;
use scout_stock::{Language, RunOutcome, Sampling, Scout, StockConfig, Trigger};
use scout_utils::LogFormat;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_LOG_DIRECTIVE: &str = "warn,scout_stock=info";

#[derive(Parser, Debug)]
#[command(name = "stock-scout")]
#[command(version, about = "Screen TW-50 stocks and generate AI commentary", long_about = None)]
struct Cli {
    /// Output language (en, zh-TW)
    #[arg(long, global = true)]
    language: Option<Language>,

    /// Directory the Markdown report is written to
    #[arg(long, global = true, default_value = ".")]
    output_dir: PathBuf,

    /// Do not write the report file
    #[arg(long, global = true)]
    no_report: bool,

    /// Skip generated commentary; placeholders are used instead
    #[arg(long, global = true)]
    no_commentary: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse a comma-separated list of tickers
    Analyze {
        /// Tickers; bare codes get the .TW suffix
        #[arg(short, long, default_value = "2330, 2317")]
        tickers: String,
    },

    /// Scan the TW-50 universe and analyse the shortlist
    Scan {
        /// Number of symbols to scan
        #[arg(long)]
        sample_size: Option<usize>,

        /// Scan the first symbols of the universe instead of a random sample
        #[arg(long)]
        leading: bool,

        /// Seed for the random sample
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Read commands from stdin until `exit`
    Interactive,
}

/// Options shared by every trigger
pub(crate) struct Output {
    pub dir: PathBuf,
    pub write_report: bool,
}

fn build_config(cli: &Cli) -> anyhow::Result<StockConfig> {
    let mut builder = StockConfig::builder().with_env();
    if let Some(language) = cli.language {
        builder = builder.language(language);
    }

    if let Command::Scan {
        sample_size,
        leading,
        seed,
    } = &cli.command
    {
        let size = sample_size.unwrap_or(DEFAULT_SAMPLE_SIZE);
        builder = builder.sampling(if *leading {
            Sampling::Leading { size }
        } else {
            Sampling::Random { size }
        });
        if let Some(seed) = seed {
            builder = builder.seed(*seed);
        }
    }

    Ok(builder.build()?)
}

fn build_llm(
    cli: &Cli,
    config: &StockConfig,
) -> anyhow::Result<Option<Arc<dyn LLMProvider>>> {
    if cli.no_commentary {
        return Ok(None);
    }

    let gemini = GeminiConfig::from_env()
        .context("GEMINI_API_KEY is not set (use --no-commentary to run without it)")?
        .with_timeout(config.commentary_timeout);
    info!(model = %config.model, "Commentary enabled");
    Ok(Some(Arc::new(GeminiProvider::with_config(gemini)?)))
}

/// Run one trigger. A scan's shortlist is printed before the analysis starts.
pub(crate) async fn execute(
    scout: &Scout,
    trigger: Trigger,
    output: &Output,
) -> anyhow::Result<()> {
    let outcome = match trigger {
        Trigger::Scan => {
            let screening = scout.screen().await;
            println!("{}", render::screening(&screening, scout.config().language));
            scout
                .analyze(screening.selected.clone(), Some(screening))
                .await?
        }
        manual @ Trigger::Manual(_) => scout.run(manual).await?,
    };
    present(&outcome, scout, output)
}

/// Print an outcome and write its report
fn present(outcome: &RunOutcome, scout: &Scout, output: &Output) -> anyhow::Result<()> {
    let config = scout.config();
    for (symbol, reason) in &outcome.batch.failed {
        warn!(%symbol, %reason, "Symbol skipped");
    }

    println!("{}", render::cards(&outcome.batch.analyses, config.language));
    println!(
        "{}",
        render::commentaries(
            &outcome.commentaries,
            config.language,
            config.allocation_capital,
            scout.commentary_enabled(),
        )
    );

    if output.write_report {
        let path = outcome
            .report
            .write_to(&output.dir)
            .with_context(|| format!("writing report to {}", output.dir.display()))?;
        println!("📥 {}", path.display());
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    format.init(DEFAULT_LOG_DIRECTIVE);

    let config = build_config(&cli)?;
    let llm = build_llm(&cli, &config)?;
    info!(model = %config.model, language = %config.language, "Starting stock-scout");

    let output = Output {
        dir: cli.output_dir.clone(),
        write_report: !cli.no_report,
    };
    let scout = Scout::with_yahoo(config, llm)?;

    let trigger = match cli.command {
        Command::Analyze { tickers } => Trigger::Manual(scout.parse_tickers(&tickers)?),
        Command::Scan { .. } => Trigger::Scan,
        Command::Interactive => return repl::run(&scout, &output).await,
    };

    if matches!(&trigger, Trigger::Manual(symbols) if symbols.is_empty()) {
        bail!("no tickers given");
    }

    execute(&scout, trigger, &output).await
}
