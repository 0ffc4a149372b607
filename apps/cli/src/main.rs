use std::time::{Duration, Instant};

use anyhow::Result;
use clap::{Parser, ValueEnum};
use console::{StyledObject, style};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use fitbrief_core::{
    DifficultyTier, Pipeline, Provider, Settings, VideoSummary, format_summary_readable,
};

fn format_elapsed(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

/// CLI wrapper for Provider enum (needed for clap ValueEnum)
#[derive(Clone, Default, ValueEnum)]
enum CliProvider {
    #[default]
    Openai,
    Grok,
    Gemini,
}

impl From<CliProvider> for Provider {
    fn from(cli: CliProvider) -> Self {
        match cli {
            CliProvider::Openai => Provider::Openai,
            CliProvider::Grok => Provider::Grok,
            CliProvider::Gemini => Provider::Gemini,
        }
    }
}

#[derive(Parser)]
#[command(name = "fitbrief")]
#[command(about = "Turn a YouTube workout video into a structured workout plan")]
struct Cli {
    /// YouTube video URL (youtube.com/watch?v=... or youtu.be/...)
    url: String,

    /// AI provider for the workout analysis
    #[arg(short, long, default_value = "openai")]
    provider: CliProvider,

    /// Override the provider's default model
    #[arg(short, long)]
    model: Option<String>,

    /// Print the summary as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn styled_difficulty(difficulty: &str) -> StyledObject<&str> {
    match DifficultyTier::classify(difficulty) {
        DifficultyTier::Beginner => style(difficulty).green(),
        DifficultyTier::Intermediate => style(difficulty).yellow(),
        DifficultyTier::Advanced => style(difficulty).red(),
    }
}

fn print_summary(summary: &VideoSummary) {
    println!(
        "{} {}  {}",
        style("▶").cyan().bold(),
        styled_difficulty(&summary.difficulty).bold(),
        style(&summary.workout_type).cyan()
    );
    if !summary.thumbnail.is_empty() {
        println!("{} {}", style("Thumbnail:").dim(), style(&summary.thumbnail).dim());
    }
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", format_summary_readable(summary));
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env first so RUST_LOG from it reaches the filter.
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let provider: Provider = cli.provider.into();
    let mut settings = Settings::from_env(provider);
    if let Some(model) = cli.model {
        settings = settings.with_model(model);
    }
    tracing::debug!(provider = provider.name(), model = %settings.model, "settings loaded");

    let pipeline = Pipeline::from_settings(&settings);

    if !cli.json {
        println!(
            "\n{}  {}\n",
            style("fitbrief").cyan().bold(),
            style("Workout Analyzer").dim()
        );
    }

    let start = Instant::now();
    let spinner = create_spinner("Checking URL...");
    let progress = spinner.clone();
    let result = pipeline
        .summarize_with(&cli.url, move |stage| {
            progress.set_message(stage.describe());
        })
        .await;

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            spinner.finish_and_clear();
            eprintln!("{} {}", style("Error:").red().bold(), e.user_message());
            std::process::exit(1);
        }
    };

    if cli.json {
        spinner.finish_and_clear();
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    spinner.finish_with_message(format!(
        "{} Analyzed with {} {}",
        style("✓").green().bold(),
        provider.name(),
        style(format!("[{}]", format_elapsed(start.elapsed()))).dim()
    ));
    println!();
    print_summary(&summary);

    Ok(())
}
