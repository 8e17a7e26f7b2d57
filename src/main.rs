use anyhow::Context;
use billsum::config;
use billsum::prelude::*;
use clap::{Parser, Subcommand};
use log::info;

/// Browse bill summaries and generate missing ones
#[derive(Parser, Debug)]
#[command(name = "billsum")]
#[command(about = "Browse legislative bill summaries and summarize bills on demand")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Bill dataset CSV (default: house_df.csv, or BILLSUM_DATA env var)
    #[arg(long, global = true)]
    data: Option<String>,

    /// Secrets TOML with OPENAI_API_KEY and [passwords]
    /// (default: .streamlit/secrets.toml, or BILLSUM_SECRETS env var)
    #[arg(long, global = true)]
    secrets: Option<String>,

    /// Chat-completion model (default: gpt-3.5-turbo-0125, or BILLSUM_MODEL env var)
    #[arg(long, global = true)]
    model: Option<String>,

    /// Chat-completion endpoint URL
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = config::DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick bills interactively and summarize them (default)
    Browse,

    /// List bill ids and whether each has a summary
    List,

    /// Show the stored summary of one bill
    Show {
        /// Bill id, e.g. "HB 1001"
        bill_id: String,
    },

    /// Summarize one bill and save the result
    Summarize {
        /// Bill id, e.g. "HB 1001"
        bill_id: String,
    },
}

/// Flag first, then environment variable, then default
fn resolve(flag: Option<String>, env_var: &str, default: &str) -> String {
    flag.or_else(|| std::env::var(env_var).ok().filter(|v| !v.is_empty()))
        .unwrap_or_else(|| default.to_string())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn build_config(args: &Args) -> anyhow::Result<Config> {
    let mut builder = ConfigBuilder::new()
        .data_path(resolve(
            args.data.clone(),
            "BILLSUM_DATA",
            config::DEFAULT_DATA_PATH,
        ))
        .secrets_path(resolve(
            args.secrets.clone(),
            "BILLSUM_SECRETS",
            config::DEFAULT_SECRETS_PATH,
        ))
        .model(resolve(
            args.model.clone(),
            "BILLSUM_MODEL",
            config::DEFAULT_MODEL,
        ))
        .timeout_secs(args.timeout);

    if let Some(endpoint) = &args.endpoint {
        builder = builder.endpoint(endpoint.clone());
    }

    Ok(builder.build()?)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = build_config(&args)?;
    let secrets = Secrets::load(&config.secrets_path).with_context(|| {
        format!(
            "Failed to load secrets from {}",
            config.secrets_path.display()
        )
    })?;
    info!(
        "{} users configured, data file {}",
        secrets.credentials.len(),
        config.data_path.display()
    );

    let summarizer = OpenAiSummarizer::new(&config, secrets.api_key.clone())?;
    let repo = CsvRepository::new(&config.data_path);
    let mut app = App::new(&secrets.credentials, TerminalFrontend::new());

    let result = match args.command.unwrap_or(Command::Browse) {
        Command::Browse => app.browse(repo, summarizer),
        Command::List => app.list(repo),
        Command::Show { bill_id } => app.show(repo, &bill_id),
        Command::Summarize { bill_id } => app.summarize(repo, summarizer, &bill_id),
    };

    result.with_context(|| format!("Dataset: {}", config.data_path.display()))
}
