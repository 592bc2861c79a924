use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use promptchain::connector::api::container::parse_model_list;
use promptchain::connector::api::{Container, ContainerConfig, Router};
use promptchain::{Commands, OverlapPolicy};

#[derive(Parser)]
#[command(name = "promptchain")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    /// API key for the completion service (overrides GEMINI_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Model to try, in priority order; repeat or comma-separate (overrides PROMPTCHAIN_MODELS)
    #[arg(short, long = "model", global = true)]
    models: Vec<String>,

    /// Endpoint URL template containing {model} (overrides GEMINI_URL_TEMPLATE)
    #[arg(long, global = true)]
    url_template: Option<String>,

    /// Per-request HTTP timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout_secs: u64,

    /// Answer offline by echoing prompts instead of calling the service
    #[arg(long, global = true)]
    mock: bool,

    /// Let a new prompt replace one still in flight instead of being ignored
    #[arg(long, global = true)]
    supersede: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn container_config(&self) -> ContainerConfig {
        let mut config = ContainerConfig::from_env();

        if let Some(key) = &self.api_key {
            config.api_key = key.clone();
        }
        let models: Vec<String> = self
            .models
            .iter()
            .flat_map(|m| parse_model_list(m))
            .collect();
        if !models.is_empty() {
            config.models = models;
        }
        if let Some(template) = &self.url_template {
            config.url_template = template.clone();
        }
        config.timeout_secs = self.timeout_secs;
        config.mock = self.mock;
        if self.supersede {
            config.overlap_policy = OverlapPolicy::SupersedeStale;
        }

        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let container = Container::new(cli.container_config())?;
    let router = Router::new(&container);

    let output = router.route(cli.command).await?;
    if !output.is_empty() {
        println!("{}", output);
    }

    Ok(())
}
