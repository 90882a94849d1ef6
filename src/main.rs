use anyhow::Context;
use clap::Parser;
use normchain::{Action, Catalog, Chain, Config, Message, NormalizeStep, StepOptions};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "normchain",
    about = "Dispatch a JSON message through the normalization step and print what comes out"
)]
struct Cli {
    /// Schema catalog (JSON) that `meta.schema` expressions are resolved against.
    #[arg(long)]
    schema: PathBuf,

    /// Message to dispatch (JSON object with `type`, `payload`, `meta`).
    #[arg(long)]
    message: PathBuf,

    /// Config file to use instead of ~/.config/normchain/config.toml.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Force pretty-printed output.
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Force single-line output.
    #[arg(long)]
    compact: bool,

    /// Write debug logs to /tmp/normchain-debug.log (tail -f to inspect).
    #[arg(long)]
    debug: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open("/tmp/normchain-debug.log")?;
        tracing_subscriber::fmt()
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_env("RUST_LOG")
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
            )
            .init();
        tracing::info!("normchain debug log started — tail -f /tmp/normchain-debug.log");
    }

    let config = match &cli.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::load().context("loading default config")?,
    };

    let catalog_text = std::fs::read_to_string(&cli.schema)
        .with_context(|| format!("reading schema catalog {}", cli.schema.display()))?;
    let catalog = Catalog::from_json(&catalog_text).context("parsing schema catalog")?;

    let message = read_message(&cli.message, &catalog)?;

    let step = NormalizeStep::new(StepOptions::from_config(&config.step));
    let chain = Chain::builder().with(step).build(|m: Arc<Action>| Ok(m));

    let forwarded = chain.dispatch(message).context("dispatching message")?;

    let pretty = (config.output.pretty || cli.pretty) && !cli.compact;
    let out = if pretty {
        serde_json::to_string_pretty(&*forwarded)?
    } else {
        serde_json::to_string(&*forwarded)?
    };
    println!("{out}");
    Ok(())
}

/// Parse a message file and resolve its `meta.schema` expression.
fn read_message(path: &std::path::Path, catalog: &Catalog) -> anyhow::Result<Action> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading message {}", path.display()))?;
    let raw: Message<serde_json::Value> =
        serde_json::from_str(&text).with_context(|| format!("parsing message {}", path.display()))?;
    raw.try_map_schema(|expr| catalog.resolve(&expr))
        .context("resolving meta.schema")
}
