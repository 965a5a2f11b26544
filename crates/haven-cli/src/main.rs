use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use haven_core::models::{PlanRecommendation, PlanTier};
use haven_onboarding::{controller_from_store, JsonFilePlanStore, PlanStore, StepCatalog};

use haven_cli::config;
use haven_cli::script::{self, Script};

#[derive(Debug, Parser)]
#[command(name = "haven-onboard", version, about = "Run and inspect the Haven onboarding flow")]
struct Cli {
    /// Config file (defaults to the platform config directory).
    #[arg(long, env = "HAVEN_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a JSON event script through the standard onboarding catalog.
    Run { script: PathBuf },
    /// Print the screening question catalog.
    Catalog,
    /// Set or clear the plan picked before onboarding.
    Preselect {
        #[arg(required_unless_present = "clear")]
        tier: Option<PlanTier>,
        #[arg(long, conflicts_with = "tier")]
        clear: bool,
    },
    /// Write the effective config back to disk, migrating it if needed.
    InitConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let config_path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let config = config::load_config(&config_path)?;
    let store = JsonFilePlanStore::new(config.plan_store_path(&config_path));

    match cli.command {
        Command::Run { script: script_path } => {
            let contents = std::fs::read_to_string(&script_path).map_err(|e| {
                eyre::eyre!("failed to read script at {}: {e}", script_path.display())
            })?;
            let script: Script = serde_json::from_str(&contents)?;

            let controller =
                controller_from_store(StepCatalog::standard(), &store, script.authenticated).await?;
            tracing::info!(run = %controller.run_id(), events = script.events.len(), "replaying script");

            let report = script::run_script(controller, &script, &config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Catalog => {
            let catalog: Vec<_> = haven_instruments::all_instruments()
                .iter()
                .map(|i| {
                    serde_json::json!({
                        "id": i.id(),
                        "name": i.name(),
                        "domain": i.domain(),
                        "max_total": i.max_total(),
                        "items": i.items(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        Command::Preselect { tier, clear } => match tier {
            Some(tier) if !clear => {
                let plan = PlanRecommendation {
                    tier,
                    reason: "Selected before onboarding".to_string(),
                };
                store.save_preselected(&plan).await?;
            }
            _ => store.clear_preselected().await?,
        },
        Command::InitConfig => config::save_config(&config_path, &config)?,
    }

    Ok(())
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
