use clap::Parser;
use clawfleet::cli::{Cli, Commands, ConfigAction};
use clawfleet::config::ManagerConfig;
use clawfleet::lifecycle::LifecycleState;
use clawfleet::logging;
use clawfleet::registry::GatewayStatus;
use clawfleet::GatewayRegistry;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    logging::init(cli.log_json);

    let config = ManagerConfig::load(cli.config.as_deref())?;

    let registry = GatewayRegistry::from_config(&config);

    match cli.command {
        Commands::List { json } => {
            let gateways = registry.list().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&gateways)?);
            } else {
                print_table(&gateways);
            }
        }
        Commands::Rescan => {
            let gateways = registry.rescan().await;
            println!("Discovered {} gateway(s)", gateways.len());
            print_table(&gateways);
        }
        Commands::Show { id } => {
            let document = registry.get(&id)?;
            println!("{}", serde_json::to_string_pretty(&document)?);
        }
        Commands::Persona { id, agent } => {
            let persona = match agent {
                Some(agent) => registry.agent_persona(&id, &agent),
                None => registry.persona(&id)?,
            };
            print!("{persona}");
        }
        Commands::Create(opts) => {
            let profile = registry.create(&opts.into_request()?)?;
            println!("Created {} on port {}", profile.id, profile.port);
        }
        Commands::Update(opts) => {
            let (id, request) = opts.into_request()?;
            let profile = registry.update(&id, &request)?;
            println!("Updated {} (port {})", profile.id, profile.port);
        }
        Commands::Delete { id } => {
            registry.delete(&id).await?;
            println!("Deleted {id}");
        }
        Commands::Start { id } => {
            registry.start(&id).await?;
            println!("{id} started");
        }
        Commands::Stop { id } => {
            registry.stop(&id).await?;
            println!("{id} stopped");
        }
        Commands::Restart { id } => {
            registry.restart(&id).await?;
            println!("{id} restarted");
        }
        Commands::StartAll => print!("{}", registry.start_all().await?),
        Commands::StopAll => print!("{}", registry.stop_all().await?),
        Commands::RestartAll => print!("{}", registry.restart_all().await?),
        Commands::SetupKeepalive => print!("{}", registry.setup_keep_alive().await?),
        Commands::Agents => {
            for agent in registry.agents() {
                println!("{:<12} {}", agent.id, agent.name);
            }
        }
        Commands::Models => {
            for model in registry.models() {
                println!("{model}");
            }
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => println!("{}", serde_json::to_string_pretty(&config)?),
            ConfigAction::Init => {
                let path = cli.config.as_deref().unwrap_or("clawfleet.json");
                ManagerConfig::write_default(path)?;
                info!("Configuration file created at {}", path);
            }
        },
    }

    Ok(())
}

fn print_table(gateways: &[GatewayStatus]) {
    println!(
        "{:<20} {:<24} {:>6}  {:<8} {:<10} {}",
        "ID", "NAME", "PORT", "STATE", "SUPERVISED", "MODEL"
    );
    for gateway in gateways {
        let state = match gateway.status.state {
            LifecycleState::Running => "running",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Unknown => "unknown",
        };
        let id = if gateway.profile.placeholder {
            format!("{}*", gateway.profile.id)
        } else {
            gateway.profile.id.clone()
        };
        println!(
            "{:<20} {:<24} {:>6}  {:<8} {:<10} {}",
            id,
            gateway.profile.name,
            gateway.profile.port,
            state,
            if gateway.status.supervised { "yes" } else { "no" },
            gateway.profile.model.as_deref().unwrap_or("-"),
        );
    }
}
