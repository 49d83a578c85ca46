use clap::{Parser, Subcommand};
use dashboard_binding::api::{DashboardApi, HttpDashboardApi};
use dashboard_binding::binding::{DataBindingManager, GlobalConfigPatch};
use dashboard_binding::cli_messages::print_event;
use dashboard_binding::config::{DashboardConfig, default_dashboard_path};
use dashboard_binding::consts::binding_consts::EVENT_QUEUE_SIZE;
use dashboard_binding::environment::Environment;
use dashboard_binding::events::EventSender;
use dashboard_binding::presets::FunctionRegistry;
use dashboard_binding::session::{SessionStore, default_session_path};
use dashboard_binding::{logging, print_cmd_error, print_cmd_info, print_cmd_success, print_cmd_warn};
use log::debug;
use serde_json::{Map, Value};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Backend to talk to: `local` or an http(s) base URL
    #[arg(long, global = true, env = "DASHBOARD_ENVIRONMENT", default_value = "local")]
    env: Environment,

    /// Dashboard configuration file. Defaults to ~/.dashboard-binding/dashboard.json,
    /// or the built-in modules when that file does not exist.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Command to execute
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the configured modules
    List,
    /// Load modules once and print their data as JSON
    Load {
        /// Module identifiers; every module when omitted
        modules: Vec<String>,
    },
    /// Load every module once and print the per-module status
    Status,
    /// Keep every module refreshed and print load events until Ctrl-C
    Watch {
        /// Refresh interval in milliseconds, overriding the configuration
        #[arg(long, value_name = "MS")]
        interval: Option<u64>,
    },
    /// Write the built-in dashboard configuration to the configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Store a bearer token used for every backend request
    Login {
        #[arg(long)]
        token: String,
        #[arg(long)]
        username: Option<String>,
    },
    /// Clear the stored token
    Logout,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    logging::init();
    let args = Args::parse();

    match args.command {
        Command::List => {
            let config = load_dashboard_config(args.config.as_deref())?;
            for (id, module) in &config.modules {
                println!("{}\t{}\t{}", id, module.name, module.description);
            }
            Ok(())
        }
        Command::Load { modules } => {
            let manager = build_manager(&args.env, args.config.as_deref(), None)?;
            let ids = if modules.is_empty() {
                manager.module_ids()
            } else {
                modules
            };

            let mut results = Map::new();
            for id in ids {
                match manager.load_module(&id).await {
                    Ok(data) => {
                        results.insert(id, data);
                    }
                    Err(e) => print_cmd_error!("Failed to load module", e.to_string().as_str()),
                }
            }
            println!("{}", serde_json::to_string_pretty(&Value::Object(results))?);
            Ok(())
        }
        Command::Status => {
            let manager = build_manager(&args.env, args.config.as_deref(), None)?;
            manager.load_all_modules().await;
            println!("{}", serde_json::to_string_pretty(&manager.modules_status())?);
            Ok(())
        }
        Command::Watch { interval } => {
            let (event_sender, mut event_receiver) = mpsc::channel(EVENT_QUEUE_SIZE);
            let manager = build_manager(
                &args.env,
                args.config.as_deref(),
                Some(EventSender::new(event_sender)),
            )?;
            let manager = Arc::new(manager);

            manager.update_global_config(GlobalConfigPatch {
                auto_refresh: Some(true),
                refresh_interval_ms: interval,
                ..Default::default()
            });
            print_cmd_info!(
                "Watching modules",
                "{} modules, every {} ms",
                manager.module_ids().len(),
                manager.global_config().refresh_interval_ms
            );

            let initial = manager.clone();
            tokio::spawn(async move { initial.load_all_modules().await });

            loop {
                tokio::select! {
                    event = event_receiver.recv() => match event {
                        Some(event) => print_event(&event),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => {
                        debug!("Interrupted, stopping auto refresh");
                        break;
                    }
                }
            }
            manager.destroy();
            Ok(())
        }
        Command::Init { force } => {
            let path = match args.config {
                Some(path) => path,
                None => default_dashboard_path()?,
            };
            if path.exists() && !force {
                print_cmd_warn!(
                    "Configuration already exists",
                    "{} (use --force to overwrite)",
                    path.display()
                );
                return Ok(());
            }
            DashboardConfig::builtin()
                .save(&path)
                .map_err(|e| format!("Failed to save configuration: {}", e))?;
            print_cmd_success!("Configuration written", "{}", path.display());
            Ok(())
        }
        Command::Login { token, username } => {
            let session = SessionStore::open(default_session_path()?)?;
            session
                .set_token(token, username)
                .map_err(|e| format!("Failed to save session: {}", e))?;
            print_cmd_success!("Token stored", "");
            Ok(())
        }
        Command::Logout => {
            print_cmd_info!("Logging out", "clearing the stored session...");
            let session = SessionStore::open(default_session_path()?)?;
            session.clear().map_err(Into::into)
        }
    }
}

/// Reads `path`, else the default file, else the built-in modules.
fn load_dashboard_config(path: Option<&Path>) -> Result<DashboardConfig, Box<dyn Error>> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let default_path = default_dashboard_path()?;
            if !default_path.exists() {
                return Ok(DashboardConfig::builtin());
            }
            default_path
        }
    };
    DashboardConfig::load_from_file(&path)
        .map_err(|e| format!("Failed to load {}: {}", path.display(), e).into())
}

fn build_manager(
    environment: &Environment,
    config_path: Option<&Path>,
    event_sender: Option<EventSender>,
) -> Result<DataBindingManager, Box<dyn Error>> {
    let config = load_dashboard_config(config_path)?;
    let session = SessionStore::open(default_session_path()?)?;
    let api: Arc<dyn DashboardApi> = Arc::new(HttpDashboardApi::new(environment.clone(), session)?);
    debug!("Using {:?}", environment);

    let mut manager = DataBindingManager::with_config(api, config.global);
    if let Some(event_sender) = event_sender {
        manager = manager.with_events(event_sender);
    }
    for (id, e) in config.register_all(&manager, &FunctionRegistry::builtin()) {
        print_cmd_warn!("Skipping module", "{}: {}", id, e);
    }
    Ok(manager)
}
