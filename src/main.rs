use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::GlobalArgs;

mod commands;
mod output;
mod tty;

use commands::{app, config, db};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "lutris-deploy")]
#[command(version = VERSION)]
#[command(
    about = "Deploy and maintain the Lutris website on its production, staging and local hosts"
)]
struct Cli {
    /// Target host; selects the environment profile (default: localhost)
    #[arg(short = 'H', long, global = true)]
    host: Option<String>,

    /// Path to config.json (default: ~/.config/lutris-deploy/config.json)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log every command without executing it
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Touch the wsgi file to reload the application
    #[command(visible_alias = "touch-wsgi")]
    TouchWsgiReload,
    /// Reload the reverse proxy
    #[command(visible_alias = "nginx-reload")]
    ReloadProxy,
    /// Restart the process supervisor
    #[command(visible_alias = "supervisor-restart")]
    RestartProcessSupervisor,
    /// Run the accounts test suite
    #[command(visible_alias = "test")]
    RunTests,
    /// Create the install root, virtualenv and source checkout
    InitialSetup,
    /// List installed Python packages
    #[command(visible_alias = "pip-list")]
    ListPackages,
    /// Install Python requirements
    #[command(visible_alias = "requirements")]
    InstallRequirements(app::InstallRequirementsArgs),
    /// Render and install the Celery supervisor configuration
    #[command(visible_alias = "update-celery")]
    UpdateTaskQueueConfig,
    /// Run database migrations
    #[command(visible_alias = "migrate")]
    MigrateDatabase,
    /// Check out the deploy branch and pull
    #[command(visible_alias = "pull")]
    PullLatest,
    /// Install bower and the npm dependencies
    #[command(visible_alias = "npm")]
    InstallNodeDeps,
    /// Collect static files
    #[command(visible_alias = "collect-static")]
    CollectStaticAssets,
    /// Fix ownership and group write on static and media
    #[command(visible_alias = "fix-perms")]
    FixPermissions(app::FixPermissionsArgs),
    /// Remove compiled Python bytecode
    #[command(visible_alias = "clean")]
    CleanBytecode,
    /// Check the reverse proxy configuration
    #[command(visible_alias = "configtest")]
    ProxyConfigtest,
    /// Authorize an IP address in the application
    Authorize(app::AuthorizeArgs),
    /// Dump the database and download it
    SqlDump(db::SqlDumpArgs),
    /// Restore a downloaded dump into the local database
    SqlRestore(db::SqlRestoreArgs),
    /// Full deployment: pull, build, migrate, reload and restart
    Deploy,
    /// Pull the latest code and restart the process supervisor
    Pythonfix,
    /// List the task catalog
    Tasks,
    /// Show the resolved configuration
    Config(config::ConfigArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let global = GlobalArgs {
        host: cli.host,
        config: cli.config,
        dry_run: cli.dry_run,
    };

    let (json_result, exit_code) = commands::run_json(cli.command, &global);

    if output::print_json_result(json_result).is_err() {
        return std::process::ExitCode::from(1);
    }

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
