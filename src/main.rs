//! Garaj Admin CLI
//!
//! Drives the admin dashboard controller from a terminal: every subcommand
//! restores (or opens) the backend session, lands on the matching view and
//! prints what that view shows.
//!
//! Rendered sections go to stdout; toasts go to stderr.
//!
//! # Configuration
//!
//! See `garaj-admin config` for the file format. Environment variables:
//! - `GARAJ_ADMIN_API_URL`: Backend origin
//! - `GARAJ_ADMIN_USERNAME` / `GARAJ_ADMIN_PASSWORD`: Login when no session
//! - `GARAJ_ADMIN_LOG_LEVEL` / `GARAJ_ADMIN_LOG_FORMAT`: Logging
//! - `GARAJ_ADMIN_THEME_FILE`: Theme preference file
//! - `RUST_LOG`: Overrides the configured log filter

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand, ValueEnum};
use garaj_admin::api::dto::{NewAdmin, SettingsUpdate};
use garaj_admin::config::LoggingConfig;
use garaj_admin::{
    generate_default_config, AppState, AssumeYes, ChartSlot, Config, Confirm, Dashboard,
    FileThemeStore, GrowthPeriod, HttpAdminClient, Outcome, Section, Theme, View,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "garaj-admin")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "GarajHub admin dashboard from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend URL, overriding the config file
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Html, global = true)]
    pub format: OutputFormat,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    pub yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Html,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Statistics cards, charts and recent activity
    Dashboard,

    /// List bot users
    Users {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, active, inactive
        #[arg(long, default_value = "all")]
        filter: String,
    },

    /// List startups
    Startups {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value = "")]
        search: String,
        /// all, pending, active, completed, rejected
        #[arg(long, default_value = "all")]
        status: String,
    },

    /// Show one startup
    Startup { id: String },

    /// Approve a pending startup
    Approve { id: String },

    /// Reject a pending startup
    Reject { id: String },

    /// Detailed statistics
    Statistics {
        /// day, week, month, year
        #[arg(short, long)]
        period: Option<GrowthPeriod>,
    },

    /// List admin accounts
    Admins,

    /// Create an admin account
    AddAdmin {
        username: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "admin")]
        role: String,
        /// Read from stdin when omitted
        #[arg(long)]
        password: Option<String>,
    },

    /// Delete an admin account
    DeleteAdmin { id: String },

    /// List backups
    Backups,

    /// Create a backup
    BackupCreate,

    /// Delete a backup
    BackupDelete { id: String },

    /// Download a backup file
    BackupDownload {
        filename: String,
        /// Output file (default: the backup's file name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show site and bot settings
    Settings,

    /// Change site settings; omitted fields keep their current value
    SettingsSet {
        #[arg(long)]
        site_name: Option<String>,
        #[arg(long)]
        admin_email: Option<String>,
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Send a message to bot users
    Broadcast {
        message: String,
        /// Recipient group
        #[arg(long, default_value = "all")]
        to: String,
    },

    /// Set the dashboard theme
    Theme { theme: Theme },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// y/N prompt on stderr
struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{} [y/N] ", prompt);
        if std::io::stderr().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes" | "ha"),
            Err(_) => false,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }

    init_logging(&config.logging);
    tracing::debug!("garaj-admin v{}", env!("CARGO_PKG_VERSION"));

    let result = run(cli, &config).await;
    if let Err(e) = &result {
        tracing::debug!("command failed: {:#}", e);
    }
    result
}

fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("garaj_admin={}", logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}

async fn run(cli: Cli, config: &Config) -> anyhow::Result<()> {
    if let Commands::Config { output } = &cli.command {
        let content = generate_default_config();
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .with_context(|| format!("writing {}", path.display()))?;
                eprintln!("Config written to {}", path.display());
            }
            None => print!("{}", content),
        }
        return Ok(());
    }

    let theme_path = config
        .theme
        .file
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(FileThemeStore::default_path);
    let themes = Arc::new(FileThemeStore::new(theme_path));

    let confirm: Arc<dyn Confirm> = if cli.yes {
        Arc::new(AssumeYes)
    } else {
        Arc::new(TerminalConfirm)
    };

    let api = Arc::new(HttpAdminClient::new(config.api.client_config())?);
    let dashboard = Dashboard::new(api, config)
        .with_theme_store(themes)
        .with_confirm(confirm);

    if let Commands::Theme { theme } = &cli.command {
        let applied = dashboard.toggle_theme(*theme == Theme::Dark);
        let (name, value) = dashboard.theme_attribute();
        println!("{}=\"{}\"", name, value);
        tracing::info!(theme = applied.as_str(), "theme saved");
        return Ok(());
    }

    let signed_in = match landing_view(&cli.command) {
        Some(landing) => dashboard.boot_into(landing).await != View::Login,
        None => dashboard.resume().await,
    };
    if !signed_in {
        flush_toasts(&dashboard);
        bail!("not signed in; set GARAJ_ADMIN_USERNAME and GARAJ_ADMIN_PASSWORD or [auth] in the config");
    }

    let outcome = execute(&dashboard, cli.command, cli.format).await?;
    flush_toasts(&dashboard);

    match outcome {
        Outcome::Applied => Ok(()),
        Outcome::Declined => {
            eprintln!("Bekor qilindi");
            Ok(())
        }
        other => bail!("command did not complete: {:?}", other),
    }
}

/// View whose loader fetches what the command prints. `None` when the
/// command loads its own section with non-default parameters.
fn landing_view(command: &Commands) -> Option<View> {
    let view = match command {
        Commands::Dashboard => View::Dashboard,
        Commands::Users {
            page,
            search,
            filter,
        } => {
            if custom_users_query(*page, search, filter) {
                return None;
            }
            View::Users
        }
        Commands::Startups {
            page,
            search,
            status,
        } => {
            if custom_startups_query(*page, search, status) {
                return None;
            }
            View::Startups
        }
        Commands::Statistics { period: Some(_) } => return None,
        Commands::Startup { .. }
        | Commands::Approve { .. }
        | Commands::Reject { .. } => View::Startups,
        Commands::Statistics { .. } => View::Statistics,
        Commands::Admins | Commands::AddAdmin { .. } | Commands::DeleteAdmin { .. } => {
            View::Admins
        }
        Commands::Backups
        | Commands::BackupCreate
        | Commands::BackupDelete { .. }
        | Commands::BackupDownload { .. } => View::Backup,
        Commands::Settings | Commands::SettingsSet { .. } => View::Settings,
        Commands::Broadcast { .. } => View::Settings,
        Commands::Theme { .. } | Commands::Config { .. } => View::Dashboard,
    };
    Some(view)
}

fn custom_users_query(page: u32, search: &str, filter: &str) -> bool {
    page != 1 || !search.is_empty() || filter != "all"
}

fn custom_startups_query(page: u32, search: &str, status: &str) -> bool {
    page != 1 || !search.is_empty() || status != "all"
}

async fn execute(
    dashboard: &Dashboard,
    command: Commands,
    format: OutputFormat,
) -> anyhow::Result<Outcome> {
    let outcome = match command {
        Commands::Dashboard => {
            let sections = [Section::Statistics, Section::Distribution, Section::Activity];
            emit(dashboard, format, &sections, |s| {
                serde_json::json!({
                    "statistics": s.statistics(),
                    "user_growth": s.growth(ChartSlot::UserGrowth),
                    "distribution": s.distribution(),
                    "distribution_total": s.distribution_total(),
                    "activity": s.activity(),
                })
            })?;
            Outcome::Applied
        }

        Commands::Users {
            page,
            search,
            filter,
        } => {
            let mut outcome = Outcome::Applied;
            if custom_users_query(page, &search, &filter) {
                outcome = dashboard.query_users(&search, &filter, page).await;
            }
            emit(dashboard, format, &[Section::Users], |s| {
                serde_json::json!({
                    "users": s.users(),
                    "pagination": s.pagination(Section::Users),
                })
            })?;
            print_pagination(dashboard.users_pagination(), format);
            outcome
        }

        Commands::Startups {
            page,
            search,
            status,
        } => {
            let mut outcome = Outcome::Applied;
            if custom_startups_query(page, &search, &status) {
                outcome = dashboard.query_startups(&search, &status, page).await;
            }
            emit(dashboard, format, &[Section::Startups], |s| {
                serde_json::json!({
                    "startups": s.startups(),
                    "pagination": s.pagination(Section::Startups),
                })
            })?;
            print_pagination(dashboard.startups_pagination(), format);
            outcome
        }

        Commands::Startup { id } => {
            let outcome = dashboard.view_startup(&id).await;
            emit(dashboard, format, &[Section::StartupDetail], |s| {
                serde_json::json!(s.startup_detail())
            })?;
            outcome
        }

        Commands::Approve { id } => {
            let outcome = dashboard.approve_startup(&id).await;
            emit_if_applied(dashboard, format, &outcome, Section::Startups, |s| {
                serde_json::json!(s.startups())
            })?;
            outcome
        }

        Commands::Reject { id } => {
            let outcome = dashboard.reject_startup(&id).await;
            emit_if_applied(dashboard, format, &outcome, Section::Startups, |s| {
                serde_json::json!(s.startups())
            })?;
            outcome
        }

        Commands::Statistics { period } => {
            let mut outcome = Outcome::Applied;
            if let Some(period) = period {
                dashboard
                    .set_growth_period(ChartSlot::StatisticsGrowth, period)
                    .await;
                outcome = dashboard.load_detailed_statistics().await;
            }
            emit(dashboard, format, &[Section::DetailedStatistics], |s| {
                serde_json::json!({
                    "statistics": s.statistics(),
                    "period": s.growth_period(ChartSlot::StatisticsGrowth).as_str(),
                    "user_growth": s.growth(ChartSlot::StatisticsGrowth),
                })
            })?;
            outcome
        }

        Commands::Admins => {
            emit(dashboard, format, &[Section::Admins], |s| serde_json::json!(s.admins()))?;
            Outcome::Applied
        }

        Commands::AddAdmin {
            username,
            full_name,
            email,
            role,
            password,
        } => {
            let password = match password {
                Some(password) => password,
                None => read_secret("Parol: ")?,
            };
            let admin = NewAdmin {
                username,
                full_name,
                email,
                role,
                password,
            };
            let outcome = dashboard.add_admin(&admin).await;
            emit_if_applied(dashboard, format, &outcome, Section::Admins, |s| {
                serde_json::json!(s.admins())
            })?;
            outcome
        }

        Commands::DeleteAdmin { id } => {
            let outcome = dashboard.delete_admin(&id).await;
            emit_if_applied(dashboard, format, &outcome, Section::Admins, |s| {
                serde_json::json!(s.admins())
            })?;
            outcome
        }

        Commands::Backups => {
            emit(dashboard, format, &[Section::Backups], |s| serde_json::json!(s.backups()))?;
            Outcome::Applied
        }

        Commands::BackupCreate => {
            let outcome = dashboard.create_backup().await;
            emit_if_applied(dashboard, format, &outcome, Section::Backups, |s| {
                serde_json::json!(s.backups())
            })?;
            outcome
        }

        Commands::BackupDelete { id } => {
            let outcome = dashboard.delete_backup(&id).await;
            emit_if_applied(dashboard, format, &outcome, Section::Backups, |s| {
                serde_json::json!(s.backups())
            })?;
            outcome
        }

        Commands::BackupDownload { filename, output } => {
            match dashboard.download_backup(&filename).await {
                Some(bytes) => {
                    let path = output.unwrap_or_else(|| PathBuf::from(&filename));
                    std::fs::write(&path, &bytes)
                        .with_context(|| format!("writing {}", path.display()))?;
                    eprintln!("{} ({} bayt)", path.display(), bytes.len());
                    Outcome::Applied
                }
                None => Outcome::Unreachable,
            }
        }

        Commands::Settings => {
            emit(dashboard, format, &[Section::Settings], |s| serde_json::json!(s.settings()))?;
            Outcome::Applied
        }

        Commands::SettingsSet {
            site_name,
            admin_email,
            timezone,
        } => {
            let current = dashboard.state(|s| s.settings().map(|settings| settings.to_update()));
            let Some(current) = current else {
                bail!("current settings could not be loaded");
            };
            let update = SettingsUpdate {
                site_name: site_name.unwrap_or(current.site_name),
                admin_email: admin_email.unwrap_or(current.admin_email),
                timezone: timezone.unwrap_or(current.timezone),
            };
            dashboard.save_settings(&update).await
        }

        Commands::Broadcast { message, to } => {
            let outcome = dashboard.broadcast(&message, &to).await;
            if outcome.is_applied() {
                match format {
                    OutputFormat::Html => println!("{}", dashboard.broadcast_history_markup()),
                    OutputFormat::Json => {
                        let history = dashboard.state(|s| {
                            serde_json::to_string_pretty(&s.broadcasts().collect::<Vec<_>>())
                        })?;
                        println!("{}", history);
                    }
                }
            }
            outcome
        }

        Commands::Theme { .. } | Commands::Config { .. } => Outcome::Applied,
    };

    Ok(outcome)
}

fn emit(
    dashboard: &Dashboard,
    format: OutputFormat,
    sections: &[Section],
    json: impl FnOnce(&AppState) -> serde_json::Value,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Html => {
            for section in sections {
                if let Some(markup) = dashboard.markup(*section) {
                    println!("{}", markup);
                }
            }
        }
        OutputFormat::Json => {
            let value = dashboard.state(json);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }
    Ok(())
}

fn emit_if_applied(
    dashboard: &Dashboard,
    format: OutputFormat,
    outcome: &Outcome,
    section: Section,
    json: impl FnOnce(&AppState) -> serde_json::Value,
) -> anyhow::Result<()> {
    if outcome.is_applied() {
        emit(dashboard, format, &[section], json)?;
    }
    Ok(())
}

fn print_pagination(control: Option<garaj_admin::PaginationControl>, format: OutputFormat) {
    if let (Some(control), OutputFormat::Html) = (control, format) {
        println!("{}", control.markup());
    }
}

fn read_secret(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}", prompt);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn flush_toasts(dashboard: &Dashboard) {
    for toast in dashboard.notifications().active() {
        eprintln!("[{}] {}", toast.kind.as_str(), toast.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "garaj-admin",
            "startups",
            "--status",
            "pending",
            "--page",
            "2",
            "--format",
            "json",
            "--yes",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.yes);
        match cli.command {
            Commands::Startups { page, status, .. } => {
                assert_eq!(page, 2);
                assert_eq!(status, "pending");
            }
            _ => panic!("expected startups"),
        }
    }

    #[test]
    fn test_cli_parses_typed_arguments() {
        let cli = Cli::try_parse_from(["garaj-admin", "statistics", "-p", "week"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Statistics {
                period: Some(GrowthPeriod::Week)
            }
        ));

        let cli = Cli::try_parse_from(["garaj-admin", "theme", "dark"]).unwrap();
        assert!(matches!(cli.command, Commands::Theme { theme: Theme::Dark }));

        assert!(Cli::try_parse_from(["garaj-admin", "theme", "sepia"]).is_err());
        assert!(Cli::try_parse_from(["garaj-admin", "statistics", "-p", "decade"]).is_err());
    }

    #[test]
    fn test_actions_land_on_the_view_they_reload() {
        assert_eq!(landing_view(&Commands::Approve { id: "abc".into() }), Some(View::Startups));
        assert_eq!(landing_view(&Commands::BackupCreate), Some(View::Backup));
        assert_eq!(
            landing_view(&Commands::DeleteAdmin { id: "2".into() }),
            Some(View::Admins)
        );
        assert_eq!(landing_view(&Commands::Settings), Some(View::Settings));
    }

    #[test]
    fn test_custom_queries_skip_the_landing_load() {
        let parse = |args: &[&str]| Cli::try_parse_from(args).unwrap().command;

        assert_eq!(landing_view(&parse(&["garaj-admin", "users"])), Some(View::Users));
        assert_eq!(landing_view(&parse(&["garaj-admin", "users", "--page", "2"])), None);
        assert_eq!(
            landing_view(&parse(&["garaj-admin", "startups", "--status", "pending"])),
            None
        );
        assert_eq!(
            landing_view(&parse(&["garaj-admin", "statistics"])),
            Some(View::Statistics)
        );
        assert_eq!(landing_view(&parse(&["garaj-admin", "statistics", "-p", "week"])), None);
    }
}
