//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tview_core::api::ApiClient;
use tview_core::config::{self, SERVER_URL_ENV};
use tview_core::logging;

mod commands;

#[derive(Parser)]
#[command(name = "tview")]
#[command(version = "0.1")]
#[command(about = "Browse, search and export conversation threads")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Thread server base URL (overrides config)
    #[arg(long, value_name = "URL", env = SERVER_URL_ENV)]
    server: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// List, inspect and modify threads
    Threads {
        #[command(subcommand)]
        command: ThreadCommands,
    },
    /// Search across threads
    Search {
        /// Search query
        #[arg(value_name = "QUERY")]
        query: String,
    },
    /// Export a thread as PDF, falling back to the print view
    Export {
        /// The ID of the thread to export
        #[arg(value_name = "THREAD_ID")]
        id: String,
        /// File name stem (defaults to the thread title)
        #[arg(long)]
        title: Option<String>,
        /// Print the fallback URL instead of opening a browser
        #[arg(long = "no-open")]
        no_open: bool,
    },
    /// Open the printable view of a thread
    Print {
        /// The ID of the thread to print
        #[arg(value_name = "THREAD_ID")]
        id: String,
        /// Print the URL instead of opening a browser
        #[arg(long = "no-open")]
        no_open: bool,
    },
    /// Show the active source
    Source,
    /// Point the server at a new source
    SetSource {
        /// Source path on the server
        #[arg(value_name = "PATH")]
        path: String,
        /// Replace the current source even if it is in use
        #[arg(long)]
        force: bool,
    },
    /// Queue an ingest job
    Ingest {
        /// Path to ingest
        #[arg(value_name = "PATH")]
        path: String,
        /// Client tag for the ingested documents
        #[arg(long = "client", value_name = "SLUG")]
        client_slug: Option<String>,
        /// Destination on the server
        #[arg(long, default_value = "")]
        dest: String,
    },
    /// Switch the active client
    Hotswap {
        /// Client tag to switch to
        #[arg(value_name = "CLIENT")]
        client_slug: String,
    },
    /// Apply a server preset
    Preset {
        /// Preset name
        #[arg(value_name = "NAME")]
        name: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ThreadCommands {
    /// Lists threads
    List,
    /// Shows a thread with its messages
    Show {
        /// The ID of the thread to show
        #[arg(value_name = "THREAD_ID")]
        id: String,
    },
    /// Creates a thread
    Create {
        /// Thread title
        #[arg(long, default_value = "")]
        title: String,
        /// Client tag (defaults to config)
        #[arg(long = "client", value_name = "SLUG")]
        client_slug: Option<String>,
        /// Source tag (defaults to config)
        #[arg(long = "source", value_name = "SLUG")]
        source_slug: Option<String>,
    },
    /// Archives a thread
    Archive {
        #[arg(value_name = "THREAD_ID")]
        id: String,
    },
    /// Restores an archived thread
    Restore {
        #[arg(value_name = "THREAD_ID")]
        id: String,
    },
    /// Appends a prompt to a thread
    Send {
        #[arg(value_name = "THREAD_ID")]
        id: String,
        /// Message text
        #[arg(value_name = "PROMPT")]
        prompt: String,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Config commands never touch the network or the log directory.
    if let Some(Commands::Config { command }) = &cli.command {
        return match command {
            ConfigCommands::Path => {
                commands::config::path();
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(),
        };
    }

    let _log_guard = logging::init().context("init logging")?;

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config = config::Config::load().context("load config")?;
    let server = config.resolve_server_url(cli.server.as_deref())?;
    tracing::debug!(server = %server, "resolved server url");

    let Some(command) = cli.command else {
        return commands::tui::run(&config, server).await;
    };

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let client = ApiClient::new(server).with_notices(notice_tx);

    let result = match command {
        Commands::Threads { command } => match command {
            ThreadCommands::List => commands::threads::list(&client).await,
            ThreadCommands::Show { id } => commands::threads::show(&client, &id).await,
            ThreadCommands::Create {
                title,
                client_slug,
                source_slug,
            } => {
                commands::threads::create(
                    &client,
                    title,
                    client_slug.unwrap_or_else(|| config.client_slug.clone()),
                    source_slug.unwrap_or_else(|| config.source_slug.clone()),
                )
                .await
            }
            ThreadCommands::Archive { id } => commands::threads::archive(&client, &id, true).await,
            ThreadCommands::Restore { id } => commands::threads::archive(&client, &id, false).await,
            ThreadCommands::Send { id, prompt } => {
                commands::threads::send(&client, &id, &prompt).await
            }
        },
        Commands::Search { query } => commands::search::run(&client, &query).await,
        Commands::Export { id, title, no_open } => {
            let open = !no_open && config.open_print_view;
            commands::export::run(&client, &config.download_dir(), &id, title, open).await
        }
        Commands::Print { id, no_open } => commands::export::print(&client, &id, !no_open),
        Commands::Source => commands::source::show(&client).await,
        Commands::SetSource { path, force } => commands::source::set(&client, &path, force).await,
        Commands::Ingest {
            path,
            client_slug,
            dest,
        } => {
            let client_slug = client_slug.unwrap_or_else(|| config.client_slug.clone());
            commands::jobs::ingest(&client, &path, &client_slug, &dest).await
        }
        Commands::Hotswap { client_slug } => commands::jobs::hotswap(&client, &client_slug).await,
        Commands::Preset { name } => commands::jobs::preset(&client, &name).await,
        Commands::Config { .. } => Ok(()),
    };

    while let Ok(notice) = notice_rx.try_recv() {
        eprintln!("{notice}");
    }
    result
}
