use anyhow::Result;
use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use oasiz_chat::config::{find_config_file, get_config, load_config, Config, CONFIG_FILE_NAME};
use oasiz_chat::mcp::render_result;
use oasiz_chat::models::Params;
use oasiz_chat::{Dispatcher, StreamChunk, StreamEmitter};
use std::io::Write;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Oasiz Chat - route chat messages to tools, MCP servers or an AI fallback
#[derive(Parser, Debug)]
#[command(name = "oasiz-chat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Chat backend with built-in tools, simulated MCP servers and an AI fallback", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP and WebSocket server
    Serve {
        /// Port to listen on (defaults to the configured port)
        #[arg(long, short)]
        port: Option<u16>,

        /// Host to bind to (defaults to the configured host)
        #[arg(long)]
        host: Option<String>,
    },

    /// Send one message and print the reply
    Ask {
        /// Message text
        message: String,

        /// Session the exchange is recorded under
        #[arg(long, default_value = "cli")]
        session: String,
    },

    /// Send one message and print the reply chunk by chunk
    Stream {
        /// Message text
        message: String,

        /// Session the exchange is recorded under
        #[arg(long, default_value = "cli")]
        session: String,
    },

    /// List built-in tools
    Tools,

    /// List MCP servers and their operations
    Servers,

    /// Run a tool directly
    Tool {
        /// Tool name (e.g. weather, joke)
        name: String,

        /// Tool parameter as key=value (repeatable)
        #[arg(long = "param", short = 'p', value_parser = parse_key_val)]
        params: Vec<(String, String)>,
    },

    /// Run an operation on an MCP server
    Mcp {
        /// Server name (e.g. git)
        server: String,

        /// Operation name (e.g. git_status)
        operation: String,

        /// Operation parameter as key=value (repeatable)
        #[arg(long = "param", short = 'p', value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Print the raw result object
        #[arg(long)]
        json: bool,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a default configuration file
    Init {
        /// Destination (defaults to ./oasiz.toml)
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("invalid KEY=value: no `=` found in `{}`", s))
}

/// Print all available environment variables
fn print_env_vars() {
    println!("Oasiz Chat - Environment Variables");
    println!();
    println!("API Keys:");
    println!("  OPENAI_API_KEY              Key for the AI fallback (optional)");
    println!("  WEATHER_API_KEY             OpenWeatherMap key (optional, wttr.in is used without it)");
    println!();
    println!("Configuration Overrides:");
    println!("  OASIZ_AI__MODEL             Chat completion model (default: gpt-3.5-turbo)");
    println!("  OASIZ_AI__BASE_URL          OpenAI-compatible endpoint (default: https://api.openai.com/v1)");
    println!("  OASIZ_AI__STREAM_TIMEOUT_SECS  Limit for one streamed reply (default: 300)");
    println!("  OASIZ_SANDBOX__INTERPRETER  Interpreter for code execution (default: python3)");
    println!("  OASIZ_SANDBOX__TIMEOUT_SECS Code execution time limit (default: 10)");
    println!("  OASIZ_SERVER__HOST          Listen address (default: 127.0.0.1)");
    println!("  OASIZ_SERVER__PORT          Listen port (default: 8000)");
    println!();
    println!("Other Settings:");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export OPENAI_API_KEY=\"sk-...\"");
    println!("  export OASIZ_SERVER__PORT=\"9000\"");
}

fn init_tracing(cli: &Cli) {
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let level = if cli.quiet { "error" } else { log_level };

    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("oasiz_chat={}", level)),
    );

    // Logs go to stderr so command output stays clean
    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let config = if let Some(config_path) = &cli.config {
        load_config(config_path)?
    } else if let Some(config_path) = find_config_file() {
        tracing::info!("Using config file: {}", config_path.display());
        load_config(&config_path)?
    } else {
        get_config()
    };
    Ok(config)
}

fn to_params(pairs: Vec<(String, String)>) -> Params {
    pairs.into_iter().collect()
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.env {
        print_env_vars();
        return Ok(());
    }

    init_tracing(&cli);
    let config = resolve_config(&cli)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("No command given. Run with --help for usage.");
            return Ok(());
        }
    };

    // Config commands do not need the dispatcher
    if let Commands::Config { command } = &command {
        match command {
            ConfigCommands::Init { path, force } => {
                let path = path.clone().unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
                if path.exists() && !force {
                    anyhow::bail!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    );
                }
                // Keys stay in the environment, not on disk
                let mut defaults = Config::default();
                defaults.api_keys.openai = None;
                defaults.api_keys.weather = None;
                defaults.save(&path)?;
                println!("Wrote {}", path.display());
            }
            ConfigCommands::Show => {
                let mut shown = config.clone();
                if shown.api_keys.openai.is_some() {
                    shown.api_keys.openai = Some("<set>".to_string());
                }
                if shown.api_keys.weather.is_some() {
                    shown.api_keys.weather = Some("<set>".to_string());
                }
                print!("{}", toml::to_string_pretty(&shown)?);
            }
        }
        return Ok(());
    }

    let dispatcher = Arc::new(Dispatcher::from_config(&config)?);

    match command {
        Commands::Serve { port, host } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

            if !dispatcher.ai().is_configured() {
                tracing::warn!("No OpenAI API key configured; AI fallback is disabled");
            }
            oasiz_chat::server::serve(dispatcher, addr).await?;
        }

        Commands::Ask { message, session } => {
            let envelope = dispatcher.dispatch(&session, &message).await;
            println!("{}", envelope.text());
        }

        Commands::Stream { message, session } => {
            let emitter = StreamEmitter::new(dispatcher);
            let mut chunks = emitter.stream(&session, &message);
            let mut stdout = std::io::stdout();

            while let Some(chunk) = chunks.next().await {
                match chunk {
                    StreamChunk::Text(text) => {
                        write!(stdout, "{}", text)?;
                        stdout.flush()?;
                    }
                    StreamChunk::Done => break,
                }
            }
            writeln!(stdout)?;
        }

        Commands::Tools => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Tool", "Description"]);

            for tool in dispatcher.registry().list_tools() {
                table.add_row(vec![
                    Cell::new(tool.name).add_attribute(Attribute::Bold),
                    Cell::new(tool.description),
                ]);
            }
            println!("{table}");
        }

        Commands::Servers => {
            use comfy_table::{Attribute, Cell, Table};
            let mut table = Table::new();
            table.load_preset(comfy_table::presets::UTF8_FULL);
            table.set_header(vec!["Server", "Endpoint", "Operations", "Description"]);

            for status in dispatcher.protocol().servers() {
                let server = status.server;
                table.add_row(vec![
                    Cell::new(&server.name).add_attribute(Attribute::Bold),
                    Cell::new(&server.url),
                    Cell::new(server.capabilities.join(", ")),
                    Cell::new(&server.description),
                ]);
            }
            println!("{table}");
        }

        Commands::Tool { name, params } => {
            let envelope = dispatcher.invoke_tool(&name, &to_params(params)).await;
            if !envelope.is_success() {
                anyhow::bail!("{}", envelope.text());
            }
            println!("{}", envelope.text());
        }

        Commands::Mcp {
            server,
            operation,
            params,
            json,
        } => {
            let result = dispatcher
                .execute_protocol(&server, &operation, &to_params(params))
                .await;

            if json {
                let value = match &result {
                    Ok(value) => value.clone(),
                    Err(e) => e.to_value(),
                };
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("{}", render_result(&server, &result));
            }
        }

        Commands::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}
