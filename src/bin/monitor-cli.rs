use clap::{Parser, Subcommand, ValueEnum};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "monitor-cli")]
#[command(about = "Command-line client for the ekaty-monitor status API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8090")]
    url: String,

    /// Admin API key for state-changing commands.
    #[arg(short, long, env = "EKATY_ADMIN_KEY")]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum HostState {
    Online,
    Offline,
}

#[derive(Subcommand)]
enum Commands {
    /// Show monitor status
    Status,
    /// Show online state and failure count
    Connection,
    /// Test backend reachability
    Backend,
    /// Run one connection probe now
    Check,
    /// Show the recovery panel, if any
    Recovery,
    /// Retry the recovery action
    Retry,
    /// Toggle troubleshooting steps
    Troubleshooting,
    /// Escalate to a full reload
    Reload,
    /// Report host connectivity
    Host {
        #[arg(value_enum)]
        state: HostState,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", key))?);
    }

    let (post, path) = match cli.command {
        Commands::Status => (false, "/status"),
        Commands::Connection => (false, "/connection"),
        Commands::Backend => (false, "/backend"),
        Commands::Recovery => (false, "/recovery"),
        Commands::Check => (true, "/check"),
        Commands::Retry => (true, "/recovery/retry"),
        Commands::Troubleshooting => (true, "/recovery/troubleshooting"),
        Commands::Reload => (true, "/recovery/reload"),
        Commands::Host { state: HostState::Online } => (true, "/host/online"),
        Commands::Host { state: HostState::Offline } => (true, "/host/offline"),
    };

    let url = format!("{}{}", cli.url.trim_end_matches('/'), path);
    let request = if post { client.post(url) } else { client.get(url) };
    let res = request.headers(headers).send().await?;

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: status API returned {}", status);
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprintln!("Response: {}", text);
            }
        }
        return Ok(());
    }

    let text = res.text().await?;
    if text.is_empty() {
        println!("{}", status);
        return Ok(());
    }
    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
