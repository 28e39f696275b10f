use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "routegraph-cli")]
#[command(about = "Inspect the route registry of a running routegraph server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Devtool mount point on the server.
    #[arg(short, long, default_value = "/__devtool")]
    prefix: String,

    /// Bearer token, when the server sets `devtool.api_key`.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Registry counts and server version
    Status,
    /// Full registry snapshot
    Registry,
    /// Node/edge projection of the route tree
    Graph,
    /// Text outline of groups, routes and entries
    Outline,
}

impl Commands {
    fn endpoint(&self) -> &'static str {
        match self {
            Commands::Status => "status",
            Commands::Registry => "registry",
            Commands::Graph => "graph",
            Commands::Outline => "outline",
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {key}"))?);
    }

    let url = format!(
        "{}{}/{}",
        cli.url.trim_end_matches('/'),
        cli.prefix.trim_end_matches('/'),
        cli.command.endpoint()
    );
    let res = client.get(url).headers(headers).send().await?;

    match cli.command {
        Commands::Outline => print_text(res).await,
        _ => print_json(res).await,
    }
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let Some(res) = check_status(res).await else {
        return Ok(());
    };
    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let Some(res) = check_status(res).await else {
        return Ok(());
    };
    print!("{}", res.text().await?);
    Ok(())
}

async fn check_status(res: reqwest::Response) -> Option<reqwest::Response> {
    let status = res.status();
    if status.is_success() {
        return Some(res);
    }
    eprintln!("Error: devtool returned status {status}");
    if let Ok(text) = res.text().await {
        eprintln!("Response: {text}");
    }
    None
}
