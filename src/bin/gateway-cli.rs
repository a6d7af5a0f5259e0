use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the edge gateway admin API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[arg(short, long)]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status and route table
    Status,
    /// Inspect response cache entries
    Cache,
    /// Drop every cached response
    Clear,
    /// Drop a single cached response by key
    Delete { key: String },
    /// Drop every cached response whose key contains the pattern
    Invalidate { pattern: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    let base = Url::parse(&cli.url)?;
    let (method, url) = match cli.command {
        Commands::Status => (Method::GET, admin_url(&base, &["status"])?),
        Commands::Cache => (Method::GET, admin_url(&base, &["cache"])?),
        Commands::Clear => (Method::POST, admin_url(&base, &["cache", "clear"])?),
        Commands::Delete { key } => (Method::DELETE, admin_url(&base, &["cache", "keys", &key])?),
        Commands::Invalidate { pattern } => (
            Method::POST,
            admin_url(&base, &["cache", "invalidate", &pattern])?,
        ),
    };

    let res = client.request(method, url).headers(headers).send().await?;
    print_response(res).await
}

/// Build `/admin/<segments..>` under `base`, percent-encoding each segment.
fn admin_url(base: &Url, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| "gateway URL cannot be a base")?
        .pop_if_empty()
        .push("admin")
        .extend(segments);
    Ok(url)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
