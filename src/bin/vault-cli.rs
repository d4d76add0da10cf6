use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "vault-cli")]
#[command(about = "Operator CLI for the Idea Vault service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Admin password, used as a bearer token for migrate.
    #[arg(short, long, default_value = "dev-secret")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// Provision storage (production only)
    Migrate,
    /// List stored ideas
    List {
        /// Page size (clamped server-side)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Substring to search for
        #[arg(short, long)]
        query: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Health => {
            let res = client
                .get(format!("{}/api/health", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Migrate => {
            let mut headers = HeaderMap::new();
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
            );
            let res = client
                .post(format!("{}/api/migrate", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::List { limit, query } => {
            let mut request = client.get(format!("{}/api/ideas", cli.url));
            if let Some(limit) = limit {
                request = request.query(&[("limit", limit.to_string())]);
            }
            if let Some(query) = query {
                request = request.query(&[("q", query)]);
            }
            let res = request.send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
