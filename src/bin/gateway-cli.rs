use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::multipart::{Form, Part};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Command line client for the API gateway", long_about = None)]
struct Cli {
    #[arg(short, long, env = "GATEWAY_URL", default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by the collection-creating commands.
#[derive(clap::Args)]
struct CollectionOptions {
    #[arg(long)]
    script_type: Option<String>,
    #[arg(long)]
    target_audience: Option<String>,
    #[arg(long)]
    duration: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    visual_style: Option<String>,
    #[arg(long)]
    voice: Option<String>,
}

impl CollectionOptions {
    fn fields(&self) -> Vec<(&'static str, &str)> {
        [
            ("script_type", &self.script_type),
            ("target_audience", &self.target_audience),
            ("duration", &self.duration),
            ("language", &self.language),
            ("visual_style", &self.visual_style),
            ("voice", &self.voice),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|v| (name, v)))
        .collect()
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the gateway is up
    Health,
    /// List collections
    Collections,
    /// Show one collection
    Collection { id: String },
    /// Create a collection from a Wikipedia article
    Wikipedia {
        url: String,
        #[command(flatten)]
        options: CollectionOptions,
    },
    /// Upload a file as a new collection
    Upload {
        file: PathBuf,
        #[command(flatten)]
        options: CollectionOptions,
    },
    /// Show one generated script
    Script { id: String },
    /// Show the generation status of a script
    ScriptStatus { id: String },
    /// List a configuration catalog (styles, languages, voices, visual-styles, ...)
    Configurations { kind: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Health => client.get(format!("{base}/health")).send().await?,
        Commands::Collections => client.get(format!("{base}/api/collections")).send().await?,
        Commands::Collection { id } => {
            client
                .get(format!("{base}/api/collections/{id}"))
                .send()
                .await?
        }
        Commands::Wikipedia { url, options } => {
            let mut body = Map::new();
            body.insert("url".into(), json!(url));
            for (name, value) in options.fields() {
                body.insert(name.into(), json!(value));
            }
            client
                .post(format!("{base}/api/collections/wikipedia"))
                .json(&body)
                .send()
                .await?
        }
        Commands::Upload { file, options } => {
            let bytes = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());

            let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
            for (name, value) in options.fields() {
                form = form.text(name, value.to_string());
            }
            client
                .post(format!("{base}/api/collections/upload-file"))
                .multipart(form)
                .send()
                .await?
        }
        Commands::Script { id } => client.get(format!("{base}/api/scripts/{id}")).send().await?,
        Commands::ScriptStatus { id } => {
            client
                .get(format!("{base}/api/scripts/{id}/status"))
                .send()
                .await?
        }
        Commands::Configurations { kind } => {
            client
                .get(format!("{base}/api/configurations/{kind}"))
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
