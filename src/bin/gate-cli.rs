use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use rwd_gate::config::{load_config, ObservabilityConfig};
use rwd_gate::gate::{FetchOutcome, GateClient, InboundRequest, RecordingSink};
use rwd_gate::observability::logging;

#[derive(Parser)]
#[command(name = "gate-cli")]
#[command(about = "Run one gate fetch against the Vcms upstream", long_about = None)]
struct Cli {
    /// Gate service config to take affiliate, prefix and upstream from.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Affiliate ID (overrides the config file).
    #[arg(short, long)]
    affiliate: Option<String>,

    /// Gate prefix (overrides the config file).
    #[arg(short, long)]
    prefix: Option<String>,

    /// Upstream host (overrides the config file).
    #[arg(short, long)]
    upstream: Option<String>,

    /// Host header of the simulated inbound request.
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Scheme of the simulated inbound request.
    #[arg(long)]
    scheme: Option<String>,

    /// Cookie to forward, as name=value. Repeatable.
    #[arg(long = "cookie")]
    cookies: Vec<String>,

    /// Form field to POST, as name=value. Repeatable; turns the request into a POST.
    #[arg(long = "field")]
    fields: Vec<String>,

    /// Widget ID for non-gate paths. Repeatable.
    #[arg(short, long = "widget")]
    widgets: Vec<String>,

    /// Log verbosity.
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print status, relayed cookies and section names as JSON
    Sections { uri: String },
    /// Print the body of one section
    Section { uri: String, name: String },
    /// Write the raw upstream body to stdout
    Raw { uri: String },
}

fn split_pair(pair: &str) -> Result<(String, String), Box<dyn std::error::Error>> {
    let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", pair))?;
    Ok((name.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_logging(&ObservabilityConfig {
        log_level: cli.log_level.clone(),
        ..ObservabilityConfig::default()
    });

    let settings = match &cli.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };

    let affiliate = cli
        .affiliate
        .clone()
        .or_else(|| settings.as_ref().map(|s| s.gate.affiliate_id.clone()))
        .unwrap_or_default();
    let prefix = cli
        .prefix
        .clone()
        .or_else(|| settings.as_ref().map(|s| s.gate.gate_prefix.clone()))
        .unwrap_or_else(|| rwd_gate::gate::DEFAULT_GATE_PREFIX.to_string());

    let mut client = GateClient::new(affiliate, prefix)?;
    if let Some(settings) = &settings {
        client = client.with_transport_settings(settings.transport_settings());
        client.set_url(settings.gate.upstream_host.as_str());
    }
    if let Some(upstream) = &cli.upstream {
        client.set_url(upstream.as_str());
    }

    let uri = match &cli.command {
        Commands::Sections { uri } | Commands::Section { uri, .. } | Commands::Raw { uri } => uri.clone(),
    };
    let mut request = if cli.fields.is_empty() {
        InboundRequest::get(uri, cli.host.clone())
    } else {
        InboundRequest::post(uri, cli.host.clone())
    };
    request.scheme = cli.scheme.clone();
    for pair in &cli.cookies {
        request.cookies.push(split_pair(pair)?);
    }
    for pair in &cli.fields {
        request.form.push(split_pair(pair)?);
    }

    let mut sink = RecordingSink::new();
    let outcome = client.fetch(&request, &cli.widgets, &mut sink).await?;

    if let FetchOutcome::Redirected { location } = outcome {
        println!("{}", serde_json::to_string_pretty(&json!({ "redirect": location }))?);
        return Ok(());
    }

    match cli.command {
        Commands::Sections { .. } => {
            let cookies: Vec<Value> = sink.cookies.iter().map(|c| Value::String(c.to_string())).collect();
            let report = json!({
                "status": client.upstream_result().map(|r| r.status),
                "mirrored_status": sink.status.as_ref().map(|(_, line)| line.clone()),
                "raw": client.is_raw_result(),
                "index": client.is_index(),
                "sections": client.get_sections_list(),
                "cookies": cookies,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Section { name, .. } => match client.get_section(&name) {
            Some(body) => println!("{}", body),
            None => {
                eprintln!("Error: section '{}' not found", name);
                std::process::exit(1);
            }
        },
        Commands::Raw { .. } => {
            client.print_raw_result(&mut sink, None);
            for (name, value) in &sink.headers {
                eprintln!("{}: {}", name, value);
            }
            std::io::stdout().write_all(&sink.body)?;
        }
    }

    Ok(())
}
