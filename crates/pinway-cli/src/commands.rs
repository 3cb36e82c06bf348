use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use pinway_gateway::Gateway;
use pinway_server::{PinwayConfig, PinwayServer};
use pinway_store::KuboClient;
use pinway_types::StoredObject;
use serde_json::json;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    let store = KuboClient::new(&config.node).context("invalid storage node address")?;
    tracing::debug!(node = store.base_url(), "using storage node");
    let gateway = Gateway::new(Arc::new(store));
    let json = matches!(cli.format, OutputFormat::Json);

    match cli.command {
        Command::Serve(_) => cmd_serve(config, gateway).await,
        Command::Health => cmd_health(&gateway, json).await,
        Command::Add(args) => cmd_add(&gateway, args, json).await,
        Command::Cat(args) => cmd_cat(&gateway, args).await,
        Command::Info(args) => cmd_info(&gateway, args, json).await,
        Command::Pin(args) => cmd_pin(&gateway, args, json, true).await,
        Command::Unpin(args) => cmd_pin(&gateway, args, json, false).await,
        Command::Pins => cmd_pins(&gateway, json).await,
    }
}

/// Configuration file (if any) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> anyhow::Result<PinwayConfig> {
    let mut config = match &cli.config {
        Some(path) => PinwayConfig::load(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => PinwayConfig::default(),
    };
    if let Some(host) = &cli.node.node_host {
        config.node.host = host.clone();
    }
    if let Some(port) = cli.node.node_port {
        config.node.port = port;
    }
    if let Some(addr) = &cli.node.node_multiaddr {
        config.node.multiaddr = Some(addr.clone());
    }
    if let Command::Serve(args) = &cli.command {
        if let Some(bind) = args.bind {
            config.server.bind_addr = bind;
        }
        if let Some(base) = &args.base_path {
            config.server.base_path = base.clone();
        }
    }
    Ok(config)
}

async fn cmd_serve(config: PinwayConfig, gateway: Gateway) -> anyhow::Result<()> {
    let health = gateway.health().await;
    if health.is_connected() {
        tracing::info!("storage node {}", health);
    } else {
        tracing::warn!("storage node is not reachable yet; serving anyway");
    }
    PinwayServer::new(config.server, gateway).serve().await?;
    Ok(())
}

async fn cmd_health(gateway: &Gateway, json: bool) -> anyhow::Result<()> {
    let health = gateway.health().await;
    if json {
        println!("{}", json!({ "connected": health.is_connected(), "status": health.to_string() }));
    } else if health.is_connected() {
        println!("{} {}", "✓".green().bold(), health);
    } else {
        println!("{} {}", "✗".red().bold(), health);
    }
    Ok(())
}

async fn cmd_add(gateway: &Gateway, args: AddArgs, json: bool) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("reading {}", args.path.display()))?;
    let name = args.name.or_else(|| {
        args.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
    });
    let object = StoredObject { name, bytes: bytes.into() };
    let hash = gateway.store_file(object).await?;
    if json {
        println!("{}", json!({ "hash": hash }));
    } else {
        println!("{} added {}", "✓".green().bold(), hash.yellow());
    }
    Ok(())
}

async fn cmd_cat(gateway: &Gateway, args: CatArgs) -> anyhow::Result<()> {
    let bytes = gateway.fetch_file(&args.hash).await?;
    match &args.output {
        Some(path) => std::fs::write(path, &bytes)
            .with_context(|| format!("writing {}", path.display()))?,
        None => std::io::stdout().lock().write_all(&bytes)?,
    }
    Ok(())
}

async fn cmd_info(gateway: &Gateway, args: HashArgs, json: bool) -> anyhow::Result<()> {
    let links = gateway.inspect_file(&args.hash).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&links)?);
        return Ok(());
    }
    if links.is_empty() {
        println!("{} has no links.", args.hash.yellow());
    }
    for link in &links {
        println!(
            "{}  {:>10}  {}",
            link.identifier.to_string().yellow(),
            link.size,
            link.name.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

async fn cmd_pin(gateway: &Gateway, args: HashArgs, json: bool, pin: bool) -> anyhow::Result<()> {
    let hashes = if pin {
        gateway.pin_file(&args.hash).await?
    } else {
        gateway.unpin_file(&args.hash).await?
    };
    if json {
        println!("{}", serde_json::to_string(&hashes)?);
        return Ok(());
    }
    let verb = if pin { "pinned" } else { "unpinned" };
    if hashes.is_empty() {
        println!("Nothing {verb}.");
    }
    for hash in &hashes {
        println!("  {} {}", format!("{verb}:").green(), hash);
    }
    Ok(())
}

async fn cmd_pins(gateway: &Gateway, json: bool) -> anyhow::Result<()> {
    let pins = gateway.list_all().await?;
    if json {
        println!("{}", serde_json::to_string(&pins)?);
    } else if pins.is_empty() {
        println!("No pins.");
    } else {
        for hash in &pins {
            println!("{hash}");
        }
    }
    Ok(())
}
