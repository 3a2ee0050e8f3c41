//! liveref command line

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use liveref_core::{inspect, DocumentRenderer, InMemoryCatalog, LiverefConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    let document = Arg::new("document")
        .long("document")
        .short('d')
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Persisted document markup");
    let json = Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON");

    Command::new("liveref")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Render and inspect documents with live catalog references")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("render")
                .about("Render a document against a catalog")
                .arg(document.clone())
                .arg(
                    Arg::new("catalog")
                        .long("catalog")
                        .short('c')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of catalog payloads"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration"),
                )
                .arg(json.clone()),
        )
        .subcommand(
            Command::new("inspect")
                .about("List the reference nodes of a document")
                .arg(document)
                .arg(json),
        )
}

fn read(args: &ArgMatches, name: &str) -> Result<String> {
    let path = args
        .get_one::<PathBuf>(name)
        .with_context(|| format!("--{name} is required"))?;
    std::fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

async fn render(args: &ArgMatches) -> Result<()> {
    let config = match args.get_one::<PathBuf>("config") {
        Some(path) => LiverefConfig::from_file(path)?,
        None => LiverefConfig::default(),
    };
    let catalog = InMemoryCatalog::from_json_str(&read(args, "catalog")?).context("cannot load catalog")?;
    let markup = read(args, "document")?;

    let renderer = DocumentRenderer::new(catalog, &config);
    let output = renderer.render(&markup).await;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.html);
        for (id, reason) in &output.report.failures {
            eprintln!("unresolved {id}: {reason}");
        }
    }
    Ok(())
}

fn inspect_document(args: &ArgMatches) -> Result<()> {
    let nodes = inspect(&read(args, "document")?);
    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&nodes)?);
        return Ok(());
    }
    for node in &nodes {
        println!("#{} {} {}", node.index, node.kind, node.entity_id);
        for (key, value) in &node.attributes {
            println!("    {key} = {value}");
        }
    }
    println!("{} reference(s)", nodes.len());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    match matches.subcommand() {
        Some(("render", args)) => render(args).await,
        Some(("inspect", args)) => inspect_document(args),
        _ => unreachable!("subcommand is required"),
    }
}
