use anyhow::{anyhow, Context as AnyhowContext, Result};
use atlas_graph::{load_path, Channel, ChannelGraph, ChannelPath, LoadStats};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "atlas")]
#[command(about = "Explore cross-channel reference graphs", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show channel and reference counts for a dump
    Stats(StatsArgs),

    /// List all channels sorted by name
    Channels(ChannelsArgs),

    /// Search channel names (case-insensitive substring match)
    Search(SearchArgs),

    /// Find the shortest reference chain between two channels
    Path(PathArgs),

    /// Emit the nodes/links document a renderer consumes
    Export(ExportArgs),
}

#[derive(Args)]
struct StatsArgs {
    /// Path to the newline-delimited reference dump
    file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ChannelsArgs {
    /// Path to the newline-delimited reference dump
    file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Path to the newline-delimited reference dump
    file: PathBuf,

    /// Term to look for in channel names
    term: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PathArgs {
    /// Path to the newline-delimited reference dump
    file: PathBuf,

    /// Display name of the start channel
    from: String,

    /// Display name of the end channel
    to: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the newline-delimited reference dump
    file: PathBuf,

    /// Pretty-print the JSON document
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Stats(args) => run_stats(&args),
        Commands::Channels(args) => run_channels(&args),
        Commands::Search(args) => run_search(&args),
        Commands::Path(args) => run_path(&args),
        Commands::Export(args) => run_export(&args),
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let default_filter = if quiet {
        "warn"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Stderr)
        .init();
}

fn load_graph(file: &Path) -> Result<(ChannelGraph, LoadStats)> {
    let (graph, stats) =
        load_path(file).with_context(|| format!("Failed to load reference dump {}", file.display()))?;

    if stats.malformed > 0 {
        log::warn!("{} line(s) could not be parsed as reference records", stats.malformed);
    }

    Ok((graph, stats))
}

fn resolve<'a>(graph: &'a ChannelGraph, name: &str) -> Result<&'a str> {
    graph
        .resolve_name(name)
        .ok_or_else(|| anyhow!("Invalid channel name: '{}'", name))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsOutput {
    channels: usize,
    references: usize,
    skipped_private: usize,
    skipped_malformed: usize,
}

fn run_stats(args: &StatsArgs) -> Result<()> {
    let (graph, stats) = load_graph(&args.file)?;

    let out = StatsOutput {
        channels: graph.node_count(),
        references: graph.edge_count(),
        skipped_private: stats.private_skipped,
        skipped_malformed: stats.malformed,
    };

    if args.json {
        println!("{}", serde_json::to_string(&out)?);
    } else {
        println!("Channels: {}", out.channels);
        println!("References: {}", out.references);
        println!(
            "Skipped: {} private, {} malformed",
            out.skipped_private, out.skipped_malformed
        );
    }

    Ok(())
}

fn sorted_channels(graph: &ChannelGraph) -> Vec<&Channel> {
    let mut channels: Vec<&Channel> = graph.channels().collect();
    channels.sort_by(|a, b| a.name.cmp(&b.name));
    channels
}

fn print_channels(channels: &[&Channel], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(channels)?);
        return Ok(());
    }

    for channel in channels {
        println!("#{} ({} connections)", channel.name, channel.connections);
    }

    Ok(())
}

fn run_channels(args: &ChannelsArgs) -> Result<()> {
    let (graph, _stats) = load_graph(&args.file)?;
    print_channels(&sorted_channels(&graph), args.json)
}

fn run_search(args: &SearchArgs) -> Result<()> {
    let (graph, _stats) = load_graph(&args.file)?;
    let term = args.term.to_lowercase();

    let matches: Vec<&Channel> = sorted_channels(&graph)
        .into_iter()
        .filter(|channel| channel.name.to_lowercase().contains(&term))
        .collect();

    if matches.is_empty() && !args.json {
        println!("No channels match '{}'", args.term);
        return Ok(());
    }

    print_channels(&matches, args.json)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathStep {
    id: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message_date: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PathOutput {
    found: bool,
    hops: usize,
    steps: Vec<PathStep>,
}

fn path_output(graph: &ChannelGraph, path: &ChannelPath) -> PathOutput {
    let steps = path
        .channels
        .iter()
        .enumerate()
        .map(|(i, id)| {
            let name = graph
                .channel(id)
                .map(|c| c.name.clone())
                .unwrap_or_else(|| id.clone());
            let link = path.links.get(i).and_then(|l| l.as_ref());

            PathStep {
                id: id.clone(),
                name,
                message_link: link.map(|l| l.message_link.clone()),
                message_date: link.map(|l| l.message_date.clone()),
            }
        })
        .collect();

    PathOutput {
        found: true,
        hops: path.hops(),
        steps,
    }
}

fn run_path(args: &PathArgs) -> Result<()> {
    let (graph, _stats) = load_graph(&args.file)?;

    let from_id = resolve(&graph, &args.from)?;
    let to_id = resolve(&graph, &args.to)?;

    let Some(path) = graph.find_path(from_id, to_id)? else {
        if args.json {
            let out = PathOutput {
                found: false,
                hops: 0,
                steps: Vec::new(),
            };
            println!("{}", serde_json::to_string(&out)?);
        } else {
            println!("No path found between '{}' and '{}'", args.from, args.to);
        }
        return Ok(());
    };

    let out = path_output(&graph, &path);

    if args.json {
        println!("{}", serde_json::to_string(&out)?);
        return Ok(());
    }

    println!("Path found with {} hop(s)", out.hops);
    println!();
    for (i, step) in out.steps.iter().enumerate() {
        println!("#{}", step.name);
        if i + 1 < out.steps.len() {
            match &step.message_link {
                Some(link) => {
                    let date = step.message_date.as_deref().unwrap_or("unknown date");
                    println!("  ↓ {} ({})", link, date);
                }
                None => println!("  ↓ (no message recorded)"),
            }
        }
    }

    Ok(())
}

#[derive(Serialize)]
struct ExportNode<'a> {
    id: &'a str,
    name: &'a str,
    connections: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportLink<'a> {
    source: &'a str,
    target: &'a str,
    message_link: &'a str,
    message_date: &'a str,
}

#[derive(Serialize)]
struct ExportDoc<'a> {
    nodes: Vec<ExportNode<'a>>,
    links: Vec<ExportLink<'a>>,
}

fn run_export(args: &ExportArgs) -> Result<()> {
    let (graph, _stats) = load_graph(&args.file)?;

    let nodes = graph
        .channels()
        .map(|channel| ExportNode {
            id: &channel.id,
            name: &channel.name,
            connections: channel.connections,
        })
        .collect();

    let links = graph
        .references()
        .map(|(from, to, link)| ExportLink {
            source: &from.id,
            target: &to.id,
            message_link: &link.message_link,
            message_date: &link.message_date,
        })
        .collect();

    let doc = ExportDoc { nodes, links };

    if args.pretty {
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        println!("{}", serde_json::to_string(&doc)?);
    }

    Ok(())
}
