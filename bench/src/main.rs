use clap::{Parser, ValueEnum};
use linkgraph_core::{
    connected_components_size, network_statistics, DirectedLink, DynamicCursor, Graph, HashedSet,
    IdNode, MapGraph, NetworkStatistics, RandomGenerator, UndirectedLink,
};
use std::time::{Duration, Instant};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_NODE_COUNT: usize = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Run every generator
    All,
    /// Directed G(n,p)
    Gnp,
    /// Undirected G(n,p)
    GnpUndirected,
    /// Barabasi-Albert preferential attachment
    Ba,
}

impl Mode {
    fn runs(self) -> &'static [Mode] {
        match self {
            Mode::All => &[Mode::Gnp, Mode::GnpUndirected, Mode::Ba],
            Mode::Gnp => &[Mode::Gnp],
            Mode::GnpUndirected => &[Mode::GnpUndirected],
            Mode::Ba => &[Mode::Ba],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// linkgraph-bench - time graph generation, component sizing and statistics
#[derive(Parser, Debug)]
#[command(name = "linkgraph-bench")]
#[command(version, about, long_about = None)]
struct Args {
    /// Generator to benchmark
    #[arg(value_enum, default_value_t = Mode::All)]
    mode: Mode,

    /// Nodes per generated graph
    #[arg(default_value_t = DEFAULT_NODE_COUNT, value_parser = parse_node_count)]
    node_count: usize,

    /// RNG seed
    #[arg(long, default_value_t = 42, env = "LINKGRAPH_SEED")]
    seed: u64,

    /// G(n,p) link probability (default ~10 links per node)
    #[arg(long, env = "LINKGRAPH_PROBABILITY")]
    probability: Option<f64>,

    /// Barabasi-Albert core size
    #[arg(long, default_value_t = 5, env = "LINKGRAPH_INITIAL")]
    initial: usize,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table, env = "LINKGRAPH_FORMAT")]
    format: OutputFormat,
}

impl Args {
    /// Targets ~10 links per node.
    fn probability_for(&self, node_count: usize) -> f64 {
        self.probability.unwrap_or_else(|| {
            if node_count < 2 {
                0.0
            } else {
                (10.0 / (node_count - 1) as f64).min(1.0)
            }
        })
    }
}

fn parse_node_count(value: &str) -> Result<usize, String> {
    let count: usize = value.parse().map_err(|e| format!("{}", e))?;
    if count == 0 {
        return Err("node_count must be at least 1".into());
    }
    Ok(count)
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let node_count = args.node_count;

    if args.format == OutputFormat::Table {
        println!("linkgraph-bench");
        println!("===============");
        println!();
    }

    let mut reports = Vec::new();
    for &mode in args.mode.runs() {
        let report = match mode {
            Mode::Gnp => run_directed_gnp(&args, node_count),
            Mode::GnpUndirected => run_undirected_gnp(&args, node_count),
            Mode::Ba | Mode::All => run_barabasi_albert(&args, node_count),
        };
        match report {
            Ok(report) => {
                if args.format == OutputFormat::Table {
                    print_table(&report);
                }
                reports.push(report);
            }
            Err(err) => {
                tracing::error!(mode = ?mode, error = %err, "benchmark failed");
                std::process::exit(1);
            }
        }
    }

    if args.format == OutputFormat::Json {
        let json: Vec<serde_json::Value> = reports.iter().map(BenchReport::to_json).collect();
        match serde_json::to_string_pretty(&json) {
            Ok(text) => println!("{}", text),
            Err(err) => {
                eprintln!("Failed to encode report: {}", err);
                std::process::exit(1);
            }
        }
    }
}

/// Timings and figures for one generated graph.
struct BenchReport {
    name: &'static str,
    generation: Duration,
    components: Vec<usize>,
    components_time: Duration,
    statistics: NetworkStatistics,
    statistics_time: Duration,
    element_errors: usize,
}

impl BenchReport {
    fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "generation_ms": self.generation.as_secs_f64() * 1000.0,
            "components": self.components.len(),
            "largest_component": self.components.first().copied().unwrap_or(0),
            "components_ms": self.components_time.as_secs_f64() * 1000.0,
            "statistics": self.statistics,
            "statistics_ms": self.statistics_time.as_secs_f64() * 1000.0,
            "element_errors": self.element_errors,
        })
    }
}

fn print_table(report: &BenchReport) {
    let stats = &report.statistics;
    println!("--- {} ---", report.name);
    println!(
        "Generated in {:.2}s: {} nodes, {} directed links, {} undirected links",
        report.generation.as_secs_f64(),
        stats.nodes_size,
        stats.directed_links_size,
        stats.undirected_links_size
    );
    println!();
    println!("{:>24} {:>14}", "metric", "value");
    println!("{:->24} {:->14}", "", "");
    println!("{:>24} {:>14.4}", "avg directed degree", stats.average_directed_degree());
    println!("{:>24} {:>14.4}", "avg undirected degree", stats.average_undirected_degree());
    println!("{:>24} {:>14.6}", "directed density", stats.directed_density());
    println!("{:>24} {:>14.6}", "undirected density", stats.undirected_density());
    println!("{:>24} {:>14}", "components", report.components.len());
    println!(
        "{:>24} {:>14}",
        "largest component",
        report.components.first().copied().unwrap_or(0)
    );
    println!("{:>24} {:>12.1}ms", "components time", report.components_time.as_secs_f64() * 1000.0);
    println!("{:>24} {:>12.1}ms", "statistics time", report.statistics_time.as_secs_f64() * 1000.0);
    if report.element_errors > 0 {
        println!("{:>24} {:>14}", "element errors", report.element_errors);
    }
    println!();
}

fn node_factory() -> impl FnMut() -> IdNode {
    let mut next = 0u64;
    move || {
        next += 1;
        IdNode::new(format!("c_{}", next))
    }
}

fn run_directed_gnp(args: &Args, node_count: usize) -> Result<BenchReport, String> {
    let p = args.probability_for(node_count);
    tracing::info!(node_count, p, "directed G(n,p)");
    let t = Instant::now();
    let graph: MapGraph<IdNode, DirectedLink<IdNode>> = RandomGenerator::seeded(args.seed)
        .directed_gnp(node_count, p, node_factory(), |a, b| {
            DirectedLink::new(a.clone(), b.clone())
        })
        .map_err(|e| e.to_string())?;
    measure("Directed G(n,p)", &graph, t.elapsed(), |h| h.incoming_degree() + h.outgoing_degree())
}

fn run_undirected_gnp(args: &Args, node_count: usize) -> Result<BenchReport, String> {
    let p = args.probability_for(node_count);
    tracing::info!(node_count, p, "undirected G(n,p)");
    let t = Instant::now();
    let graph: MapGraph<IdNode, UndirectedLink<IdNode>> = RandomGenerator::seeded(args.seed)
        .undirected_gnp(node_count, p, node_factory(), |a, b| {
            UndirectedLink::new(a.clone(), b.clone())
        })
        .map_err(|e| e.to_string())?;
    measure("Undirected G(n,p)", &graph, t.elapsed(), |h| h.undirected_degree())
}

fn run_barabasi_albert(args: &Args, node_count: usize) -> Result<BenchReport, String> {
    let initial = args.initial.min(node_count);
    tracing::info!(node_count, initial, "Barabasi-Albert");
    let t = Instant::now();
    let graph: MapGraph<IdNode, UndirectedLink<IdNode>> = RandomGenerator::seeded(args.seed)
        .undirected_barabasi_albert(initial, node_count, node_factory(), |a, b| {
            UndirectedLink::new(a.clone(), b.clone())
        })
        .map_err(|e| e.to_string())?;
    measure("Barabasi-Albert", &graph, t.elapsed(), |h| h.undirected_degree())
}

/// Time component sizing and statistics over an already generated graph.
fn measure<'a, L, F>(
    name: &'static str,
    graph: &'a MapGraph<IdNode, L>,
    generation: Duration,
    degree: F,
) -> Result<BenchReport, String>
where
    L: linkgraph_core::Link<IdNode>,
    F: Fn(&linkgraph_core::Neighborhood<'a, IdNode, L>) -> usize,
{
    let t = Instant::now();
    let components =
        connected_components_size(graph, |_| Ok(HashedSet::new()), || Ok(DynamicCursor::new()))
            .map_err(|e| e.to_string())?;
    let components_time = t.elapsed();

    let t = Instant::now();
    let statistics = network_statistics(graph, degree).map_err(|e| e.to_string())?;
    let statistics_time = t.elapsed();

    let mut sizes: Vec<usize> = components.value.iter().map(|c| c.size).collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));

    tracing::debug!(links = graph.link_count(), "measured {}", name);
    Ok(BenchReport {
        name,
        generation,
        components: sizes,
        components_time,
        statistics: statistics.value,
        statistics_time,
        element_errors: components.errors.len() + statistics.errors.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["linkgraph-bench"]).unwrap();
        assert_eq!(args.mode, Mode::All);
        assert_eq!(args.node_count, DEFAULT_NODE_COUNT);
        assert_eq!(args.mode.runs(), &[Mode::Gnp, Mode::GnpUndirected, Mode::Ba]);
    }

    #[test]
    fn test_mode_size_and_format() {
        let args =
            Args::try_parse_from(["linkgraph-bench", "gnp-undirected", "300", "--format", "json"])
                .unwrap();
        assert_eq!(args.mode, Mode::GnpUndirected);
        assert_eq!(args.node_count, 300);
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn test_malformed_node_count_is_rejected() {
        assert!(Args::try_parse_from(["linkgraph-bench", "gnp", "notanumber"]).is_err());
        assert!(Args::try_parse_from(["linkgraph-bench", "ba", "0"]).is_err());
        assert!(Args::try_parse_from(["linkgraph-bench", "ba", "1"]).is_ok());
    }

    #[test]
    fn test_unknown_mode_and_format_are_rejected() {
        assert!(Args::try_parse_from(["linkgraph-bench", "tree"]).is_err());
        assert!(Args::try_parse_from(["linkgraph-bench", "--format", "xml"]).is_err());
        assert!(Args::try_parse_from(["linkgraph-bench", "--seed", "-x"]).is_err());
    }

    #[test]
    fn test_probability_targets_ten_links_per_node() {
        let args = Args::try_parse_from(["linkgraph-bench", "gnp", "11"]).unwrap();
        assert!((args.probability_for(11) - 1.0).abs() < 1e-9);
        assert_eq!(args.probability_for(1), 0.0);

        let fixed = Args::try_parse_from(["linkgraph-bench", "--probability", "0.25"]).unwrap();
        assert_eq!(fixed.probability_for(11), 0.25);
    }
}
