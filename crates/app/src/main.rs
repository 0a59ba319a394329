use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use passage_consolidator_core::{
    consolidate, to_tool_results, ConsolidationOptions, HttpRetrieverStore, MergedPassage,
    RankOrder, RetrievalTool, SnapshotStore, ToolResult, MATCH_AMPLIFICATION_ALPHA,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "passage-consolidator", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Base URL of the retriever service that holds the passage index
    #[arg(long, env = "COLBERT_SEARCH_URL", default_value = "http://localhost:8893")]
    retriever_url: String,

    /// Timeout for a single retriever request, in seconds
    #[arg(long, default_value = "30")]
    request_timeout_secs: u64,

    /// Amplification applied per additional passage in a section
    #[arg(long, default_value_t = MATCH_AMPLIFICATION_ALPHA)]
    alpha: f64,

    /// Direction of the final ranking
    #[arg(long, value_enum, default_value_t = OrderArg::Ascending)]
    order: OrderArg,

    /// Number of passages requested from the retriever (0 keeps all)
    #[arg(long, default_value = "10")]
    top_k: usize,

    /// Print results as JSON instead of text
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Query the retriever service and print consolidated sections.
    Search {
        /// Search query
        #[arg(long)]
        query: String,
    },
    /// Merge and rerank a saved JSON array of retriever results.
    Consolidate {
        /// File holding the raw retriever output.
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Ascending,
    Descending,
}

impl From<OrderArg> for RankOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Ascending => RankOrder::Ascending,
            OrderArg::Descending => RankOrder::Descending,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_version = env!("CARGO_PKG_VERSION");

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    let options = ConsolidationOptions {
        alpha: cli.alpha,
        order: cli.order.into(),
        top_k: cli.top_k,
    };

    info!(
        version = app_version,
        started_at = %Utc::now().to_rfc3339(),
        "passage-consolidator boot"
    );

    match cli.command {
        Command::Search { query } => {
            let retriever = HttpRetrieverStore::new(
                &cli.retriever_url,
                Duration::from_secs(cli.request_timeout_secs),
            )
            .map_err(|error| anyhow::anyhow!(error.to_string()))?;
            let tool = RetrievalTool::new(Arc::new(retriever), options);

            let ranked = tool
                .retrieve(&query)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            println!("query: {query}");
            print_sections(&ranked, cli.json)?;
        }
        Command::Consolidate { input } => {
            let snapshot = SnapshotStore::load(&input)
                .await
                .map_err(|error| anyhow::anyhow!(error.to_string()))?;

            info!(input = %input.display(), passages = snapshot.passages().len(), "consolidating snapshot");
            let ranked = consolidate(snapshot.passages().to_vec(), &options);
            print_sections(&ranked, cli.json)?;
        }
    }

    Ok(())
}

fn print_sections(ranked: &[MergedPassage], as_json: bool) -> anyhow::Result<()> {
    let results: Vec<ToolResult> = to_tool_results(ranked);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for (section, result) in ranked.iter().zip(results.iter()) {
        println!(
            "[{}] score={:.4} matches={} section={}",
            section.rank,
            section.score,
            section.match_count(),
            section.section_order()
        );
        println!("  title={}", result.title);
        if !result.url.is_empty() {
            println!("  url={}", result.url);
        }
        if !result.concerns.is_empty() {
            println!("  concerns={}", result.concerns.join("; "));
        }
        println!("  text:\n{}", result.text);
    }

    Ok(())
}
