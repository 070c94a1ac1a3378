use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use docsearch_core::config::Config;
use docsearch_core::error::Error;
use docsearch_core::store::FsArtifactStore;
use docsearch_embed::{get_default_embedder, get_default_reranker};
use docsearch_hybrid::SearchService;

const USAGE: &str = "Usage: docsearch <index <file.txt> | query \"<text>\" [--top-k N] [--json] | status>";

struct QueryArgs {
    text: String,
    top_k: Option<usize>,
    json: bool,
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn parse_query_args(args: &[String]) -> anyhow::Result<QueryArgs> {
    let mut text = None;
    let mut top_k = None;
    let mut json = false;
    let mut it = args.iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--top-k" | "-k" => {
                let value = it.next().ok_or_else(|| anyhow::anyhow!("--top-k needs a value"))?;
                top_k = Some(value.parse::<usize>().map_err(|e| anyhow::anyhow!("invalid --top-k '{value}': {e}"))?);
            }
            "--json" => json = true,
            _ if text.is_none() => text = Some(arg.clone()),
            other => anyhow::bail!("unexpected argument '{other}'"),
        }
    }
    let text = text.ok_or_else(|| anyhow::anyhow!("{USAGE}"))?;
    Ok(QueryArgs { text, top_k, json })
}

fn open_service(config: &Config) -> anyhow::Result<SearchService> {
    let settings = config.settings()?;
    let storage_dir = settings.storage.path_in(&env::current_dir()?);
    let store = FsArtifactStore::new(&storage_dir)?;
    let embedder = get_default_embedder(&settings)?;
    let reranker = get_default_reranker(&settings)?;
    tracing::info!(storage = %storage_dir.display(), env = config.env_name(), "opening search service");
    Ok(SearchService::open(settings, embedder, reranker, Box::new(store))?.with_progress(true))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "index" => {
            let Some(path) = args.first().map(PathBuf::from) else {
                eprintln!("Usage: docsearch index <file.txt>");
                std::process::exit(1);
            };
            let service = open_service(&config)?;
            println!("📄 Indexing {}", path.display());
            let report = service.build_from_file(&path)?;
            println!("✅ Indexed {} chunks (generation {})", report.chunk_count, report.generation);
        }
        "query" => {
            let query = parse_query_args(&args)?;
            let service = open_service(&config)?;
            let response = match service.search(&query.text, query.top_k) {
                Err(Error::NotIndexed) => {
                    eprintln!("❌ No document indexed yet. Run `docsearch index <file.txt>` first.");
                    std::process::exit(2);
                }
                other => other?,
            };
            if query.json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                println!("🔎 {} results in {:.3}s", response.results.len(), response.latency_seconds);
                for (rank, hit) in response.results.iter().enumerate() {
                    println!("\n{}. [page {}] score {:.4}", rank + 1, hit.page, hit.score);
                    println!("   {}", hit.text);
                }
            }
        }
        "status" => {
            let service = open_service(&config)?;
            match service.status() {
                Some(summary) => println!(
                    "📊 {} chunks, dim {}, generation {} ({})",
                    summary.chunk_count, summary.dim, summary.generation, summary.embedder_id
                ),
                None => println!("📭 No corpus indexed"),
            }
        }
        _ => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
    }
    Ok(())
}
