use std::env;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subdex_core::config::{expand_path, Config};
use subdex_core::table::read_table;
use subdex_embed::default_embedder;
use subdex_index::Artifact;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let args: Vec<String> = env::args().skip(1).collect();

    let csv_path = args.get(0).map(expand_path).unwrap_or_else(|| {
        let p: String = config.get("data.table_csv").unwrap_or_else(|_| "subjects.csv".to_string());
        expand_path(p)
    });
    let prefix = args.get(1).map(expand_path).unwrap_or_else(|| {
        let p: String = config
            .get("data.artifact_prefix")
            .unwrap_or_else(|_| "model/subjects".to_string());
        expand_path(p)
    });

    println!("subdex-indexer\n==============");
    println!("Table: {}", csv_path.display());
    println!("Artifact prefix: {}", prefix.display());

    let rows = read_table(&csv_path)?;
    println!("Loaded {} rows", rows.len());

    // Nothing downstream can run without embeddings, so a backend failure
    // here ends the process.
    let embedder = default_embedder().map_err(|e| {
        eprintln!("Fatal: embedding backend unavailable: {}", e);
        e
    })?;

    let artifact = Artifact::build(&rows, embedder.as_ref())?;
    artifact.save(&prefix)?;

    println!("\n✅ Indexed {} subjects ({} dims)", artifact.index.len(), artifact.index.dim());
    println!("💡 To search, use: cargo run --bin subdex-search -- {}", prefix.display());
    Ok(())
}
