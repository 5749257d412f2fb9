use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subdex_core::config::{expand_path, Config};
use subdex_embed::default_embedder;
use subdex_index::SearchEngine;

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

    let mut prefix: Option<PathBuf> = None;
    let mut top_k: usize = config.get("search.top_k").unwrap_or(5);
    if top_k == 0 {
        eprintln!("Error: search.top_k must be a positive integer");
        std::process::exit(1);
    }
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--top-k" | "-k" => {
                match args.get(i + 1).and_then(|v| v.parse::<usize>().ok()) {
                    Some(k) if k > 0 => {
                        top_k = k;
                        i += 1;
                    }
                    _ => {
                        eprintln!("Error: --top-k requires a positive integer");
                        std::process::exit(1);
                    }
                }
            }
            _ if !args[i].starts_with('-') => prefix = Some(expand_path(&args[i])),
            other => {
                eprintln!("Unknown option: {}", other);
                std::process::exit(1);
            }
        }
        i += 1;
    }
    let prefix = prefix.unwrap_or_else(|| {
        let p: String = config
            .get("data.artifact_prefix")
            .unwrap_or_else(|_| "model/subjects".to_string());
        expand_path(p)
    });

    // The engine is read-only, so Ctrl-C mid-session has nothing to flush.
    ctrlc::set_handler(|| {
        println!("\n👋 Goodbye!");
        std::process::exit(0);
    })?;

    println!("🔍 subdex interactive search");
    println!("============================");

    let embedder = default_embedder().map_err(|e| {
        eprintln!("Fatal: embedding backend unavailable: {}", e);
        e
    })?;
    let engine = SearchEngine::load(&prefix, embedder)?;
    println!("✅ Artifact loaded ({} subjects)", engine.len());
    println!("Type a query and press ENTER. 'exit' or 'quit' ends the session.\n");

    loop {
        print!("search> ");
        io::stdout().flush()?;

        let mut input = String::new();
        let read = match io::stdin().read_line(&mut input) {
            Ok(n) => n,
            // A signal landed mid-read; end the session like EOF does.
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                println!();
                break;
            }
            Err(e) => return Err(e.into()),
        };
        if read == 0 {
            // EOF: leave quietly, nothing to clean up.
            println!();
            break;
        }
        let input = input.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("👋 Goodbye!");
            break;
        }

        let outcome = engine.search(input, top_k)?;
        println!(
            "\n--- Results for: \"{}\" ({:.4}s) ---",
            input,
            outcome.elapsed.as_secs_f64()
        );
        if outcome.results.is_empty() {
            println!("No results.");
        }
        for hit in &outcome.results {
            println!("  {}. score={:.4}  {}", hit.rank, hit.score, hit.subject);
            if !hit.links.is_empty() {
                println!("     links: {}", hit.links);
            }
        }
        println!();
    }

    Ok(())
}
