use std::env;
use std::fs;
use std::path::PathBuf;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use subdex_core::config::{expand_path, Config};
use subdex_core::endings::EndingSet;
use subdex_core::table::{read_table, write_table};
use subdex_core::transform::{clean_subjects, endings_report, filter_linked, transform_corpus};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {} <transform|clean|filter|report> [args...]", prog);
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {}", e);
        e
    })?;
    let (cmd, args) = parse_args();
    match cmd.as_str() {
        "transform" => {
            let json_path = args.get(0).map(expand_path).unwrap_or_else(|| {
                let p: String = config
                    .get("data.corpus_json")
                    .unwrap_or_else(|_| "data/corpus.json".to_string());
                expand_path(p)
            });
            let csv_path = args.get(1).map(expand_path).unwrap_or_else(|| {
                let p: String =
                    config.get("data.table_csv").unwrap_or_else(|_| "subjects.csv".to_string());
                expand_path(p)
            });
            let endings_path = expand_path(
                config
                    .get::<String>("data.endings_file")
                    .unwrap_or_else(|_| "endings.txt".to_string()),
            );

            println!("Transforming {} -> {}", json_path.display(), csv_path.display());
            let endings = EndingSet::load(&endings_path);
            println!("Endings in effect: {}", endings.len());
            let rows = transform_corpus(&json_path, &endings)?;
            write_table(&csv_path, &rows)?;
            println!("✅ Wrote {} rows to {}", rows.len(), csv_path.display());
        }
        "clean" => {
            let (input, output) = in_out_args(&args, "clean");
            let mut rows = read_table(&input)?;
            clean_subjects(&mut rows);
            write_table(&output, &rows)?;
            println!("✅ Cleaned {} rows -> {}", rows.len(), output.display());
        }
        "filter" => {
            let (input, output) = in_out_args(&args, "filter");
            let rows = read_table(&input)?;
            let (kept, dropped) = filter_linked(rows);
            write_table(&output, &kept)?;
            println!("Rows kept: {}", kept.len());
            println!("Rows removed: {}", dropped);
            println!("✅ Saved {}", output.display());
        }
        "report" => {
            let (input, output) = in_out_args(&args, "report");
            let rows = read_table(&input)?;
            let report = endings_report(&rows);
            fs::write(&output, report)?;
            println!("✅ Endings report written to {}", output.display());
        }
        _ => {
            eprintln!("Unknown command: {}", cmd);
            std::process::exit(1);
        }
    }
    Ok(())
}

fn in_out_args(args: &[String], cmd: &str) -> (PathBuf, PathBuf) {
    match (args.get(0), args.get(1)) {
        (Some(input), Some(output)) => (expand_path(input), expand_path(output)),
        _ => {
            eprintln!("Usage: subdex {} <input.csv> <output.csv>", cmd);
            std::process::exit(1);
        }
    }
}
