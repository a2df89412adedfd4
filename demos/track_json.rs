//! Reads detection batches, one JSON array per line, and prints the tracked
//! trajectories as a JSON object.
//!
//! Usage: track_json <detections.jsonl> [config.json]

use std::io::BufRead;

use sort_tracker::error::Error;
use sort_tracker::{Detection, StreamOrchestrator, TrackerConfig};

fn main() -> Result<(), Error> {
    let mut args = std::env::args().skip(1);

    let Some(in_file_name) = args.next() else {
        eprintln!("usage: track_json <detections.jsonl> [config.json]");
        std::process::exit(2);
    };

    let config = match args.next() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) => {
                eprintln!("cannot read config {}: {}", path, err);
                std::process::exit(2);
            }
        },
        None => TrackerConfig::default(),
    };

    let dets_file = match std::fs::File::open(&in_file_name) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("cannot open {}: {}", in_file_name, err);
            std::process::exit(2);
        }
    };

    let mut orchestrator = StreamOrchestrator::new(config)?;

    for (idx, line) in std::io::BufReader::new(dets_file).lines().enumerate() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("read failed at line {}: {}", idx + 1, err);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let batch: Vec<Detection> = serde_json::from_str(&line)?;
        orchestrator.ingest(batch)?;
    }

    let trajectories = orchestrator.finish()?;
    println!("{}", serde_json::to_string_pretty(&trajectories)?);

    Ok(())
}
