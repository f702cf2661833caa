//! Compare every model in the standard suite on a set of inputs.
//!
//! Each argument is read as a file if one exists at that path, otherwise it
//! is coded as literal text.
//!
//! Run with: cargo run --release --example corpus_report --features parallel -- <file-or-text>...

use std::path::Path;
use std::{env, fs, process};

use arithcode::{evaluate, ModelSpec, StatsTable};

fn main() {
    let inputs: Vec<String> = env::args().skip(1).collect();
    if inputs.is_empty() {
        eprintln!("usage: corpus_report <file-or-text>...");
        process::exit(2);
    }

    let suite = ModelSpec::standard_suite();
    let mut table = StatsTable::new();

    for input in &inputs {
        let data = if Path::new(input).is_file() {
            match fs::read(input) {
                Ok(data) => data,
                Err(e) => {
                    eprintln!("{input}: {e}");
                    continue;
                }
            }
        } else {
            input.clone().into_bytes()
        };

        let evaluations = match evaluate(&data, &suite) {
            Ok(evaluations) => evaluations,
            Err(e) => {
                eprintln!("{input}: {e}");
                continue;
            }
        };

        println!("{} ({} bytes)", input, data.len());
        for evaluation in &evaluations {
            println!(
                "  {:<8} {:>9} bytes {:>7.3} b/B {:>8.2?} enc {:>8.2?} dec{}",
                evaluation.spec.to_string(),
                evaluation.coded_bytes,
                evaluation.bits_per_byte(),
                evaluation.encode_time,
                evaluation.decode_time,
                if evaluation.exact { "" } else { "  MISMATCH" },
            );
            table.record_evaluation(evaluation);
        }
        println!();
    }

    print!("{table}");
}
