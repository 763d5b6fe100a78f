use crate::cli::BatchArgs;
use crate::eval_params;
use crate::exit_codes;
use crate::output;
use preq_rs::{EvaluationReport, LogSink};
use std::path::Path;
use std::time::Instant;

pub fn execute(args: BatchArgs) -> i32 {
    let files = match resolve_files(&args) {
        Ok(f) => f,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    if files.is_empty() {
        eprintln!("Error: No matching files found");
        return exit_codes::INPUT_ERROR;
    }

    let config = match eval_params::build_config(&args.eval) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let kind = match eval_params::resolve_classifier(&args.eval.classifier) {
        Ok(k) => k,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let total = files.len();
    let mut succeeded = 0usize;
    let mut failed = 0usize;
    let mut reports: Vec<EvaluationReport> = Vec::with_capacity(total);
    let start_time = Instant::now();

    for (i, file_path) in files.iter().enumerate() {
        if !args.eval.quiet {
            eprintln!("[{}/{}] {}...", i + 1, total, file_path);
        }

        let result = eval_params::open_file_stream(file_path).and_then(|mut stream| {
            eval_params::evaluate(
                &mut stream,
                kind,
                &args.eval.nominal,
                config.clone(),
                &mut LogSink,
            )
        });

        match result {
            Ok(report) => {
                if !args.eval.quiet {
                    eprintln!(
                        "  {} instances, accuracy {:.4}",
                        report.instances_processed, report.accuracy
                    );
                }
                reports.push(report);
                succeeded += 1;
            }
            Err(e) => {
                eprintln!("  Error: {}", e);
                failed += 1;
                if !args.continue_on_error {
                    break;
                }
            }
        }
    }

    let elapsed = start_time.elapsed();

    match output::to_json(&reports, args.eval.compact) {
        Ok(json) => {
            if let Err(e) = output::write_output(&json, args.output.as_deref().map(Path::new)) {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
        Err(e) => {
            eprintln!("Error serializing reports: {}", e);
            return exit_codes::EXECUTION_ERROR;
        }
    }

    if !args.eval.quiet {
        eprintln!(
            "Batch complete: {}/{} succeeded, {}/{} failed, {:.1}s",
            succeeded,
            total,
            failed,
            total,
            elapsed.as_secs_f64()
        );
    }

    if failed == 0 {
        exit_codes::SUCCESS
    } else if succeeded > 0 {
        exit_codes::PARTIAL_FAILURE
    } else {
        exit_codes::EXECUTION_ERROR
    }
}

fn resolve_files(args: &BatchArgs) -> Result<Vec<String>, String> {
    if let Some(ref pattern) = args.glob {
        resolve_glob(pattern)
    } else if let Some(ref files) = args.files {
        Ok(files.clone())
    } else {
        Err("One of --glob or --files must be specified".to_string())
    }
}

fn resolve_glob(pattern: &str) -> Result<Vec<String>, String> {
    let paths = glob::glob(pattern)
        .map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;

    let mut files: Vec<String> = Vec::new();
    for entry in paths {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    if let Some(s) = path.to_str() {
                        files.push(s.to_string());
                    }
                }
            }
            Err(e) => {
                log::warn!("glob error: {}", e);
            }
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_glob_sorted_files_only() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.csv", "notes.md"] {
            std::fs::write(dir.path().join(name), "1,0\n").unwrap();
        }
        std::fs::create_dir(dir.path().join("c.csv")).unwrap();

        let pattern = format!("{}/*.csv", dir.path().display());
        let files = resolve_glob(&pattern).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.csv"));
        assert!(files[1].ends_with("b.csv"));
    }

    #[test]
    fn test_invalid_glob_pattern() {
        assert!(resolve_glob("data/[*.csv").is_err());
    }
}
