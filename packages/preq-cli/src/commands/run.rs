use crate::cli::RunArgs;
use crate::eval_params;
use crate::exit_codes;
use crate::output;
use preq_rs::{FanoutSink, JsonLinesSink, LogSink};

pub fn execute(args: RunArgs) -> i32 {
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

    let mut stream = match eval_params::open_stream(&args) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return exit_codes::INPUT_ERROR;
        }
    };

    let mut sink = FanoutSink::new();
    sink.push(LogSink);
    if let Some(ref path) = args.snapshots {
        match output::create_snapshot_file(path) {
            Ok(writer) => sink.push(JsonLinesSink::new(writer)),
            Err(msg) => {
                eprintln!("Error: {}", msg);
                return exit_codes::EXECUTION_ERROR;
            }
        }
    }

    let destination =
        output::resolve_destination(args.output.as_deref(), config.output_file.as_deref());

    if !args.eval.quiet {
        eprintln!(
            "Evaluating {} on {}...",
            kind.info().name,
            stream.name()
        );
        eprintln!(
            "  Budget: max_instances={}, max_time={}",
            config.max_instances,
            config
                .max_time
                .map(|t| format!("{}s", t))
                .unwrap_or_else(|| "unbounded".to_string())
        );
        eprintln!(
            "  Batches: size={}, n_wait={}, pretrain_size={}",
            config.batch_size, config.n_wait, config.pretrain_size
        );
    }

    let report =
        match eval_params::evaluate(&mut stream, kind, &args.eval.nominal, config, &mut sink) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("Evaluation failed: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        };
    drop(sink);

    match output::to_json(&report, args.eval.compact) {
        Ok(json) => {
            if let Err(e) = output::write_output(&json, destination.as_deref()) {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
            if !args.eval.quiet {
                eprintln!(
                    "{} instances, accuracy {:.4}, kappa {:.4} ({})",
                    report.instances_processed, report.accuracy, report.kappa, report.termination
                );
                if let Some(ref path) = destination {
                    eprintln!("Report written to {}", path.display());
                }
            }
            exit_codes::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing report: {}", e);
            exit_codes::EXECUTION_ERROR
        }
    }
}
