use crate::cli::{EvalArgs, RunArgs};
use preq_rs::{
    Classifier, ClassifierKind, ConfigUpdate, DataStream, EvaluationReport, EvaluatorConfig,
    PrequentialEvaluator, ReportingSink, SeaGenerator, Stream,
};
use std::path::Path;

const STREAM_EXTENSIONS: &[&str] = &["csv", "txt"];

/// Validate a single stream file path: existence and supported extension.
pub fn validate_file(file_path: &str) -> Result<(), String> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("Input file not found: {}", file_path));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if !STREAM_EXTENSIONS.contains(&ext.as_str()) {
        return Err(format!(
            "Unsupported file extension '{}'. Supported: {}",
            ext,
            STREAM_EXTENSIONS.join(", ")
        ));
    }

    Ok(())
}

/// Assemble the run configuration: `--config` file, then flags, then `--set`.
pub fn build_config(args: &EvalArgs) -> Result<EvaluatorConfig, String> {
    let mut config = match args.config {
        Some(ref path) => EvaluatorConfig::from_json_file(path)
            .map_err(|e| format!("Invalid config file '{}': {}", path, e))?,
        None => EvaluatorConfig::default(),
    };

    let flags = ConfigUpdate {
        n_wait: args.n_wait,
        max_instances: args.max_instances,
        max_time: args
            .max_time
            .map(|t| if t == f64::INFINITY { None } else { Some(t) }),
        batch_size: args.batch_size,
        pretrain_size: args.pretrain_size,
        show_plot: args.show_plot.then_some(true),
        show_kappa: args.show_kappa.then_some(true),
        ..Default::default()
    };
    if !flags.is_empty() {
        config.apply(&flags).map_err(|e| e.to_string())?;
    }

    if !args.set.is_empty() {
        let overrides = ConfigUpdate::from_pairs(&args.set).map_err(|e| e.to_string())?;
        config.apply(&overrides).map_err(|e| e.to_string())?;
    }

    Ok(config)
}

pub fn resolve_classifier(name: &str) -> Result<ClassifierKind, String> {
    ClassifierKind::from_name(name).ok_or_else(|| {
        let valid: Vec<&str> = ClassifierKind::ALL.iter().map(|k| k.info().name).collect();
        format!(
            "Unknown classifier '{}'. Valid classifiers: {}",
            name,
            valid.join(", ")
        )
    })
}

/// Load a CSV stream file.
pub fn open_file_stream(file_path: &str) -> Result<DataStream, String> {
    validate_file(file_path)?;
    DataStream::from_csv_path(file_path)
        .map_err(|e| format!("Failed to read stream '{}': {}", file_path, e))
}

/// Open the stream selected by `--file` or `--generator`.
pub fn open_stream(args: &RunArgs) -> Result<Box<dyn Stream>, String> {
    match (&args.file, &args.generator) {
        (Some(file), _) => Ok(Box::new(open_file_stream(file)?)),
        (None, Some(generator)) => match generator.to_ascii_lowercase().as_str() {
            "sea" => SeaGenerator::new(args.function, args.noise, args.seed)
                .map(|g| Box::new(g) as Box<dyn Stream>)
                .map_err(|e| e.to_string()),
            other => Err(format!("Unknown generator '{}'. Valid generators: sea", other)),
        },
        (None, None) => Err("One of --file or --generator must be specified".to_string()),
    }
}

/// Run one prequential evaluation with a freshly built classifier.
pub fn evaluate<S, R>(
    stream: &mut S,
    kind: ClassifierKind,
    nominal: &[usize],
    config: EvaluatorConfig,
    sink: &mut R,
) -> Result<EvaluationReport, String>
where
    S: Stream + ?Sized,
    R: ReportingSink + ?Sized,
{
    let mut evaluator: PrequentialEvaluator<Box<dyn Classifier>> =
        PrequentialEvaluator::new(config).map_err(|e| e.to_string())?;
    let (_, report) = evaluator
        .eval(stream, kind.build(nominal), sink)
        .map_err(|e| e.to_string())?;
    Ok(report)
}
