use crate::cli::ValidateArgs;
use crate::eval_params;
use crate::exit_codes;
use crate::output;
use preq_rs::{Label, Stream};
use serde::Serialize;

#[derive(Serialize)]
struct ValidateOutput {
    file: String,
    valid: bool,
    instances: Option<usize>,
    n_features: Option<usize>,
    classes: Option<Vec<Label>>,
    feature_names: Option<Vec<String>>,
    error: Option<String>,
}

pub fn execute(args: ValidateArgs) -> i32 {
    let result = match eval_params::open_file_stream(&args.file) {
        Ok(stream) => ValidateOutput {
            file: args.file.clone(),
            valid: true,
            instances: Some(stream.n_instances()),
            n_features: Some(stream.n_features()),
            classes: Some(stream.classes()),
            feature_names: stream.feature_names().map(<[String]>::to_vec),
            error: None,
        },
        Err(msg) => ValidateOutput {
            file: args.file.clone(),
            valid: false,
            instances: None,
            n_features: None,
            classes: None,
            feature_names: None,
            error: Some(msg),
        },
    };

    if args.json {
        match output::to_json(&result, false) {
            Ok(json) => {
                if let Err(e) = output::write_output(&json, None) {
                    eprintln!("Error: {}", e);
                    return exit_codes::EXECUTION_ERROR;
                }
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                return exit_codes::EXECUTION_ERROR;
            }
        }
    } else if let Some(ref err) = result.error {
        eprintln!("Error: {}", err);
    } else {
        println!(
            "File '{}' is valid ({} instances, {} features, classes {:?})",
            args.file,
            result.instances.unwrap_or(0),
            result.n_features.unwrap_or(0),
            result.classes.as_deref().unwrap_or(&[])
        );
    }

    if result.valid {
        exit_codes::SUCCESS
    } else {
        exit_codes::INPUT_ERROR
    }
}
