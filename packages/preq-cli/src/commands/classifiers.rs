use crate::cli::ClassifiersArgs;
use crate::exit_codes;
use crate::output;
use preq_rs::{ClassifierInfo, ClassifierKind};

pub fn execute(args: ClassifiersArgs) -> i32 {
    let classifiers: Vec<ClassifierInfo> = ClassifierKind::ALL.iter().map(|k| k.info()).collect();

    if args.json {
        match output::to_json(&classifiers, false) {
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
    } else {
        println!("Available classifiers:\n");
        println!("  {:<14} {:<8} {}", "Name", "Nominal", "Description");
        println!("  {}", "-".repeat(72));
        for c in &classifiers {
            println!(
                "  {:<14} {:<8} {}",
                c.name,
                if c.supports_nominal { "yes" } else { "no" },
                c.description
            );
        }
        println!();
        println!("Example: preq run --generator sea --classifier naive-bayes --max-instances 5000");
    }

    exit_codes::SUCCESS
}
