use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write a JSON document to stdout or a file, followed by a newline.
pub fn write_output(json: &str, output_path: Option<&Path>) -> Result<(), String> {
    match output_path {
        Some(path) => {
            let mut content = String::with_capacity(json.len() + 1);
            content.push_str(json);
            content.push('\n');
            std::fs::write(path, content)
                .map_err(|e| format!("Failed to write output file '{}': {}", path.display(), e))
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(json.as_bytes())
                .and_then(|_| handle.write_all(b"\n"))
                .map_err(|e| format!("Failed to write to stdout: {}", e))
        }
    }
}

/// Serialize a value to JSON (pretty or compact).
pub fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String, String> {
    if compact {
        serde_json::to_string(value).map_err(|e| format!("JSON serialization failed: {}", e))
    } else {
        serde_json::to_string_pretty(value)
            .map_err(|e| format!("JSON serialization failed: {}", e))
    }
}

/// Report destination: the `--output` flag wins over the configured `output_file`.
pub fn resolve_destination(flag: Option<&str>, configured: Option<&Path>) -> Option<PathBuf> {
    flag.map(PathBuf::from)
        .or_else(|| configured.map(Path::to_path_buf))
}

/// Buffered writer for the snapshot JSON-lines file
pub fn create_snapshot_file(path: &str) -> Result<BufWriter<File>, String> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| format!("Failed to create snapshot file '{}': {}", path, e))
}
