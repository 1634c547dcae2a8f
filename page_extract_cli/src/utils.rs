use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use tracing::info;

/// Writes `data` as pretty JSON to `path`, or to stdout when no path is given.
pub fn save_json<T: Serialize>(data: &T, path: Option<&Path>) -> anyhow::Result<()> {
    let body = serde_json::to_string_pretty(data)?;
    save_text(&body, path)
}

pub fn save_text(content: &str, path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(content.as_bytes())?;
            info!(path = %path.display(), "output written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

/// Installs the `RUST_LOG`-driven subscriber used by the binaries.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_json_file() {
        let path = std::env::temp_dir().join(format!("page-extract-{}.json", std::process::id()));
        save_json(&serde_json::json!({ "ok": true }), Some(&path)).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(written, "{\n  \"ok\": true\n}");
    }
}
