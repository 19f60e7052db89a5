use crate::boundary::INTENT_MARKER;
use crate::fmt::trunc;
use anyhow::{Context, Result};
use fs2::FileExt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

const MAX_INTENT_CHARS: usize = 72;

/// The `hook` subcommand. Claude Code pipes a UserPromptSubmit payload on
/// stdin; we drop an intent boundary into the live transcript so later
/// pruning has cut points to offer. Anything unexpected exits quietly —
/// a hook that fails loudly breaks the user's session.
pub fn run() -> Result<()> {
    use std::io::Read;
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let Ok(payload) = serde_json::from_str::<serde_json::Value>(&input) else {
        return Ok(());
    };
    let Some(transcript_path) = payload["transcript_path"].as_str() else {
        return Ok(());
    };

    let timestamp = chrono::Utc::now().to_rfc3339();
    let intent = payload["prompt"]
        .as_str()
        .and_then(|p| p.lines().next())
        .map(|first| trunc(first.trim(), MAX_INTENT_CHARS))
        .filter(|s| !s.is_empty());

    let line = marker_line(&timestamp, intent.as_deref());
    append_marker(Path::new(transcript_path), &line)
}

pub(crate) fn marker_line(timestamp: &str, intent: Option<&str>) -> String {
    match intent {
        Some(intent) => format!("{INTENT_MARKER} {timestamp} | {intent}"),
        None => format!("{INTENT_MARKER} {timestamp}"),
    }
}

/// Appends under an exclusive lock — Claude Code may be writing the same
/// transcript while the hook runs. A transcript that doesn't exist yet is
/// skipped rather than created.
fn append_marker(path: &Path, line: &str) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .context("opening transcript")?;

    file.lock_exclusive().context("locking transcript")?;
    let result = file
        .write_all(format!("{line}\n").as_bytes())
        .and_then(|()| file.flush());
    file.unlock().ok();

    result.context("appending boundary marker")
}
