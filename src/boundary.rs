use crate::transcript::{content_text, parse_record, record_name};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::OnceLock;

/// Marker substring appended by `reseco hook`. Detection is byte-level and
/// position-insensitive so markers survive being wrapped inside JSON strings.
pub const INTENT_MARKER: &str = "===INTENT_BOUNDARY===";

/// Substrings of a bash tool result that indicate a commit landed.
const COMMIT_HINTS: &[&str] = &["files changed", "insertions", "deletions"];

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryKind {
    ExplicitMarker,
    DerivedCommit,
}

/// A candidate cut-point. The line at `line_number` is the first line that
/// survives a cut taken here.
#[derive(Serialize, Debug, Clone)]
pub struct Boundary {
    pub line_number: usize,
    pub kind: BoundaryKind,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    pub retention_percentage: u32,
    pub character_count: u64,
}

fn commit_message_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"git commit -m ["']([^"']+)["']"#).unwrap())
}

/// Scans the transcript for cut candidates and returns them newest-first,
/// together with the total byte count the retention math ran against.
///
/// Byte totals count each line plus one separator newline, uniformly — the
/// same convention the writer uses when joining output lines.
pub fn analyze(lines: &[String]) -> (Vec<Boundary>, u64) {
    if lines.is_empty() {
        return (Vec::new(), 0);
    }

    let mut offsets = Vec::with_capacity(lines.len());
    let mut total: u64 = 0;
    for line in lines {
        offsets.push(total);
        total += line.len() as u64 + 1;
    }

    let mut boundaries = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if let Some(pos) = line.find(INTENT_MARKER) {
            let (timestamp, intent) = parse_marker_labels(line, pos);
            let description = intent
                .clone()
                .unwrap_or_else(|| "Boundary marker".to_string());
            boundaries.push(make_boundary(
                i,
                BoundaryKind::ExplicitMarker,
                description,
                timestamp,
                intent,
                offsets[i],
                total,
            ));
        }
        if let Some(record) = parse_record(line) {
            if is_commit_result(&record) {
                boundaries.push(make_boundary(
                    i,
                    BoundaryKind::DerivedCommit,
                    commit_label(lines, i),
                    None,
                    None,
                    offsets[i],
                    total,
                ));
            }
        }
    }

    boundaries.sort_by(|a, b| b.line_number.cmp(&a.line_number));
    (boundaries, total)
}

fn make_boundary(
    line_number: usize,
    kind: BoundaryKind,
    description: String,
    timestamp: Option<String>,
    intent: Option<String>,
    offset: u64,
    total: u64,
) -> Boundary {
    let retained = total - offset;
    let retention_percentage = if total == 0 {
        0
    } else {
        (retained as f64 * 100.0 / total as f64).round() as u32
    };
    Boundary {
        line_number,
        kind,
        description,
        timestamp,
        intent,
        retention_percentage,
        character_count: retained,
    }
}

/// Canonical marker form: `===INTENT_BOUNDARY=== <ts>[ | <intent>]`. The
/// timestamp is the first token after the marker, the intent everything past
/// the first `|`. Both are best-effort labels — on markers embedded inside a
/// JSON string they may pick up surrounding syntax.
fn parse_marker_labels(line: &str, pos: usize) -> (Option<String>, Option<String>) {
    let rest = &line[pos + INTENT_MARKER.len()..];
    let (ts_part, intent_part) = match rest.split_once('|') {
        Some((ts, intent)) => (ts, Some(intent)),
        None => (rest, None),
    };
    let timestamp = ts_part.split_whitespace().next().map(str::to_string);
    let intent = intent_part
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);
    (timestamp, intent)
}

fn is_commit_result(record: &Value) -> bool {
    if record["type"].as_str() != Some("tool_result") {
        return false;
    }
    if !record_name(record).is_some_and(|n| n.eq_ignore_ascii_case("bash")) {
        return false;
    }
    let text = content_text(record);
    COMMIT_HINTS.iter().any(|hint| text.contains(hint))
}

/// Walks backward from a commit result to the bash invocation that produced
/// it, labelling the boundary with the commit message when one can be read
/// out of the command line.
fn commit_label(lines: &[String], result_index: usize) -> String {
    for line in lines[..result_index].iter().rev() {
        let Some(record) = parse_record(line) else {
            continue;
        };
        if record["type"].as_str() != Some("tool_call") {
            continue;
        }
        if !record_name(&record).is_some_and(|n| n.eq_ignore_ascii_case("bash")) {
            continue;
        }
        let Some(command) = record["parameters"]["command"].as_str() else {
            continue;
        };
        if let Some(caps) = commit_message_re().captures(command) {
            return format!("Git commit: {}", &caps[1]);
        }
    }
    "Successful commit".to_string()
}
