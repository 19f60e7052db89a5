use crate::transcript::{classify, LineClass};
use std::collections::HashSet;

/// Result of filtering a transcript at a cut point.
pub struct FilterOutcome {
    pub lines: Vec<String>,
    /// Message records at or after the cut.
    pub kept: usize,
    /// Message records before the cut (the head never counts).
    pub dropped: usize,
}

/// Pass 1: every invocation identifier carried by a line that survives the
/// cut. Tool results whose id is missing from this set are orphans.
pub fn surviving_invocation_ids(lines: &[String], cut: usize) -> HashSet<String> {
    let mut ids = HashSet::new();
    for line in lines.iter().skip(cut.max(1)) {
        match classify(line) {
            LineClass::Message { invocation_ids, .. }
            | LineClass::ToolCall { invocation_ids } => ids.extend(invocation_ids),
            _ => {}
        }
    }
    ids
}

/// Pass 2: rebuilds the transcript from the cut onward. The head is always
/// emitted first; orphaned tool results are dropped without counting.
///
/// A cut of 0 behaves as 1 (the head cannot be cut away); a cut past the end
/// leaves only the head and counts every message as dropped.
pub fn filter_from(lines: &[String], cut: usize) -> FilterOutcome {
    if lines.is_empty() {
        return FilterOutcome {
            lines: Vec::new(),
            kept: 0,
            dropped: 0,
        };
    }
    let cut = cut.max(1);
    let surviving = surviving_invocation_ids(lines, cut);

    let mut out = vec![lines[0].clone()];
    let mut kept = 0;
    let mut dropped = 0;

    for (i, line) in lines.iter().enumerate().skip(1) {
        let class = classify(line);
        if i < cut {
            if class.is_message() {
                dropped += 1;
            }
            continue;
        }
        match class {
            LineClass::Message { .. } => {
                kept += 1;
                out.push(line.clone());
            }
            LineClass::ToolResult { tool_use_id } => {
                if tool_use_id.is_some_and(|id| surviving.contains(&id)) {
                    out.push(line.clone());
                }
            }
            _ => out.push(line.clone()),
        }
    }

    FilterOutcome {
        lines: out,
        kept,
        dropped,
    }
}
