use crate::fmt::{cprintln, DIM, GREEN, RESET, YELLOW};
use crate::refs::filter_from;
use crate::transcript::classify;
use crate::usage::zero_last_cache_counter;
use crate::{boundary, models, session, view};
use anyhow::Result;

/// Outcome of one pruning pass.
pub struct PruneReport {
    pub lines: Vec<String>,
    /// Message records that survived the cut.
    pub kept: usize,
    /// Message records that fell before it.
    pub dropped: usize,
    /// Assistant records observed in the input (head excluded).
    pub assistant_count: usize,
}

fn assistant_indices(lines: &[String]) -> Vec<usize> {
    lines
        .iter()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| classify(line).is_assistant())
        .map(|(i, _)| i)
        .collect()
}

/// Keeps the transcript from the `keep`-th-last assistant turn onward.
///
/// The usage counter is rewritten over the *full* input before the cut, so a
/// cut that drops the last cache-bearing record leaves no zeroed record in
/// the output at all.
pub fn keep_recent_assistants(lines: &[String], keep: u32) -> PruneReport {
    let indices = assistant_indices(lines);
    let total = indices.len();
    let keep = keep as usize;

    // keep == 0 still cuts at the first assistant turn; a head-only output
    // happens only when there are no assistants at all.
    let cut = if total > keep {
        if keep == 0 {
            indices[0]
        } else {
            indices[total - keep]
        }
    } else {
        1
    };

    let rewritten = zero_last_cache_counter(lines);
    let outcome = filter_from(&rewritten, cut);
    PruneReport {
        lines: outcome.lines,
        kept: outcome.kept,
        dropped: outcome.dropped,
        assistant_count: total,
    }
}

/// Keeps the transcript from a chosen boundary line onward. Line 0 is the
/// head and cannot be cut away; a line past the end keeps only the head.
pub fn keep_from_boundary(lines: &[String], boundary_line: u32) -> PruneReport {
    let assistant_count = assistant_indices(lines).len();
    let rewritten = zero_last_cache_counter(lines);
    let outcome = filter_from(&rewritten, boundary_line as usize);
    PruneReport {
        lines: outcome.lines,
        kept: outcome.kept,
        dropped: outcome.dropped,
        assistant_count,
    }
}

pub struct PruneOpts {
    pub session: Option<String>,
    pub keep: Option<u32>,
    pub boundary: Option<u32>,
    pub dry_run: bool,
    pub yes: bool,
}

/// The `prune` subcommand: resolve the session, choose a cut, back up the
/// original, write the pruned transcript back.
pub fn run(opts: PruneOpts) -> Result<()> {
    let project_dir = models::current_project_dir();
    let path = session::resolve_session(&project_dir, opts.session.as_deref())?;
    let lines = session::read_lines(&path)?;

    if lines.is_empty() {
        cprintln!("{DIM}transcript is empty — nothing to prune{RESET}");
        return Ok(());
    }

    let display_path = models::shorten_home(&path.to_string_lossy());
    cprintln!();
    cprintln!("  session {DIM}{display_path}{RESET} ({} lines)", lines.len());

    let report = match (opts.keep, opts.boundary) {
        (Some(keep), _) => keep_recent_assistants(&lines, keep),
        (None, Some(line)) => keep_from_boundary(&lines, line),
        (None, None) => {
            let (boundaries, _total) = boundary::analyze(&lines);
            if boundaries.is_empty() {
                cprintln!("  no boundaries found — rerun with --keep N");
                return Ok(());
            }
            view::print_boundary_list(&boundaries);
            let Some(choice) = view::select_boundary(boundaries.len())? else {
                cprintln!("  cancelled");
                return Ok(());
            };
            keep_from_boundary(&lines, boundaries[choice].line_number as u32)
        }
    };

    view::print_prune_report(&report, lines.len());

    if opts.dry_run {
        cprintln!("  {YELLOW}dry run{RESET} — transcript left untouched");
        return Ok(());
    }

    if !opts.yes && !view::prompt_yn("Write pruned transcript?", true)? {
        cprintln!("  cancelled");
        return Ok(());
    }

    let backup = session::backup(&path)?;
    session::write_transcript(&path, &report.lines)?;

    cprintln!(
        "  {GREEN}✓{RESET} backup {DIM}{}{RESET}",
        models::shorten_home(&backup.to_string_lossy())
    );
    cprintln!("  {GREEN}✓{RESET} pruned transcript written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::parse_record;

    fn head() -> String {
        r#"{"type":"summary"}"#.to_string()
    }

    fn user(uuid: &str) -> String {
        serde_json::json!({ "type": "user", "uuid": uuid }).to_string()
    }

    fn assistant(uuid: &str) -> String {
        serde_json::json!({ "type": "assistant", "uuid": uuid }).to_string()
    }

    fn assistant_calling(uuid: &str, id: &str) -> String {
        serde_json::json!({
            "type": "assistant",
            "uuid": uuid,
            "message": { "content": [{ "type": "tool_use", "id": id, "name": "bash" }] }
        })
        .to_string()
    }

    fn tool_result(id: &str) -> String {
        serde_json::json!({ "type": "tool_result", "tool_use_id": id, "content": "ok" })
            .to_string()
    }

    fn user_with_cache(uuid: &str, tokens: u64) -> String {
        serde_json::json!({
            "type": "user",
            "uuid": uuid,
            "usage": { "cache_read_input_tokens": tokens }
        })
        .to_string()
    }

    #[test]
    fn everything_preserved_when_keep_exceeds_assistants() {
        let lines = vec![head(), user("1"), assistant("2")];
        let report = keep_recent_assistants(&lines, 5);
        assert_eq!(report.lines, lines);
        assert_eq!(report.kept, 2);
        assert_eq!(report.dropped, 0);
        assert_eq!(report.assistant_count, 1);
    }

    #[test]
    fn cut_drops_older_turns_and_their_tool_results() {
        let lines = vec![
            head(),
            assistant_calling("a1", "T1"),
            tool_result("T1"),
            assistant_calling("a2", "T2"),
            tool_result("T2"),
        ];
        let report = keep_recent_assistants(&lines, 1);

        assert_eq!(report.lines.len(), 3);
        assert_eq!(report.lines[0], lines[0]);
        assert!(report.lines[1].contains("a2"));
        assert!(report.lines[2].contains("T2"));
        assert!(!report.lines.iter().any(|l| l.contains("T1")));
        assert_eq!(report.kept, 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.assistant_count, 2);
    }

    #[test]
    fn last_cache_counter_is_zeroed_in_surviving_output() {
        let lines = vec![
            head(),
            user_with_cache("u1", 500),
            serde_json::json!({
                "type": "assistant",
                "uuid": "a1",
                "usage": { "cache_read_input_tokens": 1000 }
            })
            .to_string(),
            user_with_cache("u2", 1500),
        ];
        let report = keep_recent_assistants(&lines, 10);

        let first = parse_record(&report.lines[1]).unwrap();
        let second = parse_record(&report.lines[2]).unwrap();
        let third = parse_record(&report.lines[3]).unwrap();
        assert_eq!(first["usage"]["cache_read_input_tokens"], 500);
        assert_eq!(second["usage"]["cache_read_input_tokens"], 1000);
        assert_eq!(third["usage"]["cache_read_input_tokens"], 0);
    }

    #[test]
    fn rewrite_happens_before_the_cut() {
        // The last cache-bearing record falls before the cut, so the output
        // carries no zeroed record anywhere.
        let lines = vec![
            head(),
            user_with_cache("u1", 900),
            assistant("a1"),
            assistant("a2"),
        ];
        let report = keep_recent_assistants(&lines, 1);
        assert!(!report
            .lines
            .iter()
            .any(|l| l.contains("cache_read_input_tokens")));
    }

    #[test]
    fn keep_zero_cuts_at_the_first_assistant() {
        let lines = vec![head(), user("1"), assistant("2"), user("3"), assistant("4")];
        let report = keep_recent_assistants(&lines, 0);
        // The first assistant is the cut line, so it survives along with
        // everything after it; only the user turn before it is dropped.
        assert_eq!(report.dropped, 1);
        assert_eq!(report.kept, 3);
        assert!(report.lines[1].contains("\"2\""));
    }

    #[test]
    fn keep_zero_without_assistants_keeps_only_the_head() {
        let lines = vec![head(), user("1"), user("2")];
        let report = keep_recent_assistants(&lines, 0);
        assert_eq!(report.lines, lines);
        assert_eq!(report.assistant_count, 0);
    }

    #[test]
    fn pruning_twice_is_stable() {
        let lines = vec![
            head(),
            assistant_calling("a1", "T1"),
            tool_result("T1"),
            assistant_calling("a2", "T2"),
            tool_result("T2"),
            assistant_calling("a3", "T3"),
            tool_result("T3"),
        ];
        let first = keep_recent_assistants(&lines, 2);
        let second = keep_recent_assistants(&first.lines, 2);
        assert_eq!(first.lines, second.lines);
        assert_eq!(second.dropped, 0);
    }

    #[test]
    fn head_survives_every_mode() {
        let lines = vec![head(), user("1"), assistant("2")];
        assert_eq!(keep_recent_assistants(&lines, 0).lines[0], head());
        assert_eq!(keep_from_boundary(&lines, 0).lines[0], head());
        assert_eq!(keep_from_boundary(&lines, 99).lines[0], head());
    }

    #[test]
    fn boundary_mode_cuts_at_the_given_line() {
        let lines = vec![head(), user("1"), assistant("2"), user("3")];
        let report = keep_from_boundary(&lines, 2);
        assert_eq!(report.lines.len(), 3);
        assert_eq!(report.kept, 2);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.assistant_count, 1);
    }

    #[test]
    fn boundary_one_drops_nothing() {
        let lines = vec![head(), user("1"), assistant("2")];
        let report = keep_from_boundary(&lines, 1);
        assert_eq!(report.lines, lines);
        assert_eq!(report.dropped, 0);
    }

    #[test]
    fn boundary_past_end_drops_all_messages() {
        let lines = vec![head(), user("1"), assistant("2")];
        let report = keep_from_boundary(&lines, 50);
        assert_eq!(report.lines, vec![head()]);
        assert_eq!(report.dropped, 2);
    }

    #[test]
    fn empty_input_produces_empty_report() {
        let report = keep_recent_assistants(&[], 3);
        assert!(report.lines.is_empty());
        assert_eq!(report.kept, 0);
        assert_eq!(report.dropped, 0);
        assert_eq!(report.assistant_count, 0);
    }
}
