use crate::boundary::{Boundary, BoundaryKind};
use crate::fmt::{cprintln, format_size, short_id, trunc, BOLD, CYAN, DIM, GREEN, RESET};
use crate::prune::PruneReport;
use crate::transcript::classify;
use crate::{boundary, models, session};
use anyhow::Result;
use chrono::{DateTime, Local};
use std::io::{self, BufRead, Write};

/// The `boundaries` subcommand: analyze and list, touch nothing.
pub fn boundaries(arg: Option<&str>, json: bool) -> Result<()> {
    let project_dir = models::current_project_dir();
    let path = session::resolve_session(&project_dir, arg)?;
    let lines = session::read_lines(&path)?;
    let (found, total) = boundary::analyze(&lines);

    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
        return Ok(());
    }

    cprintln!();
    cprintln!(
        "  session {DIM}{}{RESET} ({} lines, {})",
        models::shorten_home(&path.to_string_lossy()),
        lines.len(),
        format_size(total)
    );

    if found.is_empty() {
        cprintln!("  no boundaries found");
        cprintln!();
        return Ok(());
    }
    print_boundary_list(&found);
    Ok(())
}

/// The `sessions` subcommand: one line per transcript, newest first.
pub fn sessions() -> Result<()> {
    let project_dir = models::current_project_dir();
    let list = session::list_sessions(&project_dir)?;

    if list.is_empty() {
        cprintln!(
            "no sessions in {}",
            models::shorten_home(&project_dir.to_string_lossy())
        );
        return Ok(());
    }

    cprintln!();
    for s in &list {
        let when: DateTime<Local> = s.modified.into();
        let message_count = session::read_lines(&s.path)
            .map(|lines| lines.iter().filter(|l| classify(l).is_message()).count())
            .unwrap_or(0);
        cprintln!(
            "  {BOLD}{}{RESET}  {DIM}{}{RESET}  {:>8}  {} messages",
            short_id(&s.id),
            when.format("%Y-%m-%d %H:%M"),
            format_size(s.size),
            message_count
        );
    }
    cprintln!();
    Ok(())
}

pub(crate) fn print_boundary_list(boundaries: &[Boundary]) {
    cprintln!();
    for (i, b) in boundaries.iter().enumerate() {
        cprintln!("{}", boundary_row(i + 1, b));
    }
    cprintln!();
}

fn boundary_row(ordinal: usize, b: &Boundary) -> String {
    let badge = match b.kind {
        BoundaryKind::ExplicitMarker => format!("{CYAN}MARKER{RESET}"),
        BoundaryKind::DerivedCommit => format!("{GREEN}COMMIT{RESET}"),
    };
    let when = b
        .timestamp
        .as_deref()
        .map(|ts| format!("  {DIM}{ts}{RESET}"))
        .unwrap_or_default();
    format!(
        "  {BOLD}{ordinal:>2}{RESET}  {badge}  {}{when}  {DIM}line {} · keeps {}% ({}){RESET}",
        trunc(&b.description, 48),
        b.line_number,
        b.retention_percentage,
        format_size(b.character_count)
    )
}

/// Reads a 1-based boundary choice from stdin. Empty input, `q`, or EOF
/// cancels; out-of-range input reprompts.
pub(crate) fn select_boundary(count: usize) -> Result<Option<usize>> {
    let stdin = io::stdin();
    loop {
        print!("  prune from which boundary? [1-{count}, q to cancel]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            return Ok(None);
        }
        let answer = input.trim();
        if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match answer.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => return Ok(Some(n - 1)),
            _ => eprintln!("  enter a number between 1 and {count}"),
        }
    }
}

pub(crate) fn print_prune_report(report: &PruneReport, input_lines: usize) {
    cprintln!();
    cprintln!(
        "  {BOLD}{}{RESET} messages kept, {BOLD}{}{RESET} dropped  {DIM}({} assistant turns){RESET}",
        report.kept,
        report.dropped,
        report.assistant_count
    );
    cprintln!(
        "  {DIM}{} → {} lines{RESET}",
        input_lines,
        report.lines.len()
    );
}

pub(crate) fn prompt_yn(question: &str, default_yes: bool) -> Result<bool> {
    let hint = if default_yes { "Y/n" } else { "y/N" };
    print!("  {question} [{hint}]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(false);
    }
    Ok(match input.trim().to_lowercase().as_str() {
        "" => default_yes,
        "y" | "yes" => true,
        _ => false,
    })
}
