use crate::fmt::{cprintln, format_size, BOLD, CYAN, DIM, GREEN, RED, RESET};
use crate::transcript::parse_record;
use crate::{models, session, setup};

pub fn run() {
    cprintln!();
    cprintln!("{DIM}── reseco doctor ───────────────────────────────{RESET}");
    cprintln!();

    let mut pass = 0;
    let mut fail = 0;

    check_claude_dir(&mut pass, &mut fail);
    check_project_dir(&mut pass, &mut fail);
    check_backup_dir(&mut pass, &mut fail);
    check_hook(&mut pass);

    cprintln!();
    cprintln!(
        "  {BOLD}{pass}{RESET} passed  {}{fail}{} failed",
        if fail > 0 { RED } else { DIM },
        RESET
    );
    cprintln!();
}

fn check_claude_dir(pass: &mut u32, fail: &mut u32) {
    let dir = models::claude_dir();
    if dir.exists() {
        ok(
            &format!(
                "Claude directory at {}",
                models::shorten_home(&dir.to_string_lossy())
            ),
            pass,
        );
    } else {
        err("Claude directory missing — is Claude Code installed?", fail);
    }
}

fn check_project_dir(pass: &mut u32, fail: &mut u32) {
    let dir = models::current_project_dir();
    let short = models::shorten_home(&dir.to_string_lossy());

    if !dir.exists() {
        err(
            &format!("no transcripts for this directory ({short})"),
            fail,
        );
        return;
    }

    let sessions = session::list_sessions(&dir).unwrap_or_default();
    if sessions.is_empty() {
        cprintln!("  {CYAN}i{RESET}  project directory exists but holds no sessions");
        return;
    }
    ok(&format!("{} session(s) in {short}", sessions.len()), pass);

    check_newest_session(&sessions[0]);
}

fn check_newest_session(newest: &session::SessionFile) {
    let Ok(lines) = session::read_lines(&newest.path) else {
        return;
    };
    if lines.is_empty() {
        cprintln!("  {CYAN}i{RESET}  newest session is empty");
        return;
    }
    let bad = lines.iter().filter(|l| parse_record(l).is_none()).count();
    if bad == 0 {
        cprintln!(
            "  {CYAN}i{RESET}  newest session: {} lines ({}), all valid JSON",
            lines.len(),
            format_size(newest.size)
        );
    } else {
        cprintln!(
            "  {CYAN}i{RESET}  newest session: {} lines, {bad} opaque line(s)",
            lines.len()
        );
    }
}

fn check_backup_dir(pass: &mut u32, fail: &mut u32) {
    let project_dir = models::current_project_dir();
    if !project_dir.exists() {
        return;
    }
    let dir = models::backup_dir(&project_dir);
    if dir.exists() || std::fs::create_dir_all(&dir).is_ok() {
        let count = std::fs::read_dir(&dir)
            .map(|entries| entries.filter_map(|e| e.ok()).count())
            .unwrap_or(0);
        ok(&format!("backup directory writable ({count} backup(s))"), pass);
    } else {
        err("backup directory not writable", fail);
    }
}

fn check_hook(pass: &mut u32) {
    let path = models::claude_dir().join("settings.json");
    let installed = std::fs::read_to_string(&path)
        .ok()
        .and_then(|s| serde_json::from_str::<serde_json::Value>(&s).ok())
        .map(|config| setup::is_hook_present(&config["hooks"]["UserPromptSubmit"]))
        .unwrap_or(false);

    if installed {
        ok("boundary hook installed in settings.json", pass);
    } else {
        cprintln!("  {DIM}-{RESET}  boundary hook not installed (run: reseco setup)");
    }
}

fn ok(msg: &str, pass: &mut u32) {
    *pass += 1;
    cprintln!("  {GREEN}✓{RESET}  {msg}");
}

fn err(msg: &str, fail: &mut u32) {
    *fail += 1;
    cprintln!("  {RED}✗{RESET}  {msg}");
}
