use std::path::{Path, PathBuf};

/// Returns the user's home directory as a `PathBuf`.
pub fn home_dir() -> PathBuf {
    PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()))
}

/// Returns the Claude configuration directory, honoring `RESECO_CLAUDE_DIR`.
pub fn claude_dir() -> PathBuf {
    std::env::var("RESECO_CLAUDE_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".claude"))
}

/// Returns `<claude-dir>/projects`.
pub fn projects_dir() -> PathBuf {
    claude_dir().join("projects")
}

/// Claude Code stores each project's transcripts under a directory named
/// after the absolute working directory with every non-alphanumeric byte
/// replaced by `-` (so `/Users/jo/my_app` becomes `-Users-jo-my-app`).
pub fn sanitize_cwd(cwd: &str) -> String {
    cwd.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

/// Returns the project transcript directory for the given working directory.
pub fn project_dir_for(cwd: &str) -> PathBuf {
    projects_dir().join(sanitize_cwd(cwd))
}

/// Returns the project transcript directory for the current working directory.
pub fn current_project_dir() -> PathBuf {
    let cwd = std::env::current_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| ".".into());
    project_dir_for(&cwd)
}

/// Backups live next to the sessions they were taken from.
pub fn backup_dir(project_dir: &Path) -> PathBuf {
    project_dir.join("prune-backup")
}

pub fn shorten_home(path: &str) -> String {
    let h = home_dir();
    let h_str = h.to_string_lossy();
    if !h_str.is_empty() && path.starts_with(h_str.as_ref()) {
        format!("~{}", &path[h_str.len()..])
    } else {
        path.to_string()
    }
}
