use crate::fmt::{cprintln, DIM, GREEN, RESET};
use crate::models;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use uuid::Uuid;

pub struct SessionFile {
    pub path: PathBuf,
    pub id: String,
    pub modified: SystemTime,
    pub size: u64,
}

/// Session transcripts of a project directory, newest first. The
/// `prune-backup` subdirectory is not scanned.
pub fn list_sessions(project_dir: &Path) -> Result<Vec<SessionFile>> {
    let entries = std::fs::read_dir(project_dir)
        .with_context(|| format!("reading {}", project_dir.display()))?;

    let mut sessions: Vec<SessionFile> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().into_string().ok()?;
            let id = name.strip_suffix(".jsonl")?.to_string();
            let meta = e.metadata().ok()?;
            if !meta.is_file() {
                return None;
            }
            Some(SessionFile {
                path: e.path(),
                id,
                modified: meta.modified().ok()?,
                size: meta.len(),
            })
        })
        .collect();

    sessions.sort_by(|a, b| b.modified.cmp(&a.modified));
    Ok(sessions)
}

/// Resolves a session argument to a transcript path. A full UUID goes
/// straight to its file; anything else is matched as an id prefix; no
/// argument picks the most recently modified session.
pub fn resolve_session(project_dir: &Path, arg: Option<&str>) -> Result<PathBuf> {
    let short_dir = models::shorten_home(&project_dir.to_string_lossy());

    let Some(wanted) = arg else {
        let sessions = list_sessions(project_dir)
            .with_context(|| format!("no project sessions at {short_dir}"))?;
        return match sessions.into_iter().next() {
            Some(s) => Ok(s.path),
            None => bail!("no sessions found in {short_dir}"),
        };
    };

    if Uuid::parse_str(wanted).is_ok() {
        let path = project_dir.join(format!("{wanted}.jsonl"));
        if !path.exists() {
            bail!("session {wanted} not found in {short_dir}");
        }
        return Ok(path);
    }

    let mut matches: Vec<SessionFile> = list_sessions(project_dir)
        .with_context(|| format!("no project sessions at {short_dir}"))?
        .into_iter()
        .filter(|s| s.id.starts_with(wanted))
        .collect();

    match matches.len() {
        0 => bail!("no session matching '{wanted}' in {short_dir}"),
        1 => Ok(matches.remove(0).path),
        n => bail!("'{wanted}' is ambiguous ({n} sessions match) — use more characters"),
    }
}

/// Reads a transcript into the line list the pruning engine works on:
/// split on CR/LF with empty lines removed.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(content
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(String::from)
        .collect())
}

/// Writes the pruned line list back: newline-joined with a single trailing
/// newline.
pub fn write_transcript(path: &Path, lines: &[String]) -> Result<()> {
    let mut body = lines.join("\n");
    body.push('\n');
    std::fs::write(path, body).with_context(|| format!("writing {}", path.display()))
}

/// Copies the transcript into `prune-backup/<name>.<unix-ms>` beside it.
pub fn backup(path: &Path) -> Result<PathBuf> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let dir = models::backup_dir(parent);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating backup directory {}", dir.display()))?;

    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("session.jsonl");
    let stamped = format!("{name}.{}", chrono::Utc::now().timestamp_millis());
    let target = dir.join(stamped);

    std::fs::copy(path, &target)
        .with_context(|| format!("backing up to {}", target.display()))?;
    Ok(target)
}

/// Most recent backup for a session, by the millisecond suffix in its name.
pub fn latest_backup(project_dir: &Path, session_name: &str) -> Option<PathBuf> {
    let dir = models::backup_dir(project_dir);
    let prefix = format!("{session_name}.");

    std::fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().into_string().ok()?;
            let ts: u64 = name.strip_prefix(&prefix)?.parse().ok()?;
            Some((e.path(), ts))
        })
        .max_by_key(|(_, ts)| *ts)
        .map(|(path, _)| path)
}

/// The `restore` subcommand: put the newest backup back over the live
/// transcript.
pub fn restore(arg: Option<&str>) -> Result<()> {
    let project_dir = models::current_project_dir();
    let path = resolve_session(&project_dir, arg)?;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let Some(backup_path) = latest_backup(&project_dir, &name) else {
        bail!(
            "no backups for {name} in {}",
            models::shorten_home(&models::backup_dir(&project_dir).to_string_lossy())
        );
    };

    std::fs::copy(&backup_path, &path)
        .with_context(|| format!("restoring {}", path.display()))?;

    cprintln!(
        "{GREEN}✓{RESET} restored {DIM}{}{RESET} from {DIM}{}{RESET}",
        models::shorten_home(&path.to_string_lossy()),
        models::shorten_home(&backup_path.to_string_lossy())
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path, content: &str) {
        fs::write(path, content).unwrap();
    }

    #[test]
    fn read_lines_strips_blank_and_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        touch(&path, "{\"a\":1}\r\n\r\n{\"b\":2}\n\n{\"c\":3}");

        let lines = read_lines(&path).unwrap();
        assert_eq!(lines, vec!["{\"a\":1}", "{\"b\":2}", "{\"c\":3}"]);
    }

    #[test]
    fn write_transcript_joins_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.jsonl");
        write_transcript(&path, &["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\n");
    }

    #[test]
    fn backup_lands_in_prune_backup_with_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abc.jsonl");
        touch(&path, "content\n");

        let target = backup(&path).unwrap();
        assert!(target.parent().unwrap().ends_with("prune-backup"));
        let name = target.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("abc.jsonl."));
        assert!(name
            .strip_prefix("abc.jsonl.")
            .unwrap()
            .parse::<u64>()
            .is_ok());
        assert_eq!(fs::read_to_string(&target).unwrap(), "content\n");
    }

    #[test]
    fn latest_backup_picks_highest_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let backups = models::backup_dir(dir.path());
        fs::create_dir_all(&backups).unwrap();
        touch(&backups.join("abc.jsonl.100"), "old");
        touch(&backups.join("abc.jsonl.200"), "new");
        touch(&backups.join("other.jsonl.300"), "other session");

        let latest = latest_backup(dir.path(), "abc.jsonl").unwrap();
        assert!(latest.ends_with("abc.jsonl.200"));
    }

    #[test]
    fn latest_backup_none_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(latest_backup(dir.path(), "abc.jsonl").is_none());
    }

    #[test]
    fn resolve_session_by_full_uuid() {
        let dir = tempfile::tempdir().unwrap();
        let id = "2f6c0d55-15a7-4f1e-9c61-000000000001";
        touch(&dir.path().join(format!("{id}.jsonl")), "{}\n");

        let path = resolve_session(dir.path(), Some(id)).unwrap();
        assert!(path.ends_with(format!("{id}.jsonl")));
    }

    #[test]
    fn resolve_session_missing_uuid_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_session(
            dir.path(),
            Some("2f6c0d55-15a7-4f1e-9c61-000000000001"),
        );
        assert!(err.is_err());
    }

    #[test]
    fn resolve_session_by_prefix() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("abc123.jsonl"), "{}\n");
        touch(&dir.path().join("def456.jsonl"), "{}\n");

        let path = resolve_session(dir.path(), Some("abc")).unwrap();
        assert!(path.ends_with("abc123.jsonl"));
    }

    #[test]
    fn resolve_session_ambiguous_prefix_errors() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("abc1.jsonl"), "{}\n");
        touch(&dir.path().join("abc2.jsonl"), "{}\n");

        assert!(resolve_session(dir.path(), Some("abc")).is_err());
    }

    #[test]
    fn resolve_session_defaults_to_most_recent() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("old.jsonl");
        let new = dir.path().join("new.jsonl");
        touch(&old, "{}\n");
        touch(&new, "{}\n");

        filetime::set_file_mtime(&old, filetime::FileTime::from_unix_time(1_000, 0)).unwrap();
        filetime::set_file_mtime(&new, filetime::FileTime::from_unix_time(2_000, 0)).unwrap();

        let path = resolve_session(dir.path(), None).unwrap();
        assert!(path.ends_with("new.jsonl"));
    }

    #[test]
    fn resolve_session_empty_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_session(dir.path(), None).is_err());
    }

    #[test]
    fn list_sessions_skips_backup_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("abc.jsonl"), "{}\n");
        let backups = models::backup_dir(dir.path());
        fs::create_dir_all(&backups).unwrap();
        touch(&backups.join("abc.jsonl.100"), "{}\n");

        let sessions = list_sessions(dir.path()).unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].id, "abc");
    }
}
