use crate::prune::PruneOpts;

pub fn print_help() {
    println!("reseco {}", env!("CARGO_PKG_VERSION"));
    println!("Prune Claude Code session transcripts — keep the conversation's tail, lose the dead weight.\n");
    print_usage();
    print_options();
}

fn print_usage() {
    println!("USAGE:");
    println!("  reseco prune      [sessionId] [OPTIONS]  Rewrite a transcript in place (backs up first)");
    println!("  reseco boundaries [sessionId]            List cut points without changing anything");
    println!("  reseco sessions                          List this project's session transcripts");
    println!("  reseco restore    [sessionId]            Put the newest backup back");
    println!("  reseco setup                             Install the intent-boundary hook");
    println!("  reseco doctor                            Check configuration");
    println!("  reseco help | --help | -h                Show this message");
    println!("  reseco --version | -V                    Show version\n");
    println!("INTERNAL:");
    println!("  reseco hook                              Append a boundary marker (called by Claude Code)\n");
}

fn print_options() {
    println!("PRUNE OPTIONS:");
    println!("  --keep <n>        Keep the last N assistant turns");
    println!("  --boundary <l>    Cut at line L (as printed by `reseco boundaries`)");
    println!("  --dry-run         Report what would happen, write nothing");
    println!("  --yes             Skip the confirmation prompt");
    println!("  --no-color        Disable colored output (also respects NO_COLOR env)\n");
    println!("BOUNDARIES OPTIONS:");
    println!("  --json            Print the boundary list as JSON\n");
    println!("SESSIONS:");
    println!("  Transcripts live in ~/.claude/projects/<project>/<sessionId>.jsonl. A");
    println!("  sessionId may be a full UUID or a unique prefix and defaults to the most");
    println!("  recent session. Backups land in the sibling prune-backup/ directory.\n");
    println!("ENVIRONMENT:");
    println!("  RESECO_CLAUDE_DIR   Override the Claude directory (default: ~/.claude)");
}

/// First non-flag argument, skipping the values of value-taking flags.
pub fn positional(args: &[String]) -> Option<String> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if matches!(arg.as_str(), "--keep" | "--boundary") {
            skip_next = true;
            continue;
        }
        if !arg.starts_with("--") {
            return Some(arg.clone());
        }
    }
    None
}

pub fn parse_prune_args(args: &[String]) -> PruneOpts {
    let mut opts = PruneOpts {
        session: None,
        keep: None,
        boundary: None,
        dry_run: false,
        yes: false,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--keep" => match args.get(i + 1) {
                // Negative values clamp to zero rather than erroring out.
                Some(s) => match s.parse::<i64>() {
                    Ok(n) => {
                        opts.keep = Some(n.max(0) as u32);
                        i += 1;
                    }
                    Err(_) => eprintln!("reseco: --keep requires a number, got '{s}'"),
                },
                None => eprintln!("reseco: --keep requires a value"),
            },
            "--boundary" => match args.get(i + 1) {
                Some(s) => match s.parse::<u32>() {
                    Ok(n) => {
                        opts.boundary = Some(n);
                        i += 1;
                    }
                    Err(_) => eprintln!("reseco: --boundary requires a line number, got '{s}'"),
                },
                None => eprintln!("reseco: --boundary requires a value"),
            },
            "--dry-run" => opts.dry_run = true,
            "--yes" | "-y" => opts.yes = true,
            other if other.starts_with("--") => {
                eprintln!("reseco: unknown option '{other}'");
            }
            other => {
                if opts.session.is_none() {
                    opts.session = Some(other.to_string());
                }
            }
        }
        i += 1;
    }
    opts
}
