use crate::{models, view};
use anyhow::Result;
use std::path::Path;

const HOOK_COMMAND: &str = "reseco hook";

pub fn run() -> Result<()> {
    println!("\nreseco setup\n");

    let claude_dir = models::claude_dir();
    if claude_dir.exists() {
        println!("  Claude Code detected ✓");
    } else {
        println!(
            "  Claude Code not detected ({} missing) — continuing anyway.",
            models::shorten_home(&claude_dir.to_string_lossy())
        );
    }
    println!();
    println!("  Installs a UserPromptSubmit hook in ~/.claude/settings.json so every");
    println!("  prompt drops an intent boundary into the session transcript.");

    if !view::prompt_yn("Configure Claude Code?", true)? {
        println!("\n  Nothing changed.\n");
        return Ok(());
    }

    install_hook()?;

    println!("\n  Done.\n");
    println!("  After your next session, list cut points with:");
    println!("    reseco boundaries\n");
    Ok(())
}

fn install_hook() -> Result<()> {
    let path = models::claude_dir().join("settings.json");
    let mut config = read_json_or_empty(&path);

    if is_hook_present(&config["hooks"]["UserPromptSubmit"]) {
        println!("      hook already installed ✓");
        return Ok(());
    }

    let entry = serde_json::json!({
        "hooks": [{ "type": "command", "command": HOOK_COMMAND }]
    });
    if !config["hooks"].is_object() {
        config["hooks"] = serde_json::json!({});
    }
    match config["hooks"]["UserPromptSubmit"].as_array_mut() {
        Some(existing) => existing.push(entry),
        None => config["hooks"]["UserPromptSubmit"] = serde_json::json!([entry]),
    }

    write_json(&path, &config)?;
    println!("      ✓ {}", models::shorten_home(&path.to_string_lossy()));
    Ok(())
}

pub(crate) fn is_hook_present(user_prompt_submit: &serde_json::Value) -> bool {
    user_prompt_submit
        .as_array()
        .map(|arr| {
            arr.iter().any(|h| {
                h["hooks"]
                    .as_array()
                    .map(|hooks| {
                        hooks
                            .iter()
                            .any(|x| x["command"].as_str() == Some(HOOK_COMMAND))
                    })
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

fn read_json_or_empty(path: &Path) -> serde_json::Value {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(serde_json::json!({}))
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(value)? + "\n")?;
    Ok(())
}
