use std::sync::atomic::{AtomicU8, Ordering};

// Color is decided once, lazily: --no-color forces it off before the first
// print; otherwise NO_COLOR and a TTY check settle it.
const COLOR_UNDECIDED: u8 = 0;
const COLOR_ON: u8 = 1;
const COLOR_OFF: u8 = 2;

static COLOR_STATE: AtomicU8 = AtomicU8::new(COLOR_UNDECIDED);

pub(crate) fn disable_color() {
    COLOR_STATE.store(COLOR_OFF, Ordering::Relaxed);
}

pub(crate) fn use_color() -> bool {
    match COLOR_STATE.load(Ordering::Relaxed) {
        COLOR_ON => true,
        COLOR_OFF => false,
        _ => {
            let enabled =
                std::env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stdout);
            COLOR_STATE.store(
                if enabled { COLOR_ON } else { COLOR_OFF },
                Ordering::Relaxed,
            );
            enabled
        }
    }
}

/// Drops every `ESC ... m` sequence. Only the SGR sequences our own
/// constants produce are expected, so anything from ESC to the next `m`
/// goes.
pub(crate) fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find('\x1b') {
        out.push_str(&rest[..start]);
        match rest[start..].find('m') {
            Some(end) => rest = &rest[start + end + 1..],
            None => return out,
        }
    }
    out.push_str(rest);
    out
}

macro_rules! cprintln {
    () => { println!() };
    ($($arg:tt)*) => {
        $crate::fmt::emit(format!($($arg)*))
    };
}
pub(crate) use cprintln;

pub(crate) fn emit(line: String) {
    if use_color() {
        println!("{line}");
    } else {
        println!("{}", strip_ansi(&line));
    }
}

pub(crate) const RESET: &str = "\x1b[0m";
pub(crate) const BOLD: &str = "\x1b[1m";
pub(crate) const DIM: &str = "\x1b[2m";
pub(crate) const CYAN: &str = "\x1b[36m";
pub(crate) const GREEN: &str = "\x1b[32m";
pub(crate) const RED: &str = "\x1b[31m";
pub(crate) const YELLOW: &str = "\x1b[33m";

pub(crate) fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((cutoff, _)) => &id[..cutoff],
        None => id,
    }
}

pub(crate) fn trunc(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

pub(crate) fn format_size(size: u64) -> String {
    match size {
        s if s >= 1_048_576 => format!("{:.1}MB", s as f64 / 1_048_576.0),
        s if s >= 1024 => format!("{}KB", s / 1024),
        s => format!("{s}B"),
    }
}
