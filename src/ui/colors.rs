use colored::Colorize;

use crate::git::DiffStats;

/// Success line (green ✓)
pub fn success(msg: &str, colored: bool) {
    if colored {
        println!("{} {}", "✓".green().bold(), msg.green());
    } else {
        println!("✓ {}", msg);
    }
}

/// Error line on stderr (red ✗)
pub fn error(msg: &str, colored: bool) {
    if colored {
        eprintln!("{} {}", "✗".red().bold(), msg.red());
    } else {
        eprintln!("✗ {}", msg);
    }
}

/// Warning line on stderr (yellow ⚠)
pub fn warning(msg: &str, colored: bool) {
    if colored {
        eprintln!("{} {}", "⚠".yellow().bold(), msg.yellow());
    } else {
        eprintln!("⚠ {}", msg);
    }
}

/// Info text (blue ℹ), returned for the caller to place
pub fn info(msg: &str, colored: bool) -> String {
    if colored {
        format!("{} {}", "ℹ".blue().bold(), msg.blue())
    } else {
        format!("ℹ {}", msg)
    }
}

/// Step marker (dim), on stderr so stdout carries only the message
pub fn step(step: &str, msg: &str, colored: bool) {
    eprintln!("{}", step_line(step, msg, colored));
}

pub fn step_line(step: &str, msg: &str, colored: bool) -> String {
    if colored {
        format!(
            "{} {}",
            format!("[{}]", step).bright_black().bold(),
            msg.bright_black()
        )
    } else {
        format!("[{}] {}", step, msg)
    }
}

/// The proposed commit message, set off from the surrounding output
pub fn commit_message(message: &str, colored: bool) -> String {
    if colored {
        format!("\n  {}\n", message.bold())
    } else {
        format!("\n  {}\n", message)
    }
}

fn plural(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("1 {}", singular)
    } else {
        format!("{} {}", count, plural)
    }
}

/// `git diff --stat` style one-line summary
pub fn format_diff_stats(stats: &DiffStats, colored: bool) -> String {
    let files = plural(stats.files_changed.len(), "file", "files");
    let insertions = plural(stats.insertions, "insertion(+)", "insertions(+)");
    let deletions = plural(stats.deletions, "deletion(-)", "deletions(-)");

    if colored {
        format!(
            "{} changed, {}, {}",
            files.bold(),
            insertions.green(),
            deletions.red()
        )
    } else {
        format!("{} changed, {}, {}", files, insertions, deletions)
    }
}
