use crate::models::Release;
use colored::*;

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// One line of the interactive version picker: tag, dimmed publish date and
/// markers for the current and locally cached versions.
pub fn release_label(release: &Release, is_current: bool, is_cached: bool) -> String {
    let mut details = format!("  {}", release.display_date());
    if is_current {
        details.push_str(&" (current)".italic().to_string());
    } else if is_cached {
        details.push_str(" (cached)");
    }

    format!("{}{}", release.tag_name, details.dimmed())
}
