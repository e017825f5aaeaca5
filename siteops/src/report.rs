use crate::batch::{BatchReport, ItemReport, ItemStatus};

pub const RULE_WIDTH: usize = 60;

pub fn rule(ch: char) -> String {
    std::iter::repeat(ch).take(RULE_WIDTH).collect()
}

pub fn print_banner(title: &str, lines: &[String]) {
    println!("{title}");
    println!("{}", rule('='));
    for line in lines {
        println!("{line}");
    }
    println!("{}", rule('='));
    println!();
}

pub fn print_item(item: &ItemReport) {
    let tag = match item.status {
        ItemStatus::Modified => "OK",
        ItemStatus::Skipped => "SKIP",
    };
    println!("    [{tag}] {}", item.message);
    for detail in &item.details {
        println!("       -> {detail}");
    }
}

/// Counts shared by every task.
pub fn print_summary(title: &str, report: &BatchReport, extra: &[String]) {
    println!();
    println!("{}", rule('='));
    println!("{title}");
    println!("{}", rule('='));
    println!("Files processed: {}", report.scanned());
    println!("Files modified:  {}", report.modified());
    println!("Files skipped:   {}", report.skipped());
    println!("Errors:          {}", report.failed());
    for line in extra {
        println!("{line}");
    }
    println!("{}", rule('='));
}

/// `1536` → `1.5KB`
pub fn format_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    for unit in ["B", "KB", "MB", "GB"] {
        if value < 1024.0 {
            return format!("{value:.1}{unit}")
        }
        value /= 1024.0;
    }
    format!("{value:.1}TB")
}

/// Percentage saved going from `before` to `after`; 0 for empty input.
pub fn savings_percent(before: u64, after: u64) -> f64 {
    if before == 0 {
        return 0.0
    }
    (before as f64 - after as f64) / before as f64 * 100.0
}
