use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::path_utils::display_name;

/// What a per-item transform did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemStatus {
    Modified,
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
    pub status: ItemStatus,
    /// Short status text, e.g. `Converted 3 images` or `No changes needed`.
    pub message: String,
    /// Extra lines printed under the status line.
    pub details: Vec<String>,
    /// Elements or images converted by this item.
    pub converted: usize,
    pub bytes_before: u64,
    pub bytes_after: u64,
}

impl ItemReport {
    pub fn modified(message: impl Into<String>) -> Self {
        ItemReport {
            status: ItemStatus::Modified,
            message: message.into(),
            details: Vec::new(),
            converted: 0,
            bytes_before: 0,
            bytes_after: 0,
        }
    }
    pub fn skipped(message: impl Into<String>) -> Self {
        ItemReport { status: ItemStatus::Skipped, ..Self::modified(message) }
    }
    pub fn with_details(mut self, details: Vec<String>) -> Self {
        self.details = details;
        self
    }
    pub fn with_converted(mut self, converted: usize) -> Self {
        self.converted = converted;
        self
    }
    pub fn with_sizes(mut self, before: u64, after: u64) -> Self {
        self.bytes_before = before;
        self.bytes_after = after;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Done(ItemReport),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub path: PathBuf,
    pub outcome: Outcome,
}

impl Entry {
    pub fn name(&self) -> String {
        display_name(&self.path)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub entries: Vec<Entry>,
    /// Items filtered out before processing (e.g. below the size threshold).
    pub excluded: Vec<PathBuf>,
}

impl BatchReport {
    pub fn scanned(&self) -> usize {
        self.entries.len()
    }
    pub fn modified(&self) -> usize {
        self.reports().filter(|x| x.status == ItemStatus::Modified).count()
    }
    pub fn skipped(&self) -> usize {
        self.reports().filter(|x| x.status == ItemStatus::Skipped).count()
    }
    pub fn failed(&self) -> usize {
        self.entries
            .iter()
            .filter(|x| matches!(x.outcome, Outcome::Failed(_)))
            .count()
    }
    pub fn converted(&self) -> usize {
        self.reports().map(|x| x.converted).sum()
    }
    pub fn bytes_before(&self) -> u64 {
        self.reports().map(|x| x.bytes_before).sum()
    }
    pub fn bytes_after(&self) -> u64 {
        self.reports().map(|x| x.bytes_after).sum()
    }
    /// Successful entries that changed something, with their reports.
    pub fn modified_entries(&self) -> impl Iterator<Item = (&Entry, &ItemReport)> {
        self.entries.iter().filter_map(|entry| match &entry.outcome {
            Outcome::Done(report) if report.status == ItemStatus::Modified => Some((entry, report)),
            _ => None,
        })
    }
    fn reports(&self) -> impl Iterator<Item = &ItemReport> {
        self.entries.iter().filter_map(|x| match &x.outcome {
            Outcome::Done(report) => Some(report),
            Outcome::Failed(_) => None,
        })
    }
}

/// Runs `transform` on every item in order and prints one status block per
/// item. An error on one item is reported and the batch moves on.
pub fn run_batch<F>(items: &[PathBuf], mut transform: F) -> BatchReport
where
    F: FnMut(&Path) -> Result<ItemReport>,
{
    let mut report = BatchReport::default();
    let total = items.len();
    for (index, path) in items.iter().enumerate() {
        let name = display_name(path);
        println!("[{}/{total}] Processing: {name}", index + 1);
        let outcome = match transform(path) {
            Ok(item) => {
                crate::report::print_item(&item);
                Outcome::Done(item)
            }
            Err(error) => {
                tracing::warn!("{path:?}: {error}");
                println!("    [ERROR] {error}");
                Outcome::Failed(error.to_string())
            }
        };
        report.entries.push(Entry { path: path.clone(), outcome });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn errors_do_not_stop_the_batch() {
        let items = ["a.html", "b.html", "c.html", "d.html"].map(PathBuf::from).to_vec();
        let report = run_batch(&items, |path| match display_name(path).as_str() {
            "a.html" => Ok(ItemReport::modified("Converted 2 images").with_converted(2)),
            "b.html" => Err(Error::Precondition(String::from("boom"))),
            "c.html" => Ok(ItemReport::skipped("No changes needed")),
            _ => Ok(ItemReport::modified("Converted 1 images").with_converted(1).with_sizes(100, 40)),
        });
        assert_eq!(report.scanned(), 4);
        assert_eq!(report.modified(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.converted(), 3);
        assert_eq!((report.bytes_before(), report.bytes_after()), (100, 40));
        let names = report.modified_entries().map(|(entry, _)| entry.name()).collect::<Vec<_>>();
        assert_eq!(names, vec!["a.html", "d.html"]);
    }
}
