use std::path::Path;

use crate::backup::BackupStore;
use crate::batch::{run_batch, BatchReport, ItemReport};
use crate::document::{parse_page, render_document, Document};
use crate::error::Result;
use crate::html_pass::widget::WidgetPlan;
use crate::manifest::{ProjectManifest, WidgetSettings};
use crate::report::{print_banner, print_summary};

/// Adds the floating widget includes to every page and drops the legacy
/// call button.
pub fn add_widget(manifest: &ProjectManifest) -> Result<BatchReport> {
    manifest.check_marker()?;
    let settings = &manifest.widget;
    print_banner("Widget Installer", &[
        format!("Directory: {}", manifest.root.display()),
        format!("Stylesheet: {}", settings.stylesheet),
        format!("Script: {}", settings.script),
    ]);
    let pages = super::resolve_pages(&manifest.root, &settings.pages, &[])?;
    if pages.is_empty() {
        println!("No HTML files found!");
        return Ok(BatchReport::default())
    }
    println!("Found {} HTML files\n", pages.len());

    let backups = BackupStore::new(manifest.backup_dir());
    let report = run_batch(&pages, |path| update_widget_page(path, settings, &backups));
    print_summary("WIDGET SUMMARY", &report, &[
        format!("Total: {}", report.scanned()),
    ]);
    Ok(report)
}

pub fn update_widget_page(path: &Path, settings: &WidgetSettings, backups: &BackupStore) -> Result<ItemReport> {
    let document = Document::load(path)?;
    let tree = parse_page(&document.source);
    let plan = WidgetPlan::for_document(&tree, settings);
    let has_includes = plan.has_includes();
    let state = tree.widget_pass(&plan);
    if !state.aggregator.is_modified() {
        let message = if has_includes { "Already has includes" } else { "No changes made" };
        return Ok(ItemReport::skipped(message))
    }
    let output = render_document(&state.value, &document.source);
    document.commit(&output, backups)?;
    let details = state.aggregator.changes
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    Ok(ItemReport::modified("Updated").with_details(details))
}
