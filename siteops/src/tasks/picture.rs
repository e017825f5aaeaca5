use std::path::Path;

use crate::backup::BackupStore;
use crate::batch::{run_batch, BatchReport, ItemReport};
use crate::document::Document;
use crate::error::Result;
use crate::manifest::{PictureSettings, ProjectManifest};
use crate::picture::{rewrite::webp_file_name, scan_document};
use crate::report::{print_banner, print_summary, rule};

/// Rewrites targeted `<img>` elements in every page of the site.
pub fn update_pictures(manifest: &ProjectManifest) -> Result<BatchReport> {
    manifest.check_marker()?;
    let settings = &manifest.picture;
    print_banner("HTML Auto-Updater for WebP Images", &[
        format!("Directory: {}", manifest.root.display()),
        format!("Target images: {}*", settings.target_prefix),
    ]);
    let pages = super::resolve_pages(&manifest.root, &settings.pages, &settings.files)?;
    if pages.is_empty() {
        println!("No HTML files found!");
        return Ok(BatchReport::default())
    }
    println!("Found {} HTML files\n", pages.len());

    let backups = BackupStore::new(manifest.backup_dir());
    let report = run_batch(&pages, |path| update_page(path, settings, &backups));

    print_summary("UPDATE SUMMARY", &report, &[
        format!("Total images converted: {}", report.converted()),
        format!("Backups created in: {}", backups.dir.display()),
    ]);
    if report.modified() > 0 {
        println!("\nDETAILED CHANGES:");
        println!("{}", rule('-'));
        for (entry, item) in report.modified_entries() {
            println!("\n{}:", entry.name());
            for asset in &item.details {
                println!("  - {asset} -> {}", webp_file_name(asset));
            }
        }
        println!();
    }
    Ok(report)
}

/// One page: scan, and if anything was converted, back up and write.
pub fn update_page(path: &Path, settings: &PictureSettings, backups: &BackupStore) -> Result<ItemReport> {
    let document = Document::load(path)?;
    let outcome = scan_document(&document.source, settings);
    let count = outcome.converted_count();
    let Some(output) = outcome.output else {
        let message = match outcome.already_wrapped {
            0 => String::from("No changes needed"),
            n => format!("No changes needed ({n} already wrapped)"),
        };
        return Ok(ItemReport::skipped(message))
    };
    let backup = document.commit(&output, backups)?;
    tracing::info!("updated {path:?} (backup {backup:?})");
    Ok(ItemReport::modified(format!("Converted {count} images"))
        .with_details(outcome.converted)
        .with_converted(count))
}
