use std::path::{Path, PathBuf};

use crate::batch::{run_batch, BatchReport, ItemReport};
use crate::codec::convert_to_webp;
use crate::error::{Error, Result};
use crate::manifest::{OptimizeSettings, ProjectManifest};
use crate::report::{format_size, print_banner, rule, savings_percent};

/// Converts every raster image in the image directory to WebP.
pub fn optimize_images(manifest: &ProjectManifest) -> Result<BatchReport> {
    let settings = &manifest.optimize;
    let directory = crate::path_utils::resolve_in(&manifest.root, &settings.directory);
    if !directory.is_dir() {
        return Err(Error::Precondition(format!("Image directory not found: {}", directory.display())))
    }
    print_banner("Image Optimization", &[
        format!("Directory: {}", directory.display()),
        format!("WebP Quality: {}", settings.quality),
        format!("Minimum file size: {}", format_size(settings.min_size)),
    ]);
    let patterns = settings.extensions
        .iter()
        .map(|extension| format!("*.{}", extension.trim_start_matches('.')))
        .collect::<Vec<_>>();
    let images = crate::path_utils::resolve_file_patterns(&directory, &patterns, false)?;
    if images.is_empty() {
        println!("No images found in {}", directory.display());
        return Ok(BatchReport::default())
    }
    println!("Found {} images\n", images.len());

    let (selected, excluded) = select_by_size(images, settings.min_size);
    println!(
        "{} images of at least {} will be converted\n",
        selected.len(),
        format_size(settings.min_size),
    );
    if selected.is_empty() {
        println!("No large files to optimize!");
        return Ok(BatchReport { excluded, ..BatchReport::default() })
    }

    let mut report = run_batch(&selected, |path| optimize_image(path, settings));
    report.excluded = excluded;
    print_optimize_summary(&report);
    Ok(report)
}

/// Splits into (at or above `min_size`, below it). Files whose size cannot be
/// read are kept so the error shows up in the batch.
pub fn select_by_size(images: Vec<PathBuf>, min_size: u64) -> (Vec<PathBuf>, Vec<PathBuf>) {
    images.into_iter().partition(|path| {
        std::fs::metadata(path)
            .map(|meta| meta.len() >= min_size)
            .unwrap_or(true)
    })
}

pub fn optimize_image(path: &Path, settings: &OptimizeSettings) -> Result<ItemReport> {
    let conversion = convert_to_webp(path, settings.quality, settings.background)?;
    let savings = savings_percent(conversion.original_size, conversion.webp_size);
    Ok(ItemReport::modified(format!("Saved: {savings:.1}%"))
        .with_details(vec![
            format!("Original: {}", format_size(conversion.original_size)),
            format!("WebP: {}", format_size(conversion.webp_size)),
        ])
        .with_converted(1)
        .with_sizes(conversion.original_size, conversion.webp_size))
}

fn print_optimize_summary(report: &BatchReport) {
    let before = report.bytes_before();
    let after = report.bytes_after();
    println!();
    println!("{}", rule('='));
    println!("OPTIMIZATION SUMMARY");
    println!("{}", rule('='));
    println!("Successfully converted: {}", report.modified());
    println!("Failed: {}", report.failed());
    println!("Excluded (below minimum size): {}", report.excluded.len());
    println!("Original total size: {}", format_size(before));
    println!("WebP total size: {}", format_size(after));
    if before > 0 {
        let saved = before.saturating_sub(after);
        println!("Total savings: {} ({:.1}%)", format_size(saved), savings_percent(before, after));
    }
    println!("{}", rule('='));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_threshold_is_inclusive() {
        let dir = tempfile::tempdir().unwrap();
        let small = dir.path().join("small.png");
        let exact = dir.path().join("exact.png");
        let large = dir.path().join("large.png");
        std::fs::write(&small, vec![0u8; 99]).unwrap();
        std::fs::write(&exact, vec![0u8; 100]).unwrap();
        std::fs::write(&large, vec![0u8; 500]).unwrap();

        let (selected, excluded) = select_by_size(vec![small.clone(), exact.clone(), large.clone()], 100);
        assert_eq!(selected, vec![exact, large]);
        assert_eq!(excluded, vec![small]);
    }

    #[test]
    fn missing_directory_is_a_precondition_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = ProjectManifest::default();
        manifest.root = dir.path().to_path_buf();
        let error = optimize_images(&manifest).unwrap_err();
        assert!(matches!(error, Error::Precondition(_)));
    }
}
