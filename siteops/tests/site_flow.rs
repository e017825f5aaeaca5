use std::path::Path;

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use siteops::manifest::ProjectManifest;
use siteops::tasks::{optimize::optimize_images, picture::update_pictures, widget::add_widget};
use tempfile::TempDir;

// === Site fixtures ===
fn page(body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"utf-8\">\n    <title>Page</title>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
    )
}

fn site_with_pages(pages: &[(&str, String)]) -> (TempDir, ProjectManifest) {
    let dir = tempfile::tempdir().unwrap();
    for (name, contents) in pages {
        std::fs::write(dir.path().join(name), contents).unwrap();
    }
    let manifest = ProjectManifest::resolve(Some(dir.path()), None).unwrap();
    (dir, manifest)
}

fn backups_in(dir: &Path) -> usize {
    match std::fs::read_dir(dir.join("html_backups")) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

/// Smooth gradient with a little deterministic noise; compresses like a photo.
fn photo_like(width: u32, height: u32) -> RgbImage {
    let mut seed: u32 = 0x2545_f491;
    RgbImage::from_fn(width, height, |x, y| {
        seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let noise = ((seed >> 16) % 24) as i32 - 12;
        let channel = |base: u32| (base as i32 + noise).clamp(0, 255) as u8;
        Rgb([
            channel(x * 255 / width),
            channel(y * 255 / height),
            channel((x + y) * 255 / (width + height)),
        ])
    })
}

// === picture ===
#[test]
fn picture_batch_modifies_matching_pages_only() {
    let with_image = |n: usize| page(&format!(
        "    <img src=\"images/kolimg/team/{n}.jpg\" alt=\"Member {n}\" class=\"rounded\" loading=\"lazy\">"
    ));
    let (dir, manifest) = site_with_pages(&[
        ("index.html", with_image(1)),
        ("about.html", with_image(2)),
        ("services.html", with_image(3)),
        ("partners.html", with_image(4)),
        ("demo-corporate.html", with_image(5)),
        ("contact.html", page("    <p>Call us</p>")),
    ]);

    let report = update_pictures(&manifest).unwrap();
    assert_eq!(report.scanned(), 6);
    assert_eq!(report.modified(), 5);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.converted(), 5);
    assert_eq!(backups_in(dir.path()), 5);

    let about = std::fs::read_to_string(dir.path().join("about.html")).unwrap();
    assert!(about.contains(concat!(
        "<picture>\n",
        "    <source srcset=\"images/kolimg/team/2.webp\" type=\"image/webp\">\n",
        "    <img src=\"images/kolimg/team/2.jpg\" alt=\"Member 2\" class=\"rounded\" loading=\"lazy\">\n",
        "</picture>",
    )));
    let contact = std::fs::read_to_string(dir.path().join("contact.html")).unwrap();
    assert_eq!(contact, page("    <p>Call us</p>"));
}

#[test]
fn picture_batch_is_idempotent_on_disk() {
    let (dir, manifest) = site_with_pages(&[
        ("index.html", page("    <img src=\"images/kolimg/hero.png\" alt=\"Hero\">")),
    ]);
    update_pictures(&manifest).unwrap();
    let first = std::fs::read_to_string(dir.path().join("index.html")).unwrap();

    let report = update_pictures(&manifest).unwrap();
    assert_eq!(report.modified(), 0);
    assert_eq!(report.skipped(), 1);
    assert_eq!(std::fs::read_to_string(dir.path().join("index.html")).unwrap(), first);
    assert_eq!(backups_in(dir.path()), 1);
}

#[test]
fn picture_batch_requires_the_marker_file() {
    let (dir, manifest) = site_with_pages(&[
        ("about.html", page("    <img src=\"images/kolimg/a.png\" alt=\"\">")),
    ]);
    let error = update_pictures(&manifest).unwrap_err();
    assert!(error.is_fatal());
    assert_eq!(backups_in(dir.path()), 0);
}

// === optimize ===
#[test]
fn optimize_converts_only_images_above_the_threshold() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images/kolimg");
    std::fs::create_dir_all(&images).unwrap();
    photo_like(256, 256).save(images.join("hero.png")).unwrap();
    RgbaImage::from_pixel(4, 4, Rgba([0, 128, 0, 0])).save(images.join("dot.png")).unwrap();

    let hero_size = std::fs::metadata(images.join("hero.png")).unwrap().len();
    let dot_size = std::fs::metadata(images.join("dot.png")).unwrap().len();
    assert!(dot_size < hero_size);

    let mut manifest = ProjectManifest::resolve(Some(dir.path()), None).unwrap();
    manifest.optimize.min_size = dot_size + 1;
    let report = optimize_images(&manifest).unwrap();

    assert_eq!(report.modified(), 1);
    assert_eq!(report.failed(), 0);
    assert_eq!(report.excluded, vec![images.join("dot.png")]);
    assert!(images.join("hero.png").exists());
    assert!(!images.join("dot.webp").exists());
    let webp_size = std::fs::metadata(images.join("hero.webp")).unwrap().len();
    assert!(webp_size < hero_size);
    assert_eq!(report.bytes_before(), hero_size);
    assert_eq!(report.bytes_after(), webp_size);
}

#[test]
fn optimize_reports_broken_images_and_continues() {
    let dir = tempfile::tempdir().unwrap();
    let images = dir.path().join("images/kolimg");
    std::fs::create_dir_all(&images).unwrap();
    std::fs::write(images.join("broken.jpg"), b"not a jpeg").unwrap();
    photo_like(32, 32).save(images.join("ok.PNG")).unwrap();

    let manifest = ProjectManifest::resolve(Some(dir.path()), None).unwrap();
    let report = optimize_images(&manifest).unwrap();
    assert_eq!(report.scanned(), 2);
    assert_eq!(report.modified(), 1);
    assert_eq!(report.failed(), 1);
    assert!(images.join("ok.webp").exists());
}

// === widget ===
#[test]
fn widget_batch_adds_includes_and_drops_the_legacy_button() {
    let legacy = concat!(
        "    <div id=\"clbh_phone_div\" class=\"phone-call cbh-phone cbh-green\">\n",
        "        <a href=\"tel:+1\"><div class=\"cbh-ph-circle\"></div></a>\n",
        "    </div>",
    );
    let done = "<!DOCTYPE html>\n<html><head>\n<link rel=\"stylesheet\" href=\"css/whatsapp-button.css\">\n</head><body>\n<script src=\"js/whatsapp-button.js\"></script>\n</body></html>\n";
    let (dir, manifest) = site_with_pages(&[
        ("index.html", page(legacy)),
        ("about.html", page("    <p>About</p>")),
        ("done.html", done.to_owned()),
    ]);

    let report = add_widget(&manifest).unwrap();
    assert_eq!(report.modified(), 2);
    assert_eq!(report.skipped(), 1);
    assert_eq!(report.failed(), 0);
    assert_eq!(backups_in(dir.path()), 2);

    let index = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(!index.contains("clbh_phone_div"));
    assert!(index.contains("<link rel=\"stylesheet\" href=\"css/whatsapp-button.css\">"));
    assert!(index.contains("<script src=\"js/whatsapp-button.js\"></script>"));
    assert_eq!(std::fs::read_to_string(dir.path().join("done.html")).unwrap(), done);

    let again = add_widget(&manifest).unwrap();
    assert_eq!(again.modified(), 0);
}
