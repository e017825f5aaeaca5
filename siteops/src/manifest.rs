use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

pub const MANIFEST_FILE_NAME: &str = "siteops.toml";

/// The full config file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectManifest {
    /// Site root, relative to the manifest directory.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// File that must exist in the root before any page is touched; `""` disables the check.
    #[serde(default = "default_marker")]
    pub marker: Option<PathBuf>,

    /// Where page backups go, relative to the root.
    #[serde(default = "default_backup_dir")]
    pub backup_dir: PathBuf,

    #[serde(default)]
    pub picture: PictureSettings,

    #[serde(default)]
    pub optimize: OptimizeSettings,

    #[serde(default)]
    pub widget: WidgetSettings,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_marker() -> Option<PathBuf> {
    Some(PathBuf::from("index.html"))
}

fn default_backup_dir() -> PathBuf {
    PathBuf::from("html_backups")
}

fn default_pages() -> String {
    String::from("*.html")
}

/// `<img>` → `<picture>` migration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PictureSettings {
    /// Unix style pattern for pages in the root.
    pub pages: String,
    /// Explicit page list; when non-empty `pages` is ignored.
    pub files: Vec<PathBuf>,
    /// Only images whose `src` starts with this are converted.
    pub target_prefix: String,
    /// Sources mentioning any of these hosts are left alone.
    pub placeholder_hosts: Vec<String>,
    /// Attributes carried over to the fallback `<img>`, in output order.
    pub preserved_attributes: Vec<String>,
}

impl Default for PictureSettings {
    fn default() -> Self {
        PictureSettings {
            pages: default_pages(),
            files: Vec::new(),
            target_prefix: String::from("images/kolimg/"),
            placeholder_hosts: vec![String::from("placeholder.com")],
            preserved_attributes: [
                "class", "id", "style", "width", "height", "loading", "title",
                "data-aos", "data-aos-delay", "data-aos-duration",
            ]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Raster → WebP conversion
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizeSettings {
    pub directory: PathBuf,
    /// WebP quality, 0-100.
    pub quality: u8,
    /// Files smaller than this many bytes are not converted.
    pub min_size: u64,
    pub extensions: Vec<String>,
    /// Transparent pixels are composited onto this color.
    pub background: [u8; 3],
}

impl Default for OptimizeSettings {
    fn default() -> Self {
        OptimizeSettings {
            directory: PathBuf::from("images/kolimg"),
            quality: 85,
            min_size: 0,
            extensions: vec![String::from("png"), String::from("jpg"), String::from("jpeg")],
            background: [255, 255, 255],
        }
    }
}

/// Chat widget includes
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetSettings {
    pub pages: String,
    pub stylesheet: String,
    pub script: String,
    /// The widget stylesheet goes right after this one when present.
    pub stylesheet_anchor: String,
    /// The widget script goes right after this one when present.
    pub script_anchor: String,
    pub legacy_button_id: String,
    pub legacy_button_classes: Vec<String>,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        WidgetSettings {
            pages: default_pages(),
            stylesheet: String::from("css/whatsapp-button.css"),
            script: String::from("js/whatsapp-button.js"),
            stylesheet_anchor: String::from("css/chatbot.css"),
            script_anchor: String::from("js/chatbot.js"),
            legacy_button_id: String::from("clbh_phone_div"),
            legacy_button_classes: vec![String::from("phone-call"), String::from("cbh-phone")],
        }
    }
}

impl Default for ProjectManifest {
    fn default() -> Self {
        ProjectManifest {
            root: default_root(),
            marker: default_marker(),
            backup_dir: default_backup_dir(),
            picture: PictureSettings::default(),
            optimize: OptimizeSettings::default(),
            widget: WidgetSettings::default(),
        }
    }
}

pub fn load_project_manifest(path: impl AsRef<Path>) -> Result<ProjectManifest> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| Error::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_project_manifest(&text).map_err(|source| Error::Manifest {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_project_manifest(text: &str) -> std::result::Result<ProjectManifest, toml::de::Error> {
    toml::from_str(text)
}

impl ProjectManifest {
    /// Loads `manifest` if given, else `<root>/siteops.toml` if it exists, else
    /// defaults. The returned manifest has `root` resolved to a usable path;
    /// an explicit `root_override` wins over the manifest's own `root`.
    pub fn resolve(root_override: Option<&Path>, manifest: Option<&Path>) -> Result<ProjectManifest> {
        let search_root = root_override.unwrap_or(Path::new("."));
        let manifest_path = match manifest {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let candidate = search_root.join(MANIFEST_FILE_NAME);
                candidate.is_file().then_some(candidate)
            }
        };
        let mut project = match &manifest_path {
            Some(path) => {
                tracing::debug!("loading manifest {path:?}");
                load_project_manifest(path)?
            }
            None => ProjectManifest::default(),
        };
        project.root = match (root_override, &manifest_path) {
            (Some(root), _) => path_clean::clean(root),
            (None, Some(path)) => {
                let manifest_dir = path.parent().unwrap_or(Path::new("."));
                crate::path_utils::resolve_in(manifest_dir, &project.root)
            }
            (None, None) => path_clean::clean(&project.root),
        };
        project.validate()?;
        Ok(project)
    }

    pub fn validate(&self) -> Result<()> {
        if self.optimize.quality > 100 {
            return Err(Error::Config(format!(
                "optimize.quality must be between 0 and 100, got {}",
                self.optimize.quality
            )))
        }
        if self.picture.target_prefix.trim().is_empty() {
            return Err(Error::Config(String::from("picture.target_prefix must not be empty")))
        }
        if self.optimize.extensions.is_empty() {
            return Err(Error::Config(String::from("optimize.extensions must not be empty")))
        }
        Ok(())
    }

    pub fn backup_dir(&self) -> PathBuf {
        crate::path_utils::resolve_in(&self.root, &self.backup_dir)
    }

    /// Fails with a precondition error when the marker file is missing.
    pub fn check_marker(&self) -> Result<()> {
        let Some(marker) = &self.marker else {
            return Ok(())
        };
        if marker.as_os_str().is_empty() {
            return Ok(())
        }
        let marker_path = self.root.join(marker);
        if marker_path.is_file() {
            return Ok(())
        }
        Err(Error::Precondition(format!(
            "Please run this from the project root directory (the directory containing {}); not found: {}",
            marker.display(),
            marker_path.display(),
        )))
    }
}
