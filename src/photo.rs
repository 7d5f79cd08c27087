// Photo preview: which file was picked and whether the preview or the
// "no photo" placeholder is showing. File contents are never read here.

use mime_guess::mime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoPreview {
    pub source: Option<PathBuf>,
    pub preview_visible: bool,
    pub placeholder_visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSelection {
    Shown(PathBuf),
    /// Dialog closed without a file; nothing changes.
    Cancelled,
    Rejected { path: PathBuf, reason: String },
}

impl PhotoPreview {
    /// Initial state. `existing` is the stored photo when editing a record.
    pub fn new(existing: Option<PathBuf>) -> Self {
        match existing {
            Some(path) => PhotoPreview {
                source: Some(path),
                preview_visible: true,
                placeholder_visible: false,
            },
            None => PhotoPreview {
                source: None,
                preview_visible: false,
                placeholder_visible: true,
            },
        }
    }

    pub fn select(&mut self, raw: &str) -> PhotoSelection {
        let raw = raw.trim();
        if raw.is_empty() {
            return PhotoSelection::Cancelled;
        }

        let path = PathBuf::from(raw);
        if let Err(reason) = check_image(&path) {
            tracing::warn!(path = %path.display(), %reason, "photo rejected");
            return PhotoSelection::Rejected { path, reason };
        }

        self.source = Some(path.clone());
        self.preview_visible = true;
        self.placeholder_visible = false;
        PhotoSelection::Shown(path)
    }

    pub fn file_name(&self) -> Option<String> {
        self.source
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// Accept only image files with one of the allowed extensions.
pub fn check_image(path: &Path) -> Result<(), String> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(format!("only {} images are allowed", ALLOWED_EXTENSIONS.join(", ")));
    }

    match mime_guess::from_path(path).first() {
        Some(m) if m.type_() == mime::IMAGE => Ok(()),
        Some(m) => Err(format!("{} is not an image type", m)),
        None => Err("unknown file type".to_string()),
    }
}
