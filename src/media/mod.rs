// Media file helpers
//
// Content types for the video containers the dubbing service accepts, and
// the naming scheme for dubbed output files.

use std::path::{Path, PathBuf};

/// Content type declared for files with an unrecognized extension.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

const CONTENT_TYPES: &[(&str, &str)] = &[
    ("mp4", "video/mp4"),
    ("mov", "video/quicktime"),
    ("avi", "video/x-msvideo"),
    ("mkv", "video/x-matroska"),
    ("webm", "video/webm"),
];

/// A local video with the content type inferred from its extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    pub content_type: &'static str,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let content_type = content_type_for(&path);
        Self { path, content_type }
    }

    /// Base name sent as the upload file name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string())
    }
}

/// Map a file extension to its video content type, defaulting to mp4.
pub fn content_type_for(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_CONTENT_TYPE;
    };
    let ext = ext.to_lowercase();
    CONTENT_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, content_type)| *content_type)
        .unwrap_or(DEFAULT_CONTENT_TYPE)
}

/// `dubbed_<job_id>_<target_lang>.mp4`
pub fn dubbed_file_name(job_id: &str, target_lang: &str) -> String {
    format!("dubbed_{}_{}.mp4", job_id, target_lang)
}
