//! Extension-based file type classification.
//!
//! Every file maps to exactly one [`FileType`]. The lookup is a pure function
//! of the lower-cased extension; unknown or missing extensions map to
//! [`FileType::Other`]. Folder names are fixed and relied on by downstream
//! tooling, so they must not change.
//!
//! # Example
//!
//! ```
//! use strataoptima::scanner::FileType;
//! use std::path::Path;
//!
//! assert_eq!(FileType::from_path(Path::new("holiday.JPEG")), FileType::Image);
//! assert_eq!(FileType::from_path(Path::new("notes")), FileType::Other);
//! assert_eq!(FileType::Executable.folder_name(), "Applications");
//! ```

use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "webp", "svg", "ico", "tiff", "tif", "heic", "raw",
];

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v", "mpeg", "mpg", "3gp",
];

const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "wma", "m4a", "opus", "aiff",
];

const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "txt", "rtf", "odt", "ods", "odp", "csv",
    "md",
];

const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "rar", "7z", "tar", "gz", "bz2", "xz", "iso", "dmg"];

const EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "msi", "apk", "app", "deb", "rpm", "bat", "sh", "jar"];

const CODE_EXTENSIONS: &[&str] = &[
    "kt", "java", "py", "js", "ts", "c", "cpp", "h", "cs", "go", "rs", "rb", "php", "swift", "html",
    "css", "sql", "json", "xml", "yaml", "yml",
];

/// Category a file is routed to when organizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Photos and graphics
    Image,
    /// Video files
    Video,
    /// Music and recordings
    Audio,
    /// Office documents, text and spreadsheets
    Document,
    /// Compressed archives and disk images
    Archive,
    /// Installers, packages and scripts
    Executable,
    /// Source code and structured data
    Code,
    /// Everything else
    Other,
}

impl FileType {
    /// All categories, in lookup order.
    pub const ALL: [FileType; 8] = [
        FileType::Image,
        FileType::Video,
        FileType::Audio,
        FileType::Document,
        FileType::Archive,
        FileType::Executable,
        FileType::Code,
        FileType::Other,
    ];

    /// Classify a path by its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .map(|ext| Self::from_extension(&ext.to_string_lossy()))
            .unwrap_or(FileType::Other)
    }

    /// Classify a bare extension (without the leading dot), ignoring case.
    #[must_use]
    pub fn from_extension(extension: &str) -> Self {
        let ext = extension.to_lowercase();
        if ext.is_empty() {
            return FileType::Other;
        }

        Self::ALL
            .into_iter()
            .find(|file_type| file_type.extensions().contains(&ext.as_str()))
            .unwrap_or(FileType::Other)
    }

    /// Name of the folder files of this type are moved into.
    #[must_use]
    pub fn folder_name(self) -> &'static str {
        match self {
            FileType::Image => "Images",
            FileType::Video => "Videos",
            FileType::Audio => "Audio",
            FileType::Document => "Documents",
            FileType::Archive => "Archives",
            FileType::Executable => "Applications",
            FileType::Code => "Code",
            FileType::Other => "Other",
        }
    }

    /// Lower-case extensions belonging to this category.
    ///
    /// [`FileType::Other`] has no extensions of its own.
    #[must_use]
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            FileType::Image => IMAGE_EXTENSIONS,
            FileType::Video => VIDEO_EXTENSIONS,
            FileType::Audio => AUDIO_EXTENSIONS,
            FileType::Document => DOCUMENT_EXTENSIONS,
            FileType::Archive => ARCHIVE_EXTENSIONS,
            FileType::Executable => EXECUTABLE_EXTENSIONS,
            FileType::Code => CODE_EXTENSIONS,
            FileType::Other => &[],
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.folder_name())
    }
}
