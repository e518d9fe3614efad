use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Technical properties of a video or subtitle stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaProperties {
    /// Frames per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl MediaProperties {
    pub fn is_empty(&self) -> bool {
        self.frame_rate.is_none() && self.duration_secs.is_none()
    }
}

/// A local file to be matched.
///
/// `properties` may be filled in by the caller. When it is `None`, metrics
/// ask the session's property cache instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFile {
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<MediaProperties>,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            properties: None,
        }
    }

    pub fn with_properties(mut self, properties: MediaProperties) -> Self {
        self.properties = Some(properties);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name without a known media extension.
    pub fn stem(&self) -> &str {
        let name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        musubi_parse::tokenizer::strip_extension(name).0
    }

    /// Name of the directory holding the file.
    pub fn folder(&self) -> Option<&str> {
        self.path.parent()?.file_name()?.to_str()
    }
}

/// A subtitle offered by a catalog, described by name and optional
/// stream properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<f64>,
}

impl SubtitleDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            language: None,
            frame_rate: None,
            duration_secs: None,
        }
    }

    pub fn properties(&self) -> MediaProperties {
        MediaProperties {
            frame_rate: self.frame_rate,
            duration_secs: self.duration_secs,
        }
    }
}
