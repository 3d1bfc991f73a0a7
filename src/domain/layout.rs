//! Mapping from files written by the transcoder to their push destinations.

use crate::domain::hls::MASTER_MANIFEST;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use url::Url;

/// Extension of the scratch files the transcoder renames into place.
pub const TRANSIENT_EXTENSION: &str = "tmp";

/// Everything needed to push one written file and its rendition's manifest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WritePlan {
    pub rendition: String,
    pub local_path: PathBuf,
    pub manifest_path: PathBuf,
    pub remote_url: String,
    pub manifest_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WriteKind {
    /// A media chunk: pushed, then deleted locally.
    Segment(WritePlan),
    /// The rendition playlist itself: pushed, never deleted.
    Manifest(WritePlan),
    /// Temporary file written ahead of an atomic rename.
    Transient,
    /// Not something that belongs to a rendition.
    Ignored,
}

#[derive(Clone, Debug)]
pub struct PushLayout {
    base_url: String,
    renditions: HashSet<String>,
}

impl PushLayout {
    /// `base_url` must end with a `/`.
    pub fn new<I, S>(base_url: &Url, renditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            base_url: base_url.to_string(),
            renditions: renditions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn master_url(&self) -> String {
        format!("{}{}", self.base_url, MASTER_MANIFEST)
    }

    pub fn segment_url(&self, rendition: &str, file_name: &str) -> String {
        format!("{}{}/{}", self.base_url, rendition, file_name)
    }

    pub fn manifest_url(&self, rendition: &str) -> String {
        self.segment_url(rendition, &manifest_file_name(rendition))
    }

    pub fn classify(&self, path: &Path) -> WriteKind {
        if path.extension().and_then(|ext| ext.to_str()) == Some(TRANSIENT_EXTENSION) {
            return WriteKind::Transient;
        }

        let file_name = match path.file_name().and_then(|name| name.to_str()) {
            Some(name) => name,
            None => return WriteKind::Ignored,
        };
        let dir = match path.parent() {
            Some(dir) => dir,
            None => return WriteKind::Ignored,
        };
        let rendition = match dir.file_name().and_then(|name| name.to_str()) {
            Some(name) if self.renditions.contains(name) => name,
            _ => return WriteKind::Ignored,
        };

        let manifest_name = manifest_file_name(rendition);
        let plan = WritePlan {
            rendition: rendition.to_string(),
            local_path: path.to_path_buf(),
            manifest_path: dir.join(&manifest_name),
            remote_url: self.segment_url(rendition, file_name),
            manifest_url: self.manifest_url(rendition),
        };

        if file_name == manifest_name {
            WriteKind::Manifest(plan)
        } else {
            WriteKind::Segment(plan)
        }
    }
}

pub fn manifest_file_name(rendition: &str) -> String {
    format!("chunklist{}.m3u8", rendition)
}

/// Drop the userinfo component so a URL can be logged.
pub fn redact(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            let _ = parsed.set_username("");
            let _ = parsed.set_password(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}
