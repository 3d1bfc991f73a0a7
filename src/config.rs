//! Configuration for a push session: origin credentials, source, encoder
//! settings and the rendition ladder.

use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// One output quality tier of the stream.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct Rendition {
    /// Used as the subdirectory name and as the URL path segment
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub video_bitrate: u64,
    pub video_profile: String,
    pub audio_bitrate: u64,
    pub audio_sample_rate: u32,
}

impl Rendition {
    /// Advertised bandwidth in the master manifest.
    pub fn bandwidth(&self) -> u64 {
        self.video_bitrate + self.audio_bitrate
    }

    /// File name the transcoder uses for this rendition's playlist.
    pub fn manifest_name(&self) -> String {
        format!("chunklist{}.m3u8", self.name)
    }
}

/// Which push host the pipeline targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushHost {
    Primary,
    Backup,
}

/// Settings for a push session, loaded once at startup.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Configuration {
    /// Path of the transcoder binary
    #[serde(rename = "FFmpeg", alias = "Ffmpeg")]
    pub ffmpeg: String,
    pub shortname: String,
    pub username: String,
    pub slot_name: String,
    pub subdir: String,
    pub password: String,
    pub primary_host: String,
    pub backup_host: String,
    pub source_file: String,
    pub video_codec: String,
    pub video_framerate: u32,
    #[serde(rename = "GOPSize", alias = "GopSize")]
    pub gop_size: u32,
    /// Target segment duration in seconds
    pub segment_size: u32,
    pub audio_codec: String,
    #[serde(rename = "CRF", alias = "Crf")]
    pub crf: u32,
    #[serde(rename = "FFmpegLogLevel", alias = "FfmpegLogLevel")]
    pub ffmpeg_log_level: String,
    #[serde(rename = "HLSListSize", alias = "HlsListSize")]
    pub hls_list_size: u32,
    pub renditions: Vec<Rendition>,
    /// Upper bound on in-flight event uploads. Unbounded when absent.
    pub max_concurrent_uploads: Option<usize>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            ffmpeg: String::from("ffmpeg"),
            shortname: String::new(),
            username: String::new(),
            slot_name: String::new(),
            subdir: String::new(),
            password: String::new(),
            primary_host: String::new(),
            backup_host: String::new(),
            source_file: String::new(),
            video_codec: String::from("h264"),
            video_framerate: 30,
            gop_size: 30,
            segment_size: 4,
            audio_codec: String::from("aac"),
            crf: 30,
            ffmpeg_log_level: String::new(),
            hls_list_size: 60,
            renditions: Vec::new(),
            max_concurrent_uploads: None,
        }
    }
}

fn rendition_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid rendition name regex"))
}

impl Configuration {
    /// Load configuration from a JSON file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Check everything the pipeline relies on before any side effect happens.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("FFmpeg", &self.ffmpeg),
            ("Shortname", &self.shortname),
            ("SlotName", &self.slot_name),
            ("Subdir", &self.subdir),
            ("PrimaryHost", &self.primary_host),
            ("SourceFile", &self.source_file),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", key)));
            }
        }

        if self.renditions.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one rendition is required".to_string(),
            ));
        }

        if self.max_concurrent_uploads == Some(0) {
            return Err(ConfigError::Invalid(
                "MaxConcurrentUploads must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for rendition in &self.renditions {
            if !rendition_name_pattern().is_match(&rendition.name) {
                return Err(ConfigError::Invalid(format!(
                    "rendition name {:?} must match [A-Za-z0-9_-]+",
                    rendition.name
                )));
            }
            if !seen.insert(rendition.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate rendition name {:?}",
                    rendition.name
                )));
            }
            if rendition.width == 0 || rendition.height == 0 {
                return Err(ConfigError::Invalid(format!(
                    "rendition {} has an empty resolution",
                    rendition.name
                )));
            }
            if rendition.video_bitrate == 0 || rendition.audio_bitrate == 0 {
                return Err(ConfigError::Invalid(format!(
                    "rendition {} needs positive video and audio bitrates",
                    rendition.name
                )));
            }
        }

        Ok(())
    }

    /// Base URL every upload is placed under, with the credentials in the
    /// userinfo component. Always ends with a `/`.
    pub fn push_base_url(&self, host: PushHost) -> Result<Url, ConfigError> {
        let hostname = match host {
            PushHost::Primary => &self.primary_host,
            PushHost::Backup => &self.backup_host,
        };
        if hostname.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "no hostname configured for the {:?} push host",
                host
            )));
        }

        let raw = format!(
            "https://{}/push/{}/{}/{}/",
            hostname, self.shortname, self.slot_name, self.subdir
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| ConfigError::Invalid(format!("push URL {}: {}", raw, e)))?;
        url.set_username(&self.username)
            .and_then(|_| url.set_password(Some(&self.password)))
            .map_err(|_| ConfigError::Invalid(format!("push URL {} cannot carry credentials", raw)))?;
        Ok(url)
    }

    /// Public playback URL of the master manifest.
    pub fn playback_url(&self) -> String {
        format!(
            "https://{}-livepush.video.llnw.net/{}/{}/chunklist.m3u8",
            self.shortname, self.slot_name, self.subdir
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_config() -> Configuration {
        Configuration::from_json(
            r#"{
                "FFmpeg": "/usr/bin/ffmpeg",
                "Shortname": "acme",
                "Username": "user",
                "Password": "secret",
                "SlotName": "live1",
                "Subdir": "main",
                "PrimaryHost": "acme-push.example.net",
                "BackupHost": "acme-backup.example.net",
                "SourceFile": "source.mp4",
                "Renditions": [
                    {"Name": "720p", "Width": 1280, "Height": 720, "VideoBitrate": 2500000,
                     "VideoProfile": "main", "AudioBitrate": 128000, "AudioSampleRate": 48000},
                    {"Name": "360p", "Width": 640, "Height": 360, "VideoBitrate": 800000,
                     "VideoProfile": "baseline", "AudioBitrate": 64000, "AudioSampleRate": 44100}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = sample_config();
        assert_eq!(config.ffmpeg, "/usr/bin/ffmpeg");
        assert_eq!(config.video_codec, "h264");
        assert_eq!(config.video_framerate, 30);
        assert_eq!(config.gop_size, 30);
        assert_eq!(config.segment_size, 4);
        assert_eq!(config.audio_codec, "aac");
        assert_eq!(config.crf, 30);
        assert_eq!(config.hls_list_size, 60);
        assert!(config.ffmpeg_log_level.is_empty());
        assert_eq!(config.max_concurrent_uploads, None);
        assert_eq!(config.renditions.len(), 2);
        assert_eq!(config.renditions[1].name, "360p");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_acronym_keys_are_read() {
        let config = Configuration::from_json(
            r#"{"GOPSize": 48, "CRF": 23, "HLSListSize": 6, "FFmpegLogLevel": "warning"}"#,
        )
        .unwrap();
        assert_eq!(config.gop_size, 48);
        assert_eq!(config.crf, 23);
        assert_eq!(config.hls_list_size, 6);
        assert_eq!(config.ffmpeg_log_level, "warning");
        assert_eq!(config.ffmpeg, "ffmpeg");
    }

    #[test]
    fn test_load_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Configuration::load(&missing),
            Err(ConfigError::Read { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(
            Configuration::load(&broken),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_renditions() {
        let mut config = sample_config();
        config.renditions.clear();
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.renditions[1].name = "720p".to_string();
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.renditions[0].name = "../up".to_string();
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.renditions[0].height = 0;
        assert!(config.validate().is_err());

        let mut config = sample_config();
        config.max_concurrent_uploads = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_push_base_url_embeds_credentials() {
        let mut config = sample_config();
        config.password = "p@ss word".to_string();

        let url = config.push_base_url(PushHost::Primary).unwrap();
        assert_eq!(url.username(), "user");
        assert_eq!(url.password(), Some("p%40ss%20word"));
        assert_eq!(url.host_str(), Some("acme-push.example.net"));
        assert_eq!(url.path(), "/push/acme/live1/main/");

        let backup = config.push_base_url(PushHost::Backup).unwrap();
        assert_eq!(backup.host_str(), Some("acme-backup.example.net"));

        config.backup_host.clear();
        assert!(config.push_base_url(PushHost::Backup).is_err());
    }

    #[test]
    fn test_playback_url() {
        let config = Configuration::from_json(
            r#"{"Shortname": "acme", "SlotName": "live1", "Subdir": "main"}"#,
        )
        .unwrap();
        assert_eq!(
            config.playback_url(),
            "https://acme-livepush.video.llnw.net/live1/main/chunklist.m3u8"
        );
    }
}
