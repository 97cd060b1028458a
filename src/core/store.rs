//! Artifact store: a directory of timestamped audio files.
//!
//! All writes are staged into a `tmp/` subdirectory and moved into place
//! with an atomic rename once complete, so [`ArtifactStore::latest`] can
//! never observe a partially written file. Artifacts are immutable once
//! committed and are never deleted by the store itself.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use time::OffsetDateTime;
use uuid::Uuid;

/// Subdirectory for in-progress writes. Ignored by `latest()`.
const STAGING_DIR: &str = "tmp";

/// Audio formats the bridge produces and serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Aiff,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Aiff => "aiff",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Aiff => "audio/aiff",
        }
    }

    /// Recognize a file extension as an audio output format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp3" => Some(AudioFormat::Mp3),
            "aiff" => Some(AudioFormat::Aiff),
            _ => None,
        }
    }

    fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// A completed audio file in the store.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    pub path: PathBuf,
    pub format: AudioFormat,
    pub created_at: SystemTime,
}

/// Directory of synthesized audio artifacts.
///
/// Cheap to clone; every clone points at the same directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Open (and create if missing) the store directory and its staging
    /// subdirectory.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(dir.join(STAGING_DIR))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Unique file stem: timestamp plus a random suffix. Safe across
    /// concurrent requests.
    fn unique_stem() -> String {
        let now = OffsetDateTime::now_utc();
        let suffix = Uuid::new_v4().simple().to_string();
        format!(
            "{:04}{:02}{:02}-{:02}{:02}{:02}_{}",
            now.year(),
            u8::from(now.month()),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
            &suffix[..8],
        )
    }

    /// Reserve a staging path for a new artifact. The file is invisible to
    /// `latest()` until passed to [`ArtifactStore::commit`].
    pub fn stage(&self, format: AudioFormat) -> PathBuf {
        self.dir
            .join(STAGING_DIR)
            .join(format!("{}.{}", Self::unique_stem(), format.extension()))
    }

    /// Move a fully written staged file into the store. The rename is atomic
    /// within the store's filesystem.
    pub fn commit(&self, staged: &Path) -> io::Result<AudioArtifact> {
        let format = AudioFormat::from_path(staged).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not an audio artifact: {}", staged.display()),
            )
        })?;
        let file_name = staged.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("staged path has no file name: {}", staged.display()),
            )
        })?;
        let final_path = self.dir.join(file_name);
        fs::rename(staged, &final_path)?;
        let created_at = fs::metadata(&final_path)?.modified()?;
        Ok(AudioArtifact {
            path: final_path,
            format,
            created_at,
        })
    }

    /// Write `bytes` as a new artifact: staged write, then atomic rename.
    pub fn persist_bytes(&self, bytes: &[u8], format: AudioFormat) -> io::Result<AudioArtifact> {
        let staged = self.stage(format);
        fs::write(&staged, bytes)?;
        self.commit(&staged)
    }

    /// The most recently modified completed artifact, or `None` if the store
    /// holds no audio files. Ties on modification time are broken by file
    /// name, so the result is deterministic per call.
    pub fn latest(&self) -> io::Result<Option<AudioArtifact>> {
        let mut newest: Option<(SystemTime, String, PathBuf, AudioFormat)> = None;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some(format) = AudioFormat::from_path(&path) else {
                continue;
            };
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let modified = metadata.modified()?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let is_newer = match &newest {
                Some((best_time, best_name, _, _)) => {
                    (modified, name.as_str()) > (*best_time, best_name.as_str())
                }
                None => true,
            };
            if is_newer {
                newest = Some((modified, name, path, format));
            }
        }
        Ok(newest.map(|(modified, _, path, format)| AudioArtifact {
            path,
            format,
            created_at: modified,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn open_store() -> (TempDir, ArtifactStore) {
        let tmp = TempDir::new().unwrap();
        let store = ArtifactStore::open(tmp.path().join("audio")).unwrap();
        (tmp, store)
    }

    fn backdate(path: &Path, seconds: u64) {
        let file = fs::OpenOptions::new().write(true).open(path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(seconds))
            .unwrap();
    }

    #[test]
    fn test_open_creates_directories() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested").join("audio");
        let store = ArtifactStore::open(&dir).unwrap();
        assert!(store.dir().is_dir());
        assert!(dir.join(STAGING_DIR).is_dir());
    }

    #[test]
    fn test_latest_empty_store() {
        let (_tmp, store) = open_store();
        assert!(store.latest().unwrap().is_none());
    }

    #[test]
    fn test_persist_then_latest_returns_that_artifact() {
        let (_tmp, store) = open_store();
        let artifact = store.persist_bytes(b"mp3-bytes", AudioFormat::Mp3).unwrap();
        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.path, artifact.path);
        assert_eq!(latest.format, AudioFormat::Mp3);
        assert_eq!(fs::read(&latest.path).unwrap(), b"mp3-bytes");
    }

    #[test]
    fn test_latest_picks_most_recent_of_two() {
        let (_tmp, store) = open_store();
        let first = store.persist_bytes(b"first", AudioFormat::Mp3).unwrap();
        let second = store.persist_bytes(b"second", AudioFormat::Mp3).unwrap();
        backdate(&first.path, 60);
        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.path, second.path);
    }

    #[test]
    fn test_latest_recognizes_aiff() {
        let (_tmp, store) = open_store();
        let artifact = store.persist_bytes(b"aiff-bytes", AudioFormat::Aiff).unwrap();
        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.path, artifact.path);
        assert_eq!(latest.format, AudioFormat::Aiff);
        assert_eq!(latest.format.content_type(), "audio/aiff");
    }

    #[test]
    fn test_latest_ignores_staged_and_foreign_files() {
        let (_tmp, store) = open_store();
        let staged = store.stage(AudioFormat::Mp3);
        fs::write(&staged, b"partial write").unwrap();
        fs::write(store.dir().join("notes.txt"), b"not audio").unwrap();
        assert!(store.latest().unwrap().is_none());
    }

    #[test]
    fn test_commit_makes_staged_file_visible() {
        let (_tmp, store) = open_store();
        let staged = store.stage(AudioFormat::Aiff);
        fs::write(&staged, b"done").unwrap();
        let artifact = store.commit(&staged).unwrap();
        assert!(!staged.exists());
        assert!(artifact.path.exists());
        assert_eq!(store.latest().unwrap().unwrap().path, artifact.path);
    }

    #[test]
    fn test_unique_names() {
        let (_tmp, store) = open_store();
        let a = store.stage(AudioFormat::Mp3);
        let b = store.stage(AudioFormat::Mp3);
        assert_ne!(a, b);
    }

    #[test]
    fn test_mtime_tie_broken_by_name() {
        let (_tmp, store) = open_store();
        let a = store.persist_bytes(b"a", AudioFormat::Mp3).unwrap();
        let b = store.persist_bytes(b"b", AudioFormat::Mp3).unwrap();
        let stamp = SystemTime::now() - Duration::from_secs(5);
        for artifact in [&a, &b] {
            let file = fs::OpenOptions::new()
                .write(true)
                .open(&artifact.path)
                .unwrap();
            file.set_modified(stamp).unwrap();
        }
        let expected = std::cmp::max(
            a.path.file_name().unwrap().to_str().unwrap(),
            b.path.file_name().unwrap().to_str().unwrap(),
        );
        let latest = store.latest().unwrap().unwrap();
        assert_eq!(latest.path.file_name().unwrap().to_str().unwrap(), expected);
    }
}
