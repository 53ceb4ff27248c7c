//! `zip` — packages the archive manifest (`zip_files`).
//!
//! Each manifest entry collects local glob matches (or remote URLs) and
//! writes one archive; entries run strictly one after another. `zip` is not
//! part of the `build` graph: it reads whatever is in dist and is invoked as
//! its own CLI task.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::fsops;
use super::{Task, TaskId};
use crate::config::{Target, ZipEntry};
use crate::error::TaskError;
use crate::events::Bus;

pub struct Zip {
    bus: Bus,
}

impl Zip {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }

    /// Splits `some/dir/name.zip` into directory and archive name.
    fn split_dist(dist: &str) -> Option<(PathBuf, String)> {
        let path = Path::new(dist);
        let name = path.file_name()?.to_string_lossy().into_owned();
        let parent = path.parent()?;
        if parent.as_os_str().is_empty() {
            return None;
        }
        Some((parent.to_path_buf(), name))
    }

    /// Collects `(archive entry name, bytes)` pairs for one manifest entry.
    async fn collect(&self, target: &Target, entry: &ZipEntry) -> Result<Vec<(String, Vec<u8>)>, TaskError> {
        let mut files = Vec::new();

        if !entry.src_remote.is_empty() {
            let client = reqwest::Client::new();
            for url in &entry.src_remote {
                let name = url.split('/').next_back().unwrap_or_default();
                if name.is_empty() {
                    continue;
                }
                let body = async {
                    client
                        .get(url)
                        .send()
                        .await?
                        .error_for_status()?
                        .bytes()
                        .await
                }
                .await
                .map_err(|source| TaskError::Http {
                    url: url.clone(),
                    source,
                });
                match body {
                    Ok(bytes) => files.push((name.to_string(), bytes.to_vec())),
                    Err(e) => {
                        fsops::report_adapter_error(&self.bus, self.id(), target, &e);
                    }
                }
            }
            return Ok(files);
        }

        for file in fsops::expand_files(&entry.src)? {
            let name = fsops::relative_dest(&file, &entry.src)
                .to_string_lossy()
                .into_owned();
            match tokio::fs::read(&file).await {
                Ok(bytes) => files.push((name, bytes)),
                Err(e) => {
                    fsops::report_adapter_error(
                        &self.bus,
                        self.id(),
                        target,
                        format!("{}: {e}", file.display()),
                    );
                }
            }
        }
        Ok(files)
    }
}

/// Writes the collected files into one archive (blocking I/O).
fn write_archive(archive: &Path, files: Vec<(String, Vec<u8>)>) -> Result<(), TaskError> {
    let out = std::fs::File::create(archive).map_err(|source| TaskError::Io {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut writer = zip::ZipWriter::new(out);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);

    for (name, bytes) in files {
        writer
            .start_file(name.as_str(), options)
            .map_err(|source| TaskError::Archive {
                archive: archive.to_path_buf(),
                source,
            })?;
        writer.write_all(&bytes).map_err(|source| TaskError::Io {
            path: archive.to_path_buf(),
            source,
        })?;
    }
    writer.finish().map_err(|source| TaskError::Archive {
        archive: archive.to_path_buf(),
        source,
    })?;
    Ok(())
}

#[async_trait]
impl Task for Zip {
    fn id(&self) -> TaskId {
        TaskId::Zip
    }

    // Default Fanout::Sequential: archives may overlap across targets.

    fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
        !target.zip_files.is_empty()
    }

    async fn run(&self, target: &Target, _is_dev: bool) -> Result<(), TaskError> {
        for entry in &target.zip_files {
            if (entry.src.is_empty() && entry.src_remote.is_empty()) || entry.dist.is_empty() {
                continue;
            }
            let Some((dir, name)) = Self::split_dist(&entry.dist) else {
                continue;
            };

            let files = self.collect(target, entry).await?;
            let archive = dir.join(name);
            fsops::ensure_parent(&archive).await?;

            tokio::task::spawn_blocking(move || write_archive(&archive, files))
                .await
                .map_err(|e| TaskError::Tool {
                    program: "zip".to_string(),
                    detail: e.to_string(),
                })??;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_dist() {
        let (dir, name) = Zip::split_dist("dist/zip/theme.zip").unwrap();
        assert_eq!(dir, PathBuf::from("dist/zip"));
        assert_eq!(name, "theme.zip");
        assert!(Zip::split_dist("theme.zip").is_none());
    }

    #[tokio::test]
    async fn test_zips_local_globs() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("dist/inc")).unwrap();
        std::fs::write(root.join("dist/readme.txt"), "hi").unwrap();
        std::fs::write(root.join("dist/inc/a.php"), "<?php").unwrap();

        let target = Target {
            zip_files: vec![ZipEntry {
                src: vec![format!("{}/dist/**/*", root.display())],
                src_remote: Vec::new(),
                dist: root.join("pkg/theme.zip").display().to_string(),
            }],
            ..Target::default()
        };
        Zip::new(Bus::default()).run(&target, false).await.unwrap();

        let archive = std::fs::File::open(root.join("pkg/theme.zip")).unwrap();
        let mut archive = zip::ZipArchive::new(archive).unwrap();
        assert_eq!(archive.len(), 2);
        assert!(archive.by_name("readme.txt").is_ok());
        assert!(archive.by_name("inc/a.php").is_ok());
    }

    #[tokio::test]
    async fn test_entries_without_src_or_dist_are_skipped() {
        let target = Target {
            zip_files: vec![ZipEntry::default()],
            ..Target::default()
        };
        Zip::new(Bus::default()).run(&target, false).await.unwrap();
    }
}
