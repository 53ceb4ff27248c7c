//! `correct_line_endings` — normalizes CRLF line endings to LF for files
//! produced on non-UNIX systems.
//!
//! In dev/watch mode files whose destination is already up to date are
//! skipped, like the copy task.

use std::path::Path;

use async_trait::async_trait;

use super::fsops;
use super::{Fanout, Task, TaskId};
use crate::config::Target;
use crate::error::TaskError;
use crate::events::Bus;

pub struct CorrectLineEndings {
    bus: Bus,
}

impl CorrectLineEndings {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Task for CorrectLineEndings {
    fn id(&self) -> TaskId {
        TaskId::CorrectLineEndings
    }

    fn fanout(&self) -> Fanout {
        Fanout::Parallel
    }

    fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
        !target.correct_line_endings_files_src.is_empty()
            && !target.correct_line_endings_files_dist.is_empty()
    }

    async fn run(&self, target: &Target, is_dev: bool) -> Result<(), TaskError> {
        let dist = Path::new(&target.correct_line_endings_files_dist);
        for file in fsops::expand_files(&target.correct_line_endings_files_src)? {
            let dest = dist.join(fsops::relative_dest(
                &file,
                &target.correct_line_endings_files_src,
            ));
            if is_dev && fsops::is_up_to_date(&file, &dest) {
                continue;
            }

            match tokio::fs::read_to_string(&file).await {
                Ok(content) => {
                    let normalized = content.replace("\r\n", "\n");
                    fsops::ensure_parent(&dest).await?;
                    tokio::fs::write(&dest, normalized)
                        .await
                        .map_err(|source| TaskError::Io {
                            path: dest.clone(),
                            source,
                        })?;
                }
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
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_normalizes_crlf() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.php"), "line1\r\nline2\r\n").unwrap();

        let target = Target {
            correct_line_endings_files_src: vec![format!("{}/*.php", root.display())],
            correct_line_endings_files_dist: root.join("out").display().to_string(),
            ..Target::default()
        };
        CorrectLineEndings::new(Bus::default())
            .run(&target, false)
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(root.join("out/a.php")).unwrap(),
            "line1\nline2\n"
        );
    }

    #[tokio::test]
    async fn test_dev_mode_skips_up_to_date_destination() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("a.php"), "new\r\n").unwrap();
        // Destination written after the source, so it counts as up to date.
        std::fs::create_dir(root.join("out")).unwrap();
        std::fs::write(root.join("out/a.php"), "untouched").unwrap();

        let target = Target {
            correct_line_endings_files_src: vec![format!("{}/*.php", root.display())],
            correct_line_endings_files_dist: root.join("out").display().to_string(),
            ..Target::default()
        };
        let task = CorrectLineEndings::new(Bus::default());

        task.run(&target, true).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(root.join("out/a.php")).unwrap(),
            "untouched"
        );

        // Outside dev mode the destination is rewritten.
        task.run(&target, false).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(root.join("out/a.php")).unwrap(),
            "new\n"
        );
    }
}
