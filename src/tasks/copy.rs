//! `copy` — copies everything matching `copy_files_src` into
//! `copy_files_dist`, preserving the path relative to the glob base.
//!
//! In dev/watch mode files whose destination is already up to date are
//! skipped, so watch rebuilds only touch what changed.

use std::path::Path;

use async_trait::async_trait;

use super::fsops;
use super::{Fanout, Task, TaskId};
use crate::config::Target;
use crate::error::TaskError;
use crate::events::Bus;

pub struct Copy {
    bus: Bus,
}

impl Copy {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Task for Copy {
    fn id(&self) -> TaskId {
        TaskId::Copy
    }

    fn fanout(&self) -> Fanout {
        // Targets copy into disjoint dist trees.
        Fanout::Parallel
    }

    fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
        !target.copy_files_src.is_empty() && !target.copy_files_dist.is_empty()
    }

    async fn run(&self, target: &Target, is_dev: bool) -> Result<(), TaskError> {
        let dist = Path::new(&target.copy_files_dist);
        for file in fsops::expand_files(&target.copy_files_src)? {
            let dest = dist.join(fsops::relative_dest(&file, &target.copy_files_src));
            if is_dev && fsops::is_up_to_date(&file, &dest) {
                continue;
            }
            fsops::ensure_parent(&dest).await?;
            if let Err(e) = tokio::fs::copy(&file, &dest).await {
                fsops::report_adapter_error(
                    &self.bus,
                    self.id(),
                    target,
                    format!("{}: {e}", file.display()),
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_src_and_dist() {
        let copy = Copy::new(Bus::default());
        assert!(!copy.is_allowed(&Target::default(), false));
        assert!(!copy.is_allowed(
            &Target {
                copy_files_src: vec!["a/*".into()],
                ..Target::default()
            },
            false
        ));
        assert!(copy.is_allowed(
            &Target {
                copy_files_src: vec!["a/*".into()],
                copy_files_dist: "out".into(),
                ..Target::default()
            },
            false
        ));
    }

    #[tokio::test]
    async fn test_copies_relative_to_glob_base() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/inc")).unwrap();
        std::fs::write(root.join("src/inc/a.php"), "<?php").unwrap();

        let target = Target {
            copy_files_src: vec![format!("{}/src/**/*", root.display())],
            copy_files_dist: root.join("out").display().to_string(),
            ..Target::default()
        };
        Copy::new(Bus::default()).run(&target, false).await.unwrap();
        assert_eq!(
            std::fs::read_to_string(root.join("out/inc/a.php")).unwrap(),
            "<?php"
        );
    }

    #[tokio::test]
    async fn test_empty_glob_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let target = Target {
            copy_files_src: vec![format!("{}/a/*", dir.path().display())],
            copy_files_dist: dir.path().join("out").display().to_string(),
            ..Target::default()
        };
        Copy::new(Bus::default()).run(&target, false).await.unwrap();
        assert!(!dir.path().join("out").exists());
    }
}
