//! `clean` — removes everything matching `clean_files` (files and
//! directories), typically the whole dist tree before a build.

use async_trait::async_trait;

use super::fsops;
use super::{Fanout, Task, TaskId};
use crate::config::Target;
use crate::error::TaskError;
use crate::events::Bus;

pub struct Clean {
    bus: Bus,
}

impl Clean {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Task for Clean {
    fn id(&self) -> TaskId {
        TaskId::Clean
    }

    fn fanout(&self) -> Fanout {
        // Each target cleans its own dist tree.
        Fanout::Parallel
    }

    fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
        !target.clean_files.is_empty()
    }

    async fn run(&self, target: &Target, _is_dev: bool) -> Result<(), TaskError> {
        for path in fsops::expand_paths(&target.clean_files)? {
            let result = if path.is_dir() {
                tokio::fs::remove_dir_all(&path).await
            } else {
                tokio::fs::remove_file(&path).await
            };
            if let Err(e) = result {
                // The glob may race with a sibling removal; report and move on.
                if e.kind() != std::io::ErrorKind::NotFound {
                    fsops::report_adapter_error(&self.bus, self.id(), target, e);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_allowed_without_clean_files() {
        let clean = Clean::new(Bus::default());
        assert!(!clean.is_allowed(&Target::default(), false));

        let target = Target {
            clean_files: vec!["dist".into()],
            ..Target::default()
        };
        assert!(clean.is_allowed(&target, false));
    }

    #[tokio::test]
    async fn test_removes_matched_files_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        std::fs::create_dir_all(out.join("nested")).unwrap();
        std::fs::write(out.join("stale.txt"), "old").unwrap();
        std::fs::write(out.join("nested/also.txt"), "old").unwrap();

        let target = Target {
            clean_files: vec![out.display().to_string()],
            ..Target::default()
        };
        Clean::new(Bus::default()).run(&target, false).await.unwrap();
        assert!(!out.exists());
    }
}
