//! `remote_copy` — fetches remote URLs into `remote_copy_files_dist`.
//!
//! Suppressed entirely in dev/watch mode: re-fetching remote sources on every
//! file change would be redundant network traffic.

use std::path::Path;

use async_trait::async_trait;

use super::fsops;
use super::{Task, TaskId};
use crate::config::Target;
use crate::error::TaskError;
use crate::events::Bus;

pub struct RemoteCopy {
    bus: Bus,
    client: reqwest::Client,
}

impl RemoteCopy {
    pub fn new(bus: Bus) -> Self {
        Self {
            bus,
            client: reqwest::Client::new(),
        }
    }

    /// File name a URL is stored under (last path segment).
    fn file_name(url: &str) -> Option<&str> {
        url.split('/').next_back().filter(|s| !s.is_empty())
    }
}

#[async_trait]
impl Task for RemoteCopy {
    fn id(&self) -> TaskId {
        TaskId::RemoteCopy
    }

    // Default Fanout::Sequential: remote fetches across targets are not
    // provably independent (shared hosts, rate limits).

    fn is_allowed(&self, target: &Target, is_dev: bool) -> bool {
        !is_dev
            && !target.remote_copy_files_src.is_empty()
            && !target.remote_copy_files_dist.is_empty()
    }

    async fn run(&self, target: &Target, _is_dev: bool) -> Result<(), TaskError> {
        let dist = Path::new(&target.remote_copy_files_dist);
        for url in &target.remote_copy_files_src {
            let Some(name) = Self::file_name(url) else {
                fsops::report_adapter_error(
                    &self.bus,
                    self.id(),
                    target,
                    format!("cannot derive file name from url {url}"),
                );
                continue;
            };
            let dest = dist.join(name);

            let body = async {
                self.client
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
                Ok(bytes) => {
                    fsops::ensure_parent(&dest).await?;
                    tokio::fs::write(&dest, &bytes)
                        .await
                        .map_err(|source| TaskError::Io {
                            path: dest.clone(),
                            source,
                        })?;
                }
                Err(e) => {
                    // One unreachable URL must not sink the rest.
                    fsops::report_adapter_error(&self.bus, self.id(), target, &e);
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
    fn test_disallowed_in_dev_mode() {
        let task = RemoteCopy::new(Bus::default());
        let target = Target {
            remote_copy_files_src: vec!["https://example.com/lib.js".into()],
            remote_copy_files_dist: "out/vendor".into(),
            ..Target::default()
        };
        assert!(task.is_allowed(&target, false));
        assert!(!task.is_allowed(&target, true));
        assert!(!task.is_allowed(&Target::default(), false));
    }

    #[tokio::test]
    async fn test_unfetchable_url_is_reported_not_fatal() {
        let bus = Bus::default();
        let mut rx = bus.subscribe();
        let dir = tempfile::tempdir().unwrap();

        let target = Target {
            remote_copy_files_src: vec!["ht!tp://not a url/lib.js".into()],
            remote_copy_files_dist: dir.path().join("out").display().to_string(),
            ..Target::default()
        };
        RemoteCopy::new(bus).run(&target, false).await.unwrap();

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, crate::events::EventKind::AdapterError);
        assert!(ev.reason.unwrap().contains("remote fetch failed"));
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            RemoteCopy::file_name("https://example.com/a/lib.min.js"),
            Some("lib.min.js")
        );
        assert_eq!(RemoteCopy::file_name("https://example.com/"), None);
    }
}
