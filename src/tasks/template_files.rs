//! `template_files` — replaces `@@variable` markers with values from
//! `template_files_variables` and writes the result to
//! `template_files_dist`.
//!
//! Marker keys are regex-escaped before matching, so variable names may
//! contain characters like dots. A target with an empty variable mapping is
//! treated as a no-op (nothing to replace).

use std::path::Path;

use async_trait::async_trait;
use regex::Regex;

use super::fsops;
use super::{Fanout, Task, TaskId};
use crate::config::Target;
use crate::error::TaskError;
use crate::events::Bus;

pub struct TemplateFiles {
    bus: Bus,
}

impl TemplateFiles {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

/// Applies every `@@name` → value replacement to `content`.
pub(super) fn replace_variables(
    content: &str,
    variables: &std::collections::BTreeMap<String, String>,
) -> String {
    let mut out = content.to_string();
    for (name, value) in variables {
        let escaped = regex::escape(name);
        // Escaped names always compile; keep the unwrap-free path anyway.
        if let Ok(re) = Regex::new(&format!("@@{escaped}")) {
            out = re.replace_all(&out, value.as_str()).into_owned();
        }
    }
    out
}

#[async_trait]
impl Task for TemplateFiles {
    fn id(&self) -> TaskId {
        TaskId::TemplateFiles
    }

    fn fanout(&self) -> Fanout {
        Fanout::Parallel
    }

    fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
        !target.template_files_src.is_empty()
            && !target.template_files_dist.is_empty()
            && !target.template_files_variables.is_empty()
    }

    async fn run(&self, target: &Target, _is_dev: bool) -> Result<(), TaskError> {
        let dist = Path::new(&target.template_files_dist);
        for file in fsops::expand_files(&target.template_files_src)? {
            let dest = dist.join(fsops::relative_dest(&file, &target.template_files_src));

            match tokio::fs::read_to_string(&file).await {
                Ok(content) => {
                    let replaced = replace_variables(&content, &target.template_files_variables);
                    fsops::ensure_parent(&dest).await?;
                    tokio::fs::write(&dest, replaced)
                        .await
                        .map_err(|source| TaskError::Io {
                            path: dest.clone(),
                            source,
                        })?;
                }
                Err(e) => {
                    // Binary or unreadable file: skip it, keep the stream alive.
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
    use std::collections::BTreeMap;

    #[test]
    fn test_requires_variables_too() {
        let task = TemplateFiles::new(Bus::default());
        let mut target = Target {
            template_files_src: vec!["src/**/*.php".into()],
            template_files_dist: "out".into(),
            ..Target::default()
        };
        assert!(!task.is_allowed(&target, false));
        target
            .template_files_variables
            .insert("text_domain".into(), "my-theme".into());
        assert!(task.is_allowed(&target, false));
    }

    #[test]
    fn test_replace_variables() {
        let mut vars = BTreeMap::new();
        vars.insert("text_domain".to_string(), "my-theme".to_string());
        vars.insert("version".to_string(), "1.2.3".to_string());

        let out = replace_variables("domain: @@text_domain, v@@version, keep @@unknown", &vars);
        assert_eq!(out, "domain: my-theme, v1.2.3, keep @@unknown");
    }

    #[tokio::test]
    async fn test_writes_replaced_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir(root.join("src")).unwrap();
        std::fs::write(root.join("src/plugin.php"), "Version: @@version").unwrap();

        let mut variables = BTreeMap::new();
        variables.insert("version".to_string(), "2.0.0".to_string());
        let target = Target {
            template_files_src: vec![format!("{}/src/*.php", root.display())],
            template_files_dist: root.join("out").display().to_string(),
            template_files_variables: variables,
            ..Target::default()
        };

        TemplateFiles::new(Bus::default())
            .run(&target, false)
            .await
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(root.join("out/plugin.php")).unwrap(),
            "Version: 2.0.0"
        );
    }
}
