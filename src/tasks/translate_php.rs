//! `translate_php` — scans PHP sources for gettext calls and generates a
//! `.pot` template with headers from `translate_php_options`.
//!
//! Recognizes the WordPress i18n family (`__`, `_e`, `_x`, `_n`,
//! `esc_html__`, `esc_html_e`, `esc_attr__`, `esc_attr_e`) and keeps one
//! entry per unique string with source references.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::Regex;

use super::fsops;
use super::{Task, TaskId};
use crate::config::{Target, TranslateOptions};
use crate::error::TaskError;
use crate::events::Bus;

pub struct TranslatePhp {
    bus: Bus,
}

impl TranslatePhp {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

/// Escapes a string for use inside a po/pot `msgid`.
fn po_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\t', "\\t")
}

/// Extracts translatable strings with `file:line` references.
pub(super) fn extract_strings(
    source: &str,
    file: &Path,
    entries: &mut BTreeMap<String, Vec<String>>,
) {
    // First string argument of a recognized i18n call.
    let re = Regex::new(
        r#"(?:__|_e|_x|_n|esc_html__|esc_html_e|esc_attr__|esc_attr_e)\(\s*(?:'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#,
    )
    .expect("valid i18n regex");

    for (lineno, line) in source.lines().enumerate() {
        for caps in re.captures_iter(line) {
            let text = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            if text.is_empty() {
                continue;
            }
            entries
                .entry(text.to_string())
                .or_default()
                .push(format!("{}:{}", file.display(), lineno + 1));
        }
    }
}

/// Renders the collected entries as a `.pot` document.
pub(super) fn render_pot(
    options: &TranslateOptions,
    entries: &BTreeMap<String, Vec<String>>,
) -> String {
    let creation = chrono::Local::now().format("%Y-%m-%d %H:%M%z");
    let mut pot = String::new();
    pot.push_str("msgid \"\"\nmsgstr \"\"\n");
    pot.push_str(&format!(
        "\"Project-Id-Version: {}\\n\"\n",
        po_escape(&options.package)
    ));
    pot.push_str(&format!("\"POT-Creation-Date: {creation}\\n\"\n"));
    pot.push_str(&format!(
        "\"Last-Translator: {}\\n\"\n",
        po_escape(&options.last_translator)
    ));
    pot.push_str(&format!(
        "\"Language-Team: {}\\n\"\n",
        po_escape(&options.team)
    ));
    pot.push_str("\"MIME-Version: 1.0\\n\"\n");
    pot.push_str("\"Content-Type: text/plain; charset=UTF-8\\n\"\n");
    pot.push_str("\"Content-Transfer-Encoding: 8bit\\n\"\n");
    pot.push_str(&format!(
        "\"X-Domain: {}\\n\"\n",
        po_escape(&options.domain)
    ));

    for (msgid, references) in entries {
        pot.push('\n');
        for reference in references {
            pot.push_str(&format!("#: {reference}\n"));
        }
        pot.push_str(&format!("msgid \"{}\"\n", po_escape(msgid)));
        pot.push_str("msgstr \"\"\n");
    }
    pot
}

#[async_trait]
impl Task for TranslatePhp {
    fn id(&self) -> TaskId {
        TaskId::TranslatePhp
    }

    fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
        !target.translate_php_files_src.is_empty() && !target.translate_php_files_dist.is_empty()
    }

    async fn run(&self, target: &Target, _is_dev: bool) -> Result<(), TaskError> {
        let mut entries: BTreeMap<String, Vec<String>> = BTreeMap::new();

        let mut files = fsops::expand_files(&target.translate_php_files_src)?;
        files.sort();
        for file in files {
            match tokio::fs::read_to_string(&file).await {
                Ok(source) => extract_strings(&source, &file, &mut entries),
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

        let options = &target.translate_php_options;
        let name = if options.domain.is_empty() {
            "messages"
        } else {
            &options.domain
        };
        let dest = PathBuf::from(&target.translate_php_files_dist).join(format!("{name}.pot"));
        fsops::ensure_parent(&dest).await?;
        tokio::fs::write(&dest, render_pot(options, &entries))
            .await
            .map_err(|source| TaskError::Io { path: dest, source })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_i18n_calls() {
        let php = r#"<?php
            echo __( 'Hello World', 'my-theme' );
            esc_html_e( "Second string", 'my-theme' );
            not_i18n( 'ignored' );
        "#;
        let mut entries = BTreeMap::new();
        extract_strings(php, Path::new("inc/a.php"), &mut entries);

        assert_eq!(entries.len(), 2);
        assert_eq!(entries["Hello World"], vec!["inc/a.php:2"]);
        assert!(entries.contains_key("Second string"));
    }

    #[test]
    fn test_render_pot_has_headers_and_entries() {
        let options = TranslateOptions {
            domain: "my-theme".into(),
            package: "My Theme".into(),
            last_translator: "Jane <j@x.y>".into(),
            team: "Team <t@x.y>".into(),
        };
        let mut entries = BTreeMap::new();
        entries.insert("Say \"hi\"".to_string(), vec!["a.php:1".to_string()]);

        let pot = render_pot(&options, &entries);
        assert!(pot.contains("\"Project-Id-Version: My Theme\\n\""));
        assert!(pot.contains("\"X-Domain: my-theme\\n\""));
        assert!(pot.contains("#: a.php:1"));
        assert!(pot.contains("msgid \"Say \\\"hi\\\"\""));
    }

    #[tokio::test]
    async fn test_writes_pot_named_after_domain() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join("x.php"), "<?php __( 'One', 'd' );").unwrap();

        let target = Target {
            translate_php_files_src: vec![format!("{}/*.php", root.display())],
            translate_php_files_dist: root.join("languages").display().to_string(),
            translate_php_options: TranslateOptions {
                domain: "d".into(),
                ..TranslateOptions::default()
            },
            ..Target::default()
        };
        TranslatePhp::new(Bus::default())
            .run(&target, false)
            .await
            .unwrap();

        let pot = std::fs::read_to_string(root.join("languages/d.pot")).unwrap();
        assert!(pot.contains("msgid \"One\""));
    }
}
