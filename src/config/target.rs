//! # Resolved build target.
//!
//! [`Target`] is the immutable per-target record the whole pipeline reads
//! from: one instance per logical build target (a theme, each plugin, ...),
//! created once by the resolver and never mutated afterwards.
//!
//! Field semantics follow one rule everywhere: an absent/empty source or
//! destination field makes the owning task inapplicable for this target —
//! absent configuration is "feature disabled", never an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

/// Deserializes a glob field from either a single string or a list.
///
/// `""` and `[]` both resolve to an empty list (task disabled).
fn one_or_many<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(de)? {
        OneOrMany::One(s) if s.is_empty() => Vec::new(),
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v.into_iter().filter(|s| !s.is_empty()).collect(),
    })
}

/// Deserializes an optional section that may be disabled with a falsy value.
///
/// `false` and `null` both resolve to `None`; an object resolves to `Some`.
fn falsy_option<'de, D, T>(de: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = serde_json::Value::deserialize(de)?;
    match value {
        serde_json::Value::Null | serde_json::Value::Bool(false) => Ok(None),
        other => serde_json::from_value(other)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Translation metadata written into the generated `.pot` header.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslateOptions {
    /// Gettext text domain.
    pub domain: String,
    /// Package name.
    pub package: String,
    /// `Last-Translator` header value.
    #[serde(alias = "lastTranslator")]
    pub last_translator: String,
    /// `Language-Team` header value.
    pub team: String,
}

/// One entry of the archive manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZipEntry {
    /// Local source globs.
    #[serde(deserialize_with = "one_or_many")]
    pub src: Vec<String>,
    /// Remote source URLs (used instead of `src` when non-empty).
    #[serde(deserialize_with = "one_or_many")]
    pub src_remote: Vec<String>,
    /// Destination archive path (`some/dir/name.zip`).
    pub dist: String,
}

/// Live-reload server options.
///
/// A falsy `live_reload` field in the config disables live reload entirely.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveReloadOptions {
    /// Proxy target for the development server.
    pub proxy: String,
    /// Port the reload server listens on (0 = backend default).
    pub port: u16,
}

/// Immutable, resolved configuration for one build target.
///
/// Created by [`resolve`](crate::config::resolve) by merging the user config
/// over [`Target::default`] and expanding `{placeholder}` tokens; read-only
/// for the rest of the process lifetime.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    /// Optional label used in log lines (multi-target builds).
    pub name: Option<String>,

    /// Source root, referenced by `{src}` placeholders.
    pub src: String,
    /// Destination root, referenced by `{dist}` placeholders.
    pub dist: String,

    /// Globs removed by the `clean` task (files and directories).
    #[serde(deserialize_with = "one_or_many")]
    pub clean_files: Vec<String>,

    /// Globs copied verbatim into `copy_files_dist`.
    #[serde(deserialize_with = "one_or_many")]
    pub copy_files_src: Vec<String>,
    pub copy_files_dist: String,

    /// Remote URLs fetched into `remote_copy_files_dist`.
    #[serde(deserialize_with = "one_or_many")]
    pub remote_copy_files_src: Vec<String>,
    pub remote_copy_files_dist: String,

    /// SCSS sources compiled into `compile_scss_files_dist`.
    #[serde(deserialize_with = "one_or_many")]
    pub compile_scss_files_src: Vec<String>,
    pub compile_scss_files_dist: String,
    /// Compress output (adds a `.min` suffix).
    pub compile_scss_files_compress: bool,
    /// Additionally produce right-to-left stylesheets.
    pub compile_scss_files_rtl: bool,

    /// JS entry points bundled into `compile_js_files_dist`.
    #[serde(deserialize_with = "one_or_many")]
    pub compile_js_files_src: Vec<String>,
    pub compile_js_files_dist: String,
    pub compile_js_files_compress: bool,

    /// JSX entry points bundled into `compile_jsx_files_dist`.
    #[serde(deserialize_with = "one_or_many")]
    pub compile_jsx_files_src: Vec<String>,
    pub compile_jsx_files_dist: String,
    pub compile_jsx_files_compress: bool,

    /// SCSS sources run through the vendor prefixer.
    #[serde(deserialize_with = "one_or_many")]
    pub prefix_scss_files_src: Vec<String>,
    pub prefix_scss_files_dist: String,

    /// Files with `@@variable` markers replaced from `template_files_variables`.
    #[serde(deserialize_with = "one_or_many")]
    pub template_files_src: Vec<String>,
    pub template_files_dist: String,
    /// Variable name → replacement value.
    pub template_files_variables: BTreeMap<String, String>,

    /// Files whose CRLF line endings are normalized to LF.
    #[serde(deserialize_with = "one_or_many")]
    pub correct_line_endings_files_src: Vec<String>,
    pub correct_line_endings_files_dist: String,

    /// PHP sources scanned for gettext calls.
    #[serde(deserialize_with = "one_or_many")]
    pub translate_php_files_src: Vec<String>,
    pub translate_php_files_dist: String,
    pub translate_php_options: TranslateOptions,

    /// Archive manifest, processed by the `zip` task.
    pub zip_files: Vec<ZipEntry>,

    /// Live-reload configuration; `false`/absent disables live reload.
    #[serde(deserialize_with = "falsy_option")]
    pub live_reload: Option<LiveReloadOptions>,

    /// Watch globs: general files (copy/template/line-endings/prefix pipeline).
    #[serde(deserialize_with = "one_or_many")]
    pub watch_files: Vec<String>,
    /// Watch globs: JS sources.
    #[serde(deserialize_with = "one_or_many")]
    pub watch_js_files: Vec<String>,
    /// Watch globs: JSX component sources.
    #[serde(deserialize_with = "one_or_many")]
    pub watch_jsx_files: Vec<String>,
    /// Watch globs: SCSS sources.
    #[serde(deserialize_with = "one_or_many")]
    pub watch_scss_files: Vec<String>,
}

impl Target {
    /// Label used in log lines: the target name, or `"default"`.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("default")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glob_field_accepts_string_or_list() {
        let t: Target =
            serde_json::from_value(serde_json::json!({ "copy_files_src": "src/**/*" })).unwrap();
        assert_eq!(t.copy_files_src, vec!["src/**/*"]);

        let t: Target =
            serde_json::from_value(serde_json::json!({ "copy_files_src": ["a/*", "b/*"] }))
                .unwrap();
        assert_eq!(t.copy_files_src, vec!["a/*", "b/*"]);

        let t: Target =
            serde_json::from_value(serde_json::json!({ "copy_files_src": "" })).unwrap();
        assert!(t.copy_files_src.is_empty());
    }

    #[test]
    fn test_live_reload_falsy_disables() {
        let t: Target = serde_json::from_value(serde_json::json!({ "live_reload": false })).unwrap();
        assert!(t.live_reload.is_none());

        let t: Target = serde_json::from_value(
            serde_json::json!({ "live_reload": { "proxy": "localhost:8080" } }),
        )
        .unwrap();
        assert_eq!(t.live_reload.unwrap().proxy, "localhost:8080");
    }

    #[test]
    fn test_translate_options_accepts_camel_case_alias() {
        let o: TranslateOptions =
            serde_json::from_value(serde_json::json!({ "lastTranslator": "Jane <j@x.y>" }))
                .unwrap();
        assert_eq!(o.last_translator, "Jane <j@x.y>");
    }
}
