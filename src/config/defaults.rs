//! Built-in defaults the user config is merged over.
//!
//! Destination fields default to `"{dist}"` so a config that only sets `dist`
//! gets sensible destinations everywhere; source fields default to empty,
//! which disables the owning task.

use serde_json::{json, Value};

/// Returns the default target record as a raw JSON value.
///
/// Raw (pre-deserialization) on purpose: the resolver shallow-merges user
/// keys over this value and runs placeholder expansion before anything is
/// turned into a typed [`Target`](super::Target).
pub fn default_value() -> Value {
    json!({
        // Build paths.
        "src": "",
        "dist": "",

        // Clean files.
        "clean_files": "{dist}",

        // Copy files.
        "copy_files_src": "",
        "copy_files_dist": "{dist}",

        // Copy remote files.
        "remote_copy_files_src": "",
        "remote_copy_files_dist": "{dist}",

        // Compile SCSS files.
        "compile_scss_files_src": "",
        "compile_scss_files_dist": "{dist}",
        "compile_scss_files_compress": true,
        "compile_scss_files_rtl": false,

        // Compile JS files.
        "compile_js_files_src": "",
        "compile_js_files_dist": "{dist}",
        "compile_js_files_compress": true,

        // Compile JSX files.
        "compile_jsx_files_src": "",
        "compile_jsx_files_dist": "{dist}",
        "compile_jsx_files_compress": true,

        // Prefix SCSS files.
        "prefix_scss_files_src": "",
        "prefix_scss_files_dist": "{dist}",

        // Template variables that will be automatically replaced.
        "template_files_src": "",
        "template_files_dist": "{dist}",
        "template_files_variables": {},

        // Correct line endings files.
        "correct_line_endings_files_src": "",
        "correct_line_endings_files_dist": "{dist}",

        // Translate PHP files.
        "translate_php_files_src": "",
        "translate_php_files_dist": "",
        "translate_php_options": {
            "domain": "",
            "package": "",
            "last_translator": "",
            "team": "",
        },

        // ZIP files.
        "zip_files": [],

        // Live reload.
        "live_reload": false,

        // Watch files.
        "watch_files": "",
        "watch_js_files": "",
        "watch_jsx_files": "",
        "watch_scss_files": "",
    })
}
