//! `compile_scss` — compiles SCSS sources with the external `sass` compiler.
//!
//! The transform itself is delegated: this adapter only maps sources to
//! destinations, derives compiler flags from the target (compress, dev source
//! maps) and routes per-file failures through the non-fatal handler.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::Regex;

use super::fsops;
use super::{Fanout, Task, TaskId};
use crate::config::Target;
use crate::error::TaskError;
use crate::events::Bus;

/// External compiler program name.
const SASS: &str = "sass";

pub struct CompileScss {
    bus: Bus,
}

impl CompileScss {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

/// Maps `style.scss` to its compiled destination name.
pub(super) fn css_dest(dist: &Path, rel: &Path, suffix: &str) -> PathBuf {
    let stem = rel.file_stem().unwrap_or_default().to_string_lossy();
    let mut dest = dist.join(rel);
    dest.set_file_name(format!("{stem}{suffix}.css"));
    dest
}

/// Returns `true` for sass partials (`_name.scss`), which are never compiled
/// standalone.
pub(super) fn is_partial(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('_'))
        .unwrap_or(false)
}

/// Replaces a `{{table_of_contents}}` marker with a list generated from the
/// section comment blocks (`/*--- ... ---*/`) following it.
///
/// Blocks whose inner text spans multiple lines become numbered entries,
/// single-line blocks become `-` sub-entries. Blocks before the marker are
/// ignored; without a marker the content is returned untouched.
pub(super) fn insert_table_of_contents(content: &str) -> String {
    const MARKER: &str = "{{table_of_contents}}";
    let Some(pos) = content.find(MARKER) else {
        return content.to_string();
    };

    let re = Regex::new(r"/\*[ -]-+\n([\s\S]*?)\n[ -]*-[ -]\*/").expect("valid section regex");
    let mut toc = String::new();
    let mut index = 1usize;
    for caps in re.captures_iter(&content[pos..]) {
        let Some(title) = caps.get(1).map(|m| m.as_str()) else {
            continue;
        };
        if title.trim().is_empty() {
            continue;
        }
        if title.contains('\n') {
            toc.push_str(&format!("\n  {index}. "));
            index += 1;
        } else {
            toc.push_str("\n    - ");
        }
        toc.push_str(title.trim());
    }
    content.replacen(MARKER, &toc, 1)
}

/// Applies the table-of-contents substitution to a compiled stylesheet.
async fn apply_table_of_contents(dest: &Path) -> Result<(), TaskError> {
    let content = tokio::fs::read_to_string(dest)
        .await
        .map_err(|source| TaskError::Io {
            path: dest.to_path_buf(),
            source,
        })?;
    let generated = insert_table_of_contents(&content);
    if generated != content {
        tokio::fs::write(dest, generated)
            .await
            .map_err(|source| TaskError::Io {
                path: dest.to_path_buf(),
                source,
            })?;
    }
    Ok(())
}

/// Shared compile loop for the plain and RTL variants.
pub(super) async fn compile_all(
    bus: &Bus,
    id: TaskId,
    target: &Target,
    is_dev: bool,
    suffix: &str,
    postprocess: Option<&str>,
) -> Result<(), TaskError> {
    let dist = Path::new(&target.compile_scss_files_dist);
    let mut attempted = 0usize;
    let mut compiled = 0usize;
    let mut last_error = None;

    for file in fsops::expand_files(&target.compile_scss_files_src)? {
        if is_partial(&file) {
            continue;
        }
        attempted += 1;

        let rel = fsops::relative_dest(&file, &target.compile_scss_files_src);
        let dest = css_dest(dist, &rel, suffix);
        fsops::ensure_parent(&dest).await?;

        let mut args = vec![
            file.display().to_string(),
            dest.display().to_string(),
            format!(
                "--style={}",
                if target.compile_scss_files_compress {
                    "compressed"
                } else {
                    "expanded"
                }
            ),
        ];
        if is_dev {
            args.push("--embed-source-map".to_string());
        } else {
            args.push("--no-source-map".to_string());
        }

        let result = match fsops::run_tool(SASS, &args).await {
            // Comment sections are collected before any RTL flip rewrites
            // the stylesheet.
            Ok(()) => apply_table_of_contents(&dest).await,
            Err(e) => Err(e),
        };
        let result = match (result, postprocess) {
            // RTL flip runs in place over the compiled output.
            (Ok(()), Some(tool)) => {
                fsops::run_tool(
                    tool,
                    &[dest.display().to_string(), dest.display().to_string()],
                )
                .await
            }
            (r, _) => r,
        };

        match result {
            Ok(()) => compiled += 1,
            Err(e) => {
                fsops::report_adapter_error(bus, id, target, &e);
                last_error = Some(e);
            }
        }
    }

    // Nothing succeeded but something was tried: the compiler itself is
    // broken or missing, fail the invocation.
    match last_error {
        Some(e) if attempted > 0 && compiled == 0 => Err(e),
        _ => Ok(()),
    }
}

#[async_trait]
impl Task for CompileScss {
    fn id(&self) -> TaskId {
        TaskId::CompileScss
    }

    fn fanout(&self) -> Fanout {
        Fanout::Parallel
    }

    fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
        !target.compile_scss_files_src.is_empty() && !target.compile_scss_files_dist.is_empty()
    }

    async fn run(&self, target: &Target, is_dev: bool) -> Result<(), TaskError> {
        let suffix = if target.compile_scss_files_compress {
            ".min"
        } else {
            ""
        };
        compile_all(&self.bus, self.id(), target, is_dev, suffix, None).await
    }
}
