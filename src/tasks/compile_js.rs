//! `compile_js` — bundles JS entry points with the external `esbuild`
//! bundler. Each matched file is one entry; the bundling itself is delegated.

use std::path::Path;

use async_trait::async_trait;

use super::fsops;
use super::{Fanout, Task, TaskId};
use crate::config::Target;
use crate::error::TaskError;
use crate::events::Bus;

/// External bundler program name.
const ESBUILD: &str = "esbuild";

pub struct CompileJs {
    bus: Bus,
}

impl CompileJs {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

/// Shared bundle loop for the JS and JSX variants.
pub(super) async fn bundle_all(
    bus: &Bus,
    id: TaskId,
    src: &[String],
    dist: &str,
    compress: bool,
    is_dev: bool,
    jsx: bool,
    target: &Target,
) -> Result<(), TaskError> {
    let dist = Path::new(dist);
    let mut attempted = 0usize;
    let mut bundled = 0usize;
    let mut last_error = None;

    for file in fsops::expand_files(src)? {
        attempted += 1;

        let rel = fsops::relative_dest(&file, src);
        let stem = rel.file_stem().unwrap_or_default().to_string_lossy();
        let mut dest = dist.join(&rel);
        dest.set_file_name(format!(
            "{stem}{}.js",
            if compress { ".min" } else { "" }
        ));
        fsops::ensure_parent(&dest).await?;

        let mut args = vec![
            file.display().to_string(),
            "--bundle".to_string(),
            format!("--outfile={}", dest.display()),
        ];
        if compress {
            args.push("--minify".to_string());
        }
        if is_dev {
            args.push("--sourcemap=inline".to_string());
        }
        if jsx {
            args.push("--loader:.jsx=jsx".to_string());
        }

        match fsops::run_tool(ESBUILD, &args).await {
            Ok(()) => bundled += 1,
            Err(e) => {
                fsops::report_adapter_error(bus, id, target, &e);
                last_error = Some(e);
            }
        }
    }

    match last_error {
        Some(e) if attempted > 0 && bundled == 0 => Err(e),
        _ => Ok(()),
    }
}

#[async_trait]
impl Task for CompileJs {
    fn id(&self) -> TaskId {
        TaskId::CompileJs
    }

    fn fanout(&self) -> Fanout {
        Fanout::Parallel
    }

    fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
        !target.compile_js_files_src.is_empty() && !target.compile_js_files_dist.is_empty()
    }

    async fn run(&self, target: &Target, is_dev: bool) -> Result<(), TaskError> {
        bundle_all(
            &self.bus,
            self.id(),
            &target.compile_js_files_src,
            &target.compile_js_files_dist,
            target.compile_js_files_compress,
            is_dev,
            false,
            target,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_src_and_dist() {
        let task = CompileJs::new(Bus::default());
        assert!(!task.is_allowed(&Target::default(), false));
        assert!(task.is_allowed(
            &Target {
                compile_js_files_src: vec!["js/*.js".into()],
                compile_js_files_dist: "out/js".into(),
                ..Target::default()
            },
            false
        ));
    }
}
