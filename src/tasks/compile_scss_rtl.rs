//! `compile_scss_rtl` — right-to-left variant of the SCSS compiler.
//!
//! Compiles the same sources, then flips direction with the external `rtlcss`
//! tool; output gets a `-rtl` / `-rtl.min` suffix. Only applies when the
//! target opts in via `compile_scss_files_rtl`.

use async_trait::async_trait;

use super::compile_scss::compile_all;
use super::{Fanout, Task, TaskId};
use crate::config::Target;
use crate::error::TaskError;
use crate::events::Bus;

/// External RTL flip program name.
const RTLCSS: &str = "rtlcss";

pub struct CompileScssRtl {
    bus: Bus,
}

impl CompileScssRtl {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Task for CompileScssRtl {
    fn id(&self) -> TaskId {
        TaskId::CompileScssRtl
    }

    fn fanout(&self) -> Fanout {
        Fanout::Parallel
    }

    fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
        target.compile_scss_files_rtl
            && !target.compile_scss_files_src.is_empty()
            && !target.compile_scss_files_dist.is_empty()
    }

    async fn run(&self, target: &Target, is_dev: bool) -> Result<(), TaskError> {
        let suffix = if target.compile_scss_files_compress {
            "-rtl.min"
        } else {
            "-rtl"
        };
        compile_all(&self.bus, self.id(), target, is_dev, suffix, Some(RTLCSS)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_rtl_opt_in() {
        let task = CompileScssRtl::new(Bus::default());
        let mut target = Target {
            compile_scss_files_src: vec!["scss/*.scss".into()],
            compile_scss_files_dist: "out".into(),
            ..Target::default()
        };
        assert!(!task.is_allowed(&target, false));
        target.compile_scss_files_rtl = true;
        assert!(task.is_allowed(&target, false));
    }
}
