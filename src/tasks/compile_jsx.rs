//! `compile_jsx` — JSX variant of the bundler task.

use async_trait::async_trait;

use super::compile_js::bundle_all;
use super::{Fanout, Task, TaskId};
use crate::config::Target;
use crate::error::TaskError;
use crate::events::Bus;

pub struct CompileJsx {
    bus: Bus,
}

impl CompileJsx {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Task for CompileJsx {
    fn id(&self) -> TaskId {
        TaskId::CompileJsx
    }

    fn fanout(&self) -> Fanout {
        Fanout::Parallel
    }

    fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
        !target.compile_jsx_files_src.is_empty() && !target.compile_jsx_files_dist.is_empty()
    }

    async fn run(&self, target: &Target, is_dev: bool) -> Result<(), TaskError> {
        bundle_all(
            &self.bus,
            self.id(),
            &target.compile_jsx_files_src,
            &target.compile_jsx_files_dist,
            target.compile_jsx_files_compress,
            is_dev,
            true,
            target,
        )
        .await
    }
}
