//! `prefix_scss` — runs SCSS sources through the external vendor prefixer
//! (`postcss` with autoprefixer) and writes the result to
//! `prefix_scss_files_dist`.

use std::path::Path;

use async_trait::async_trait;

use super::fsops;
use super::{Fanout, Task, TaskId};
use crate::config::Target;
use crate::error::TaskError;
use crate::events::Bus;

/// External prefixer program name.
const POSTCSS: &str = "postcss";

pub struct PrefixScss {
    bus: Bus,
}

impl PrefixScss {
    pub fn new(bus: Bus) -> Self {
        Self { bus }
    }
}

#[async_trait]
impl Task for PrefixScss {
    fn id(&self) -> TaskId {
        TaskId::PrefixScss
    }

    fn fanout(&self) -> Fanout {
        Fanout::Parallel
    }

    fn is_allowed(&self, target: &Target, _is_dev: bool) -> bool {
        !target.prefix_scss_files_src.is_empty() && !target.prefix_scss_files_dist.is_empty()
    }

    async fn run(&self, target: &Target, _is_dev: bool) -> Result<(), TaskError> {
        let dist = Path::new(&target.prefix_scss_files_dist);
        let mut attempted = 0usize;
        let mut done = 0usize;
        let mut last_error = None;

        for file in fsops::expand_files(&target.prefix_scss_files_src)? {
            attempted += 1;

            let dest = dist.join(fsops::relative_dest(&file, &target.prefix_scss_files_src));
            fsops::ensure_parent(&dest).await?;

            let args = vec![
                file.display().to_string(),
                "--use".to_string(),
                "autoprefixer".to_string(),
                "--syntax".to_string(),
                "postcss-scss".to_string(),
                "-o".to_string(),
                dest.display().to_string(),
                "--no-map".to_string(),
            ];
            match fsops::run_tool(POSTCSS, &args).await {
                Ok(()) => done += 1,
                Err(e) => {
                    fsops::report_adapter_error(&self.bus, self.id(), target, &e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if attempted > 0 && done == 0 => Err(e),
            _ => Ok(()),
        }
    }
}
