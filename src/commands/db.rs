use clap::Args;
use std::path::PathBuf;

use lutris_deploy::tasks::Task;

use super::TaskArgs;

#[derive(Args, Debug)]
pub struct SqlDumpArgs {
    /// Local directory the compressed dump is downloaded into
    #[arg(long, default_value = ".")]
    pub dest: PathBuf,
}

impl TaskArgs for SqlDumpArgs {
    fn into_task(self) -> lutris_deploy::Result<Task> {
        Ok(Task::SqlDump { dest_dir: self.dest })
    }
}

#[derive(Args, Debug)]
pub struct SqlRestoreArgs {
    /// Local directory searched for the dump
    #[arg(long, default_value = ".")]
    pub dir: PathBuf,
}

impl TaskArgs for SqlRestoreArgs {
    fn into_task(self) -> lutris_deploy::Result<Task> {
        Ok(Task::SqlRestore { dir: self.dir })
    }
}
