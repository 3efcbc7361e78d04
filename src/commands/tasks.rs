use serde::Serialize;

use lutris_deploy::tasks::{self, TaskInfo};

use super::{CmdResult, GlobalArgs};

#[derive(Debug, Serialize)]
pub struct TasksOutput {
    pub tasks: Vec<TaskInfo>,
}

pub fn run(_global: &GlobalArgs) -> CmdResult<TasksOutput> {
    Ok((
        TasksOutput {
            tasks: tasks::catalog(),
        },
        0,
    ))
}
