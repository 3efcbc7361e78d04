use serde::Serialize;
use serde_json::Value;

use lutris_deploy::environment::EnvConfig;
use lutris_deploy::pipeline::{self, Composite, PipelineRunResult};
use lutris_deploy::session::CommandRecord;

use super::{CmdResult, GlobalArgs, Target};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOutput {
    pub task: String,
    pub host: String,
    pub dry_run: bool,
    pub record: EnvConfig,
    pub pipeline: PipelineRunResult,
    pub commands: Vec<CommandRecord>,
}

pub fn run(composite: Composite, global: &GlobalArgs) -> CmdResult<DeployOutput> {
    let target = Target::load(global)?;
    let transport = target.transport(global)?;
    let mut session = target.session(transport.as_ref());

    let outcome = pipeline::run(composite, &mut session);

    if let Some(mut err) = outcome.error {
        // Keep the per-step picture in the error envelope.
        if let (Value::Object(details), Ok(result)) =
            (&mut err.details, serde_json::to_value(&outcome.result))
        {
            details.insert("pipeline".to_string(), result);
        }
        return Err(err);
    }

    Ok((
        DeployOutput {
            task: composite.name().to_string(),
            host: target.host.clone(),
            dry_run: global.dry_run,
            record: target.record.clone(),
            pipeline: outcome.result,
            commands: session.into_records(),
        },
        0,
    ))
}
