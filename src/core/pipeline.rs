use serde::{Deserialize, Serialize};

use crate::error::{Error, Hint};
use crate::session::Session;
use crate::tasks::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    Deploy,
    PythonFix,
}

impl Composite {
    pub fn name(&self) -> &'static str {
        match self {
            Composite::Deploy => "deploy",
            Composite::PythonFix => "pythonfix",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Composite::Deploy => "Pull, build, migrate and restart the application",
            Composite::PythonFix => "Pull the latest code and restart the process supervisor",
        }
    }

    /// Steps in execution order.
    pub fn steps(&self) -> Vec<Task> {
        match self {
            Composite::Deploy => vec![
                Task::PullLatest,
                Task::InstallFrontendDeps,
                Task::RunFrontendBuild,
                Task::InstallRequirements {
                    environment: crate::tasks::DEFAULT_REQUIREMENTS.to_string(),
                },
                Task::CollectStaticAssets,
                Task::MigrateDatabase,
                Task::BuildDocs,
                Task::ReloadProxy,
                Task::UpdateTaskQueueConfig,
                Task::RestartProcessSupervisor,
            ],
            Composite::PythonFix => vec![Task::PullLatest, Task::RestartProcessSupervisor],
        }
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps().iter().map(Task::name).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PipelineRunStatus {
    Success,
    Failed,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStepResult {
    pub id: String,
    pub status: PipelineRunStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<Hint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunResult {
    pub name: String,
    pub steps: Vec<PipelineStepResult>,
    pub status: PipelineRunStatus,
    pub summary: PipelineRunSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunSummary {
    pub total_steps: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_step: Option<String>,
}

/// Outcome of a composite run. A failed run also hands back the error of the
/// failing step so the caller can map its exit code.
#[derive(Debug)]
pub struct PipelineOutcome {
    pub result: PipelineRunResult,
    pub error: Option<Error>,
}

/// Run the composite's steps in order. The first failure stops the run and
/// every remaining step is reported as skipped; nothing is rolled back.
pub fn run(composite: Composite, session: &mut Session) -> PipelineOutcome {
    let steps = composite.steps();
    let mut results = Vec::with_capacity(steps.len());
    let mut failure: Option<(String, Error)> = None;

    for step in steps {
        if let Some((failed, _)) = &failure {
            results.push(PipelineStepResult {
                id: step.name().to_string(),
                status: PipelineRunStatus::Skipped,
                warnings: vec![format!("Skipped because '{}' did not succeed", failed)],
                hints: Vec::new(),
                data: None,
                error: None,
            });
            continue;
        }

        log_status!("pipeline", "{}: {}", composite.name(), step.name());
        match step.run(session) {
            Ok(data) => results.push(PipelineStepResult {
                id: step.name().to_string(),
                status: PipelineRunStatus::Success,
                warnings: Vec::new(),
                hints: Vec::new(),
                data,
                error: None,
            }),
            Err(err) => {
                results.push(PipelineStepResult {
                    id: step.name().to_string(),
                    status: PipelineRunStatus::Failed,
                    warnings: Vec::new(),
                    hints: err.hints.clone(),
                    data: Some(err.details.clone()),
                    error: Some(err.message.clone()),
                });
                failure = Some((step.name().to_string(), err));
            }
        }
    }

    let status = if failure.is_some() {
        PipelineRunStatus::Failed
    } else {
        PipelineRunStatus::Success
    };
    let summary = build_summary(&results, failure.as_ref().map(|(name, _)| name.clone()));

    PipelineOutcome {
        result: PipelineRunResult {
            name: composite.name().to_string(),
            steps: results,
            status,
            summary,
        },
        error: failure.map(|(_, err)| err),
    }
}

fn build_summary(
    results: &[PipelineStepResult],
    failed_step: Option<String>,
) -> PipelineRunSummary {
    let count = |status: PipelineRunStatus| results.iter().filter(|r| r.status == status).count();

    PipelineRunSummary {
        total_steps: results.len(),
        succeeded: count(PipelineRunStatus::Success),
        failed: count(PipelineRunStatus::Failed),
        skipped: count(PipelineRunStatus::Skipped),
        failed_step,
    }
}
