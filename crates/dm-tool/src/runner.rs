use std::path::Path;

use dm_api::{create_session_with_bindings, ConversationExecutor, ExecutorOptions, DEFAULT_MAX_STEPS};
use dm_core::{ConversationSession, StepWarning};

use crate::source::{read_script, read_test_case};
use crate::{DmToolError, ExpectedFinal, ExpectedStep, TestCase};

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub observed_steps: Vec<ExpectedStep>,
    pub final_session: ConversationSession,
    pub warnings: Vec<StepWarning>,
}

pub fn run_case(example_dir: &Path, case: &TestCase) -> Result<RunReport, DmToolError> {
    let script = read_script(example_dir)?;
    let executor = ConversationExecutor::new(ExecutorOptions {
        max_steps: case.max_steps.unwrap_or(DEFAULT_MAX_STEPS),
    });

    let mut session =
        create_session_with_bindings(&script, case.session_id.as_str(), &case.seed_bindings)?;
    let mut observed_steps = Vec::new();
    let mut warnings = Vec::new();

    for input in &case.inputs {
        let result = executor.step(&script, &session, input);
        observed_steps.push(ExpectedStep::observe(&result));
        warnings.extend(result.warnings);
        session = result.session;
    }

    Ok(RunReport {
        observed_steps,
        final_session: session,
        warnings,
    })
}

pub fn assert_case(example_dir: &Path, case_path: &Path) -> Result<(), DmToolError> {
    let case = read_test_case(case_path)?;
    let report = run_case(example_dir, &case)?;

    if report.observed_steps.len() != case.expected_steps.len() {
        let observed = serde_json::to_string_pretty(&report.observed_steps)
            .map_err(DmToolError::StepSerialize)?;
        return Err(DmToolError::StepCountMismatch {
            expected: case.expected_steps.len(),
            actual: report.observed_steps.len(),
            observed,
        });
    }

    for (index, (expected, actual)) in case
        .expected_steps
        .iter()
        .zip(report.observed_steps.iter())
        .enumerate()
    {
        if expected != actual {
            let expected = serde_json::to_string(expected).map_err(DmToolError::StepSerialize)?;
            let actual = serde_json::to_string(actual).map_err(DmToolError::StepSerialize)?;
            return Err(DmToolError::StepMismatch {
                index,
                expected,
                actual,
            });
        }
    }

    if let Some(expected) = &case.expected_final {
        let actual = ExpectedFinal {
            status: report.final_session.status,
            bindings: expected
                .bindings
                .as_ref()
                .map(|_| report.final_session.bindings.clone()),
        };
        if expected != &actual {
            let expected = serde_json::to_string(expected).map_err(DmToolError::StepSerialize)?;
            let actual = serde_json::to_string(&actual).map_err(DmToolError::StepSerialize)?;
            return Err(DmToolError::FinalMismatch { expected, actual });
        }
    }

    Ok(())
}
