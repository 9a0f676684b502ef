//! Three-step extract/transform/load template.
//!
//! Bots plug their logic in through [`WorkflowSteps`]; [`Workflow`] only
//! tracks how far the pipeline got.

use serde::Serialize;
use std::fmt;
use crate::core::error::RpaError;
use crate::loggers::{ProcessType, RpaLogger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Initialized,
    DataExtracted,
    DataTransformed,
    DataLoaded,
    Completed,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Initialized => "initialized",
            WorkflowStatus::DataExtracted => "data_extracted",
            WorkflowStatus::DataTransformed => "data_transformed",
            WorkflowStatus::DataLoaded => "data_loaded",
            WorkflowStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business logic of a bot. Every step defaults to doing nothing.
pub trait WorkflowSteps {
    fn extract(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn transform(&mut self) -> Result<(), String> {
        Ok(())
    }

    fn load(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// Steps that do nothing.
#[derive(Debug, Default)]
pub struct NoopSteps;

impl WorkflowSteps for NoopSteps {}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowReport {
    pub status: WorkflowStatus,
}

#[derive(Debug)]
pub struct Workflow<S = NoopSteps> {
    steps: S,
    status: WorkflowStatus,
}

impl Workflow<NoopSteps> {
    pub fn new() -> Self {
        Self::with_steps(NoopSteps)
    }
}

impl Default for Workflow<NoopSteps> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: WorkflowSteps> Workflow<S> {
    pub fn with_steps(steps: S) -> Self {
        Self { steps, status: WorkflowStatus::Initialized }
    }

    pub fn status(&self) -> WorkflowStatus {
        self.status
    }

    pub fn steps(&self) -> &S {
        &self.steps
    }

    pub fn step1_data_extraction(&mut self) -> Result<(), RpaError> {
        self.steps.extract().map_err(|reason| step_error("extract", reason))?;
        self.status = WorkflowStatus::DataExtracted;
        Ok(())
    }

    pub fn step2_data_transformation(&mut self) -> Result<(), RpaError> {
        self.steps.transform().map_err(|reason| step_error("transform", reason))?;
        self.status = WorkflowStatus::DataTransformed;
        Ok(())
    }

    pub fn step3_data_loading(&mut self) -> Result<(), RpaError> {
        self.steps.load().map_err(|reason| step_error("load", reason))?;
        self.status = WorkflowStatus::DataLoaded;
        Ok(())
    }

    /// Runs the three steps in order. The returned report says `completed`;
    /// the workflow itself stays at `data_loaded`.
    pub fn execute_workflow(&mut self) -> Result<WorkflowReport, RpaError> {
        self.step1_data_extraction()?;
        self.step2_data_transformation()?;
        self.step3_data_loading()?;
        self.finish()
    }

    /// Report for a workflow whose steps have already run. Steps are not
    /// run again.
    pub fn finish(&self) -> Result<WorkflowReport, RpaError> {
        if self.status != WorkflowStatus::DataLoaded {
            return Err(RpaError::WorkflowError {
                step: "finish".to_string(),
                reason: format!("workflow stopped at {}", self.status),
            });
        }
        Ok(WorkflowReport { status: WorkflowStatus::Completed })
    }

    /// Same as [`Workflow::execute_workflow`], with a start and a completion
    /// entry per step (`business`).
    pub async fn execute_logged(&mut self, logger: &RpaLogger) -> Result<WorkflowReport, RpaError> {
        logger.log_info("step1_data_extraction", "Starting data extraction", ProcessType::Business).await;
        self.step1_data_extraction()?;
        logger.log_success("step1_data_extraction", "Data extraction completed", ProcessType::Business).await;

        logger.log_info("step2_data_transformation", "Starting data transformation", ProcessType::Business).await;
        self.step2_data_transformation()?;
        logger.log_success("step2_data_transformation", "Data transformation completed", ProcessType::Business).await;

        logger.log_info("step3_data_loading", "Starting data loading", ProcessType::Business).await;
        self.step3_data_loading()?;
        logger.log_success("step3_data_loading", "Data loading completed", ProcessType::Business).await;

        self.finish()
    }
}

fn step_error(step: &str, reason: String) -> RpaError {
    RpaError::WorkflowError { step: step.to_string(), reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn execute_workflow_completes() {
        let mut workflow = Workflow::new();
        assert_eq!(workflow.status(), WorkflowStatus::Initialized);
        let report = workflow.execute_workflow().unwrap();
        assert_eq!(report.status, WorkflowStatus::Completed);
        assert_eq!(workflow.status(), WorkflowStatus::DataLoaded);
    }

    #[test]
    fn steps_advance_status_one_by_one() {
        let mut workflow = Workflow::new();
        workflow.step1_data_extraction().unwrap();
        assert_eq!(workflow.status(), WorkflowStatus::DataExtracted);
        workflow.step2_data_transformation().unwrap();
        assert_eq!(workflow.status(), WorkflowStatus::DataTransformed);
        workflow.step3_data_loading().unwrap();
        assert_eq!(workflow.status().as_str(), "data_loaded");
    }

    struct FailingTransform {
        extracted: usize,
    }

    impl WorkflowSteps for FailingTransform {
        fn extract(&mut self) -> Result<(), String> {
            self.extracted += 1;
            Ok(())
        }

        fn transform(&mut self) -> Result<(), String> {
            Err("bad row 7".into())
        }
    }

    #[test]
    fn finish_requires_all_steps() {
        let mut workflow = Workflow::new();
        assert!(workflow.finish().is_err());
        workflow.step1_data_extraction().unwrap();
        workflow.step2_data_transformation().unwrap();
        workflow.step3_data_loading().unwrap();
        assert_eq!(workflow.finish().unwrap().status, WorkflowStatus::Completed);
    }

    #[test]
    fn failing_step_keeps_last_good_status() {
        let mut workflow = Workflow::with_steps(FailingTransform { extracted: 0 });
        let err = workflow.execute_workflow().unwrap_err();
        assert!(matches!(err, RpaError::WorkflowError { ref step, .. } if step == "transform"));
        assert_eq!(workflow.status(), WorkflowStatus::DataExtracted);
        assert_eq!(workflow.steps().extracted, 1);
    }
}
