// tests/test_workflow.rs
use rpa_bot_kit::RpaError;
use rpa_bot_kit::loggers::LoggerBuilder;
use rpa_bot_kit::workflows::{Workflow, WorkflowStatus, WorkflowSteps};

#[derive(Default)]
struct CountingSteps {
    extracted: usize,
    transformed: usize,
    loaded: usize,
    fail_load: bool,
}

impl WorkflowSteps for CountingSteps {
    fn extract(&mut self) -> Result<(), String> {
        self.extracted += 1;
        Ok(())
    }

    fn transform(&mut self) -> Result<(), String> {
        self.transformed += 1;
        Ok(())
    }

    fn load(&mut self) -> Result<(), String> {
        self.loaded += 1;
        if self.fail_load { Err("target table locked".into()) } else { Ok(()) }
    }
}

#[tokio::test]
async fn logged_run_executes_each_step_once() {
    let dir = tempfile::tempdir().unwrap();
    let logger = LoggerBuilder::new("wf").with_log_dir(dir.path()).build().unwrap();
    let mut workflow = Workflow::with_steps(CountingSteps::default());

    let report = workflow.execute_logged(&logger).await.unwrap();
    assert_eq!(report.status, WorkflowStatus::Completed);
    assert_eq!(workflow.status(), WorkflowStatus::DataLoaded);

    let steps = workflow.steps();
    assert_eq!((steps.extracted, steps.transformed, steps.loaded), (1, 1, 1));

    let content = std::fs::read_to_string(logger.log_path()).unwrap();
    let rows: Vec<_> = content.lines().skip(3).collect();
    assert_eq!(rows.len(), 6);
    assert!(rows.iter().all(|r| r.contains("| business ")));
    assert!(rows[5].contains("Data loading completed"));
}

#[tokio::test]
async fn failed_step_stops_the_logged_run() {
    let dir = tempfile::tempdir().unwrap();
    let logger = LoggerBuilder::new("wf").with_log_dir(dir.path()).build().unwrap();
    let mut workflow = Workflow::with_steps(CountingSteps { fail_load: true, ..Default::default() });

    let err = workflow.execute_logged(&logger).await.unwrap_err();
    assert!(matches!(err, RpaError::WorkflowError { ref step, .. } if step == "load"));
    assert_eq!(workflow.status(), WorkflowStatus::DataTransformed);
    assert_eq!(workflow.steps().loaded, 1);
    assert!(workflow.finish().is_err());
}
