//! Sequential scenario runner with exact change-flag assertions

use crate::error::ScenarioError;
use crate::key::ResourceKey;
use crate::reconciler::Reconciler;
use crate::types::Desired;

/// A single apply with an exact expectation on the reported change flag.
#[derive(Debug, Clone)]
pub struct Step<D> {
    pub name: String,
    pub desired: Desired<D>,
    pub dry_run: bool,
    pub expect_changed: bool,
}

impl<D> Step<D> {
    /// Apply `config` with `state: present`.
    pub fn present(name: &str, config: D, expect_changed: bool) -> Self {
        Self {
            name: name.to_string(),
            desired: Desired::Present(config),
            dry_run: false,
            expect_changed,
        }
    }

    /// Apply `state: absent`.
    pub fn absent(name: &str, expect_changed: bool) -> Self {
        Self {
            name: name.to_string(),
            desired: Desired::Absent,
            dry_run: false,
            expect_changed,
        }
    }

    /// Run this step in check mode.
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// An ordered sequence of steps sharing one resource key.
#[derive(Debug, Clone)]
pub struct Scenario<D> {
    pub name: String,
    pub steps: Vec<Step<D>>,
}

impl<D> Scenario<D> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step<D>) -> Self {
        self.steps.push(step);
        self
    }
}

/// Per-step outcome recorded for reporting.
#[derive(Debug)]
pub struct StepOutcome {
    pub step: String,
    pub changed: bool,
    pub dry_run: bool,
}

/// Outcomes of a completed scenario.
#[derive(Debug)]
pub struct Report {
    pub scenario: String,
    pub outcomes: Vec<StepOutcome>,
}

impl<D> Scenario<D> {
    /// Execute the steps in order against `key`, asserting each reported
    /// `changed` flag exactly and aborting on the first violation.
    ///
    /// Every dry-run step is followed by a re-read: if the resource's
    /// presence differs from immediately before the step, the dry run
    /// mutated remote state and the scenario fails. This covers the
    /// dry-run-delete case, where `changed=true` must be reported while the
    /// resource survives.
    pub async fn run<R>(&self, reconciler: &R, key: &ResourceKey) -> Result<Report, ScenarioError>
    where
        R: Reconciler<Desired = D>,
        D: Send + Sync + serde::Serialize,
    {
        let mut report = Report {
            scenario: self.name.clone(),
            outcomes: Vec::new(),
        };

        for step in &self.steps {
            let before = if step.dry_run {
                Some(reconciler.get(key).await?.is_some())
            } else {
                None
            };

            tracing::info!(
                "scenario '{}': applying step '{}' to {}",
                self.name,
                step.name,
                key
            );
            let result = reconciler.apply(key, &step.desired, step.dry_run).await?;

            if result.changed != step.expect_changed {
                return Err(ScenarioError::ChangedMismatch {
                    scenario: self.name.clone(),
                    step: step.name.clone(),
                    expected: step.expect_changed,
                    actual: result.changed,
                });
            }

            if let Some(before) = before {
                let after = reconciler.get(key).await?.is_some();
                if after != before {
                    return Err(ScenarioError::DryRunMutated {
                        scenario: self.name.clone(),
                        step: step.name.clone(),
                        before,
                        after,
                    });
                }
            }

            report.outcomes.push(StepOutcome {
                step: step.name.clone(),
                changed: result.changed,
                dry_run: step.dry_run,
            });
        }

        Ok(report)
    }
}
