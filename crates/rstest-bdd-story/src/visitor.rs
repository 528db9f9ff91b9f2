//! Callback surfaces of a Gherkin runner.
//!
//! Runners report structure (features, scenarios, declared steps) and
//! execution (matches, results) through separate channels.
//! [`StructureVisitor`] and [`ResultVisitor`] model those channels; the
//! translator implements both. Callbacks the translator has no use for have
//! no-op defaults.

use crate::error::StoryError;
use crate::model::{ExamplesNode, FeatureNode, ScenarioNode, StepMatch, StepNode, StepResult};

/// Structural callbacks: the shape of the feature being executed.
pub trait StructureVisitor {
    /// The runner opened a feature file at `uri`.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn uri_declared(&mut self, uri: &str) -> Result<(), StoryError> {
        let _ = uri;
        Ok(())
    }

    /// The runner entered a feature.
    ///
    /// # Errors
    ///
    /// Implementations return [`StoryError`] when the callback cannot be
    /// translated.
    fn feature_entered(&mut self, feature: &FeatureNode) -> Result<(), StoryError>;

    /// A background section was declared.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn background_declared(&mut self, background: &ScenarioNode) -> Result<(), StoryError> {
        let _ = background;
        Ok(())
    }

    /// A plain scenario was declared.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn scenario_declared(&mut self, scenario: &ScenarioNode) -> Result<(), StoryError> {
        let _ = scenario;
        Ok(())
    }

    /// A scenario outline was declared.
    ///
    /// # Errors
    ///
    /// Implementations return [`StoryError`] when the callback cannot be
    /// translated.
    fn outline_declared(&mut self, outline: &ScenarioNode) -> Result<(), StoryError>;

    /// An examples block of the current outline was declared.
    ///
    /// # Errors
    ///
    /// Implementations return [`StoryError`] for malformed tables.
    fn examples_declared(&mut self, block: &ExamplesNode) -> Result<(), StoryError>;

    /// A scenario, or one example of an outline, is about to run.
    ///
    /// # Errors
    ///
    /// Implementations return [`StoryError`] when the callback cannot be
    /// translated.
    fn scenario_entered(&mut self, scenario: &ScenarioNode) -> Result<(), StoryError>;

    /// The scenario, or example, that was running has finished.
    ///
    /// # Errors
    ///
    /// Implementations return [`StoryError`] when reports cannot be
    /// generated.
    fn scenario_exited(&mut self, scenario: &ScenarioNode) -> Result<(), StoryError>;

    /// A step of the running scenario was declared.
    ///
    /// # Errors
    ///
    /// Implementations return [`StoryError`] when the callback cannot be
    /// translated.
    fn step_declared(&mut self, step: &StepNode) -> Result<(), StoryError>;

    /// The runner finished every feature.
    ///
    /// # Errors
    ///
    /// Implementations return [`StoryError`] when the callback cannot be
    /// translated.
    fn suite_ended(&mut self) -> Result<(), StoryError>;

    /// The runner closed its output.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn closed(&mut self) -> Result<(), StoryError> {
        Ok(())
    }

    /// The end of the current feature file was reached.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn eof(&mut self) -> Result<(), StoryError> {
        Ok(())
    }

    /// The current feature file could not be parsed.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn syntax_error(&mut self, message: &str) -> Result<(), StoryError> {
        let _ = message;
        Ok(())
    }
}

/// Execution callbacks: what happened to each declared step.
pub trait ResultVisitor {
    /// A before hook ran.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn before_hook(&mut self, result: &StepResult) -> Result<(), StoryError> {
        let _ = result;
        Ok(())
    }

    /// The runner bound a step, or a hook, to its implementation.
    ///
    /// # Errors
    ///
    /// Implementations return [`StoryError`] when no step is pending.
    fn match_found(&mut self, step_match: &StepMatch) -> Result<(), StoryError>;

    /// The runner reported the result of the oldest pending step.
    ///
    /// # Errors
    ///
    /// Implementations return [`StoryError`] when no step is pending.
    fn result_reported(&mut self, result: &StepResult) -> Result<(), StoryError>;

    /// An after hook ran.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn after_hook(&mut self, result: &StepResult) -> Result<(), StoryError> {
        let _ = result;
        Ok(())
    }

    /// A step attached binary data to the report.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn embedding(&mut self, mime_type: &str, data: &[u8]) -> Result<(), StoryError> {
        let _ = (mime_type, data);
        Ok(())
    }

    /// A step wrote text to the report.
    ///
    /// # Errors
    ///
    /// The default implementation never fails.
    fn output_written(&mut self, text: &str) -> Result<(), StoryError> {
        let _ = text;
        Ok(())
    }
}
