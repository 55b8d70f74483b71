//! Four-step study plan wizard.
//!
//! ## State Transitions
//!
//! ```text
//! Upload --(extract + parse ok)--> Review --Next--> Activities --Next--> Generate
//!    ^                               |                  |                  |
//!    +-----------Previous------------+<----Previous-----+<----Previous-----+
//! ```
//!
//! Navigation clamps at both ends. Leaving Upload normally happens through a
//! successful [`Wizard::upload`]; `next()` from Upload or Review is not gated
//! on having an exam list (the plan is then built from activities alone).
//!
//! Uploads are accepted only on the Upload step.
//!
//! Entering Generate arms a single generation call. It runs as part of that
//! transition and is consumed when it succeeds, so reading the schedule
//! again never triggers another request. A failed call stays armed and
//! [`Wizard::ensure_schedule`] retries it. Leaving and re-entering Generate
//! arms a fresh call; [`Wizard::restart`] clears everything.
//!
//! Every async operation borrows the wizard mutably for its whole duration,
//! so no navigation can interleave with a pending request. Dropping the
//! future abandons the request and leaves the state as it was.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::activities::{ActivityField, ActivityValue, DailyActivityProfile};
use crate::ai::{ImageUpload, ModelClient, DEFAULT_MAX_UPLOAD_BYTES};
use crate::error::{CoreError, Result, ValidationError};
use crate::exam::{ConfidenceLevel, ConfidenceMap, ExamEntry};
use crate::observance::{self, ObservanceConfig};
use crate::parser::{self, ScheduleSection};
use crate::prompt;

pub const NO_FILE_MESSAGE: &str = "No file selected";
pub const EXTRACTION_FAILED_MESSAGE: &str = "Failed to process exam schedule";
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate study schedule";
pub const SAVE_NOTICE: &str = "Schedule generated! Consider adding export/save functionality.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WizardStep {
    #[default]
    Upload = 1,
    Review = 2,
    Activities = 3,
    Generate = 4,
}

impl WizardStep {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::Upload),
            2 => Some(Self::Review),
            3 => Some(Self::Activities),
            4 => Some(Self::Generate),
            _ => None,
        }
    }

    /// One step forward, clamped at Generate.
    pub fn next(&self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(Self::Generate)
    }

    /// One step back, clamped at Upload.
    pub fn previous(&self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(Self::Upload)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Upload => "Upload exam schedule",
            Self::Review => "Review exams and confidence",
            Self::Activities => "Daily activities and commitments",
            Self::Generate => "Personalized study schedule",
        }
    }
}

/// Everything the wizard has collected so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    pub step: WizardStep,
    /// `None` until an extraction succeeds.
    pub exams: Option<Vec<ExamEntry>>,
    pub confidence: ConfidenceMap,
    pub activities: DailyActivityProfile,
    pub schedule: Option<String>,
    /// Last user-visible error message.
    pub error: Option<String>,
}

/// The wizard controller.
///
/// The model client is injected, so one configuration serves every request
/// and tests can substitute a fake.
pub struct Wizard<C: ModelClient> {
    client: C,
    observance: ObservanceConfig,
    max_upload_bytes: u64,
    plan_date: Option<NaiveDate>,
    state: WizardState,
    generation_armed: bool,
}

impl<C: ModelClient> Wizard<C> {
    pub fn new(client: C, observance: ObservanceConfig) -> Self {
        Self {
            client,
            observance,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            plan_date: None,
            state: WizardState::default(),
            generation_armed: false,
        }
    }

    pub fn with_upload_limit(mut self, max_bytes: u64) -> Self {
        self.max_upload_bytes = max_bytes;
        self
    }

    /// Fix the date used for prayer windows (defaults to today).
    pub fn with_plan_date(mut self, date: NaiveDate) -> Self {
        self.plan_date = Some(date);
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn step(&self) -> WizardStep {
        self.state.step
    }

    pub fn exams(&self) -> Option<&[ExamEntry]> {
        self.state.exams.as_deref()
    }

    pub fn confidence(&self) -> &ConfidenceMap {
        &self.state.confidence
    }

    pub fn activities(&self) -> &DailyActivityProfile {
        &self.state.activities
    }

    pub fn schedule(&self) -> Option<&str> {
        self.state.schedule.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// The generated plan split into display sections.
    pub fn sections(&self) -> Vec<ScheduleSection> {
        self.schedule()
            .map(parser::partition_schedule)
            .unwrap_or_default()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Extract exams from an image and move to Review.
    ///
    /// On failure the step and any previously extracted exams are kept, a
    /// generic message is recorded, and the typed error is returned. Outside
    /// the Upload step nothing changes and an error is returned.
    pub async fn upload(&mut self, image: Option<ImageUpload>) -> Result<()> {
        self.ensure_upload_step()?;
        let result = self.extract_exams(image).await;
        if let Err(e) = &result {
            self.record_upload_failure(e);
        }
        result
    }

    /// Read an image from disk and [`upload`](Self::upload) it.
    pub async fn upload_file(&mut self, path: &Path) -> Result<()> {
        self.ensure_upload_step()?;
        match ImageUpload::from_path(path, self.max_upload_bytes) {
            Ok(image) => self.upload(Some(image)).await,
            Err(e) => {
                self.record_upload_failure(&e);
                Err(e)
            }
        }
    }

    fn ensure_upload_step(&self) -> Result<()> {
        if self.state.step != WizardStep::Upload {
            return Err(ValidationError::UploadNotAllowed {
                step: self.state.step.number(),
            }
            .into());
        }
        Ok(())
    }

    async fn extract_exams(&mut self, image: Option<ImageUpload>) -> Result<()> {
        let image = image.ok_or(CoreError::NoFileSelected)?;
        let raw = self.client.extract(&image).await?;
        let exams = parser::parse_extraction_response(&raw)?;

        self.state.confidence = ConfidenceMap::from_exams(&exams);
        tracing::info!(exams = exams.len(), "exam schedule extracted");
        self.state.exams = Some(exams);
        self.state.error = None;
        self.state.step = WizardStep::Review;
        Ok(())
    }

    fn record_upload_failure(&mut self, err: &CoreError) {
        tracing::warn!(error = %err, "schedule upload failed");
        let message = match err {
            CoreError::NoFileSelected => NO_FILE_MESSAGE,
            _ => EXTRACTION_FAILED_MESSAGE,
        };
        self.state.error = Some(message.to_string());
    }

    /// Advance one step (clamped at Generate).
    ///
    /// Entering Generate runs the plan request. An `Err` means the step did
    /// advance but generation failed; the message is recorded as well.
    pub async fn next(&mut self) -> Result<WizardStep> {
        let from = self.state.step;
        let to = from.next();
        if to == from {
            return Ok(to);
        }
        if from == WizardStep::Review && self.state.exams.is_none() {
            tracing::warn!("continuing without an extracted exam list");
        }
        self.state.step = to;
        tracing::info!(from = from.number(), to = to.number(), "wizard advanced");

        if to == WizardStep::Generate {
            self.generation_armed = true;
            self.state.schedule = None;
            self.generate_if_armed().await?;
        }
        Ok(to)
    }

    /// Go back one step (clamped at Upload).
    pub fn previous(&mut self) -> WizardStep {
        let from = self.state.step;
        self.state.step = from.previous();
        if self.state.step != from {
            tracing::info!(from = from.number(), to = self.state.step.number(), "wizard went back");
        }
        self.state.step
    }

    /// Schedule for display. Runs the armed generation if no attempt has
    /// succeeded since entering Generate; otherwise makes no request.
    pub async fn ensure_schedule(&mut self) -> Result<Option<&str>> {
        self.generate_if_armed().await?;
        Ok(self.schedule())
    }

    async fn generate_if_armed(&mut self) -> Result<()> {
        if !self.generation_armed || self.state.step != WizardStep::Generate {
            return Ok(());
        }
        let prompt = self.generation_prompt();
        tracing::debug!(chars = prompt.len(), "requesting study schedule");

        match self.client.generate(&prompt).await {
            Ok(text) => {
                self.generation_armed = false;
                tracing::info!(sections = parser::partition_schedule(&text).len(), "study schedule generated");
                self.state.schedule = Some(text);
                self.state.error = None;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "study schedule generation failed");
                self.state.error = Some(GENERATION_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }

    /// The plan request as it would be sent now.
    pub fn generation_prompt(&self) -> String {
        let date = self.plan_date.unwrap_or_else(|| Local::now().date_naive());
        let windows = observance::observance_windows(date, &self.observance);
        prompt::generation_prompt(&self.state.confidence, &self.state.activities, &windows)
    }

    pub fn set_confidence(&mut self, subject: &str, level: ConfidenceLevel) -> Result<()> {
        self.state.confidence.set(subject, level)?;
        tracing::debug!(subject, %level, "confidence updated");
        Ok(())
    }

    pub fn set_activity_field(&mut self, field: ActivityField, value: ActivityValue) -> Result<()> {
        self.state.activities.set_field(field, value)?;
        tracing::debug!(%field, "activity updated");
        Ok(())
    }

    /// Placeholder for exporting the plan; nothing is written anywhere.
    pub fn save_schedule(&self) -> &'static str {
        SAVE_NOTICE
    }

    /// Back to an empty Upload step with a fresh model session.
    pub fn restart(&mut self) {
        self.state = WizardState::default();
        self.generation_armed = false;
        self.client.reset();
        tracing::info!("wizard restarted");
    }
}
