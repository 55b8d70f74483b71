//! # examplan Core Library
//!
//! This library turns a photo of an exam timetable into a one-day study
//! plan. It follows a CLI-first layout: the `examplan` binary is a thin
//! front end over the same library.
//!
//! ## Architecture
//!
//! - **Wizard**: a four-step state machine (upload, review, activities,
//!   generate) that owns all collected form state
//! - **Model client**: chat session against the Gemini `generateContent`
//!   API, behind the [`ModelClient`] trait
//! - **Prompt builder / parser**: fixed prompts out, fenced JSON and plain
//!   text plans in
//! - **Observance**: daily prayer time windows for the plan prompt
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Wizard`]: Core wizard state machine
//! - [`GeminiClient`]: Model service client
//! - [`Config`]: Application configuration management

pub mod activities;
pub mod ai;
pub mod error;
pub mod exam;
pub mod observance;
pub mod parser;
pub mod prompt;
pub mod storage;
pub mod wizard;

pub use activities::{ActivityField, ActivityValue, DailyActivityProfile};
pub use ai::{GeminiClient, ImageUpload, ModelClient, ModelConfig};
pub use error::{ConfigError, CoreError, ValidationError};
pub use exam::{ConfidenceLevel, ConfidenceMap, ExamEntry, ExamSchedule};
pub use observance::{ObservanceConfig, PrayerTimes};
pub use parser::{parse_extraction_response, partition_schedule, ScheduleSection};
pub use storage::Config;
pub use wizard::{Wizard, WizardState, WizardStep};
