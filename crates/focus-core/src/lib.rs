//! # Focus Core Library
//!
//! Core logic for the Focus work/break interval timer. A thin shell (the
//! `focus` CLI, or any GUI) drives it and renders what it reports.
//!
//! ## Architecture
//!
//! - **Session machine**: owns running/paused, the current phase and the
//!   elapsed time; advances on a 1 Hz tick delivered by a timer service
//! - **Reminder scheduler**: randomized double-beep reminders during work
//! - **Alerts**: procedurally synthesized tones played through an audio sink,
//!   plus best-effort desktop notifications
//! - **Runtime**: a tokio task that serializes every command and timer fire
//! - **Storage**: TOML configuration for phase lengths and reminder timing
//!
//! ## Key Components
//!
//! - [`SessionMachine`]: session state machine
//! - [`ReminderScheduler`]: focus reminder timing
//! - [`AlertDispatcher`]: sound and notification fan-out
//! - [`Config`]: application configuration management

pub mod alert;
pub mod error;
pub mod events;
pub mod runtime;
pub mod storage;
pub mod timer;

pub use alert::{AlertDispatcher, AlertKind, SampleBuffer};
pub use error::{AlertError, ConfigError, CoreError};
pub use events::Event;
pub use runtime::SessionHandle;
pub use storage::Config;
pub use timer::{
    Phase, ReminderConfig, ReminderScheduler, SessionConfig, SessionMachine, SessionStatus,
    StatusReporter,
};
