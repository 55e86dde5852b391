//! Doistkit - backup, template and calendar-import toolkit for Todoist
//!
//! This library implements three workflows over the same remote data
//! model: capturing a full account snapshot and replaying it elsewhere,
//! materializing a declarative project/section/task template idempotently,
//! and importing calendar events as tasks with recurrence-rule
//! translation.
//!
//! # Modules
//!
//! * [`backend`] - remote API client and entity data structures
//! * [`backup`] - snapshot capture and restore planning
//! * [`config`] - application configuration management
//! * [`index`] - in-memory name-to-id entity index
//! * [`ics`] - calendar event import
//! * [`rrule`] - recurrence-rule parsing and due-phrase rendering
//! * [`template`] - declarative template materialization
//! * [`utils`] - name normalization and date helpers

/// Remote backend trait, entity types and the HTTP client
pub mod backend;

/// Snapshot capture and restore planning
pub mod backup;

/// Command-line interface definitions
pub mod cli;

/// Configuration module for managing application settings
pub mod config;

/// Calendar event import
pub mod ics;

/// In-memory entity index built from bulk fetches
pub mod index;

/// Logging setup
pub mod logger;

/// Quick task capture from standard input
pub mod quick;

/// Recurrence-rule translation
pub mod rrule;

/// API-token storage
pub mod secrets;

/// Declarative template loading and materialization
pub mod template;

/// Utility functions for normalization and date handling
pub mod utils;
