//! Configuration module for Sifter.
//!
//! Handles request parameter names, per-resource allow-lists and the table
//! schema used by the SQL sink.

mod settings;

pub use settings::{
    ParameterNames, RelationSettings, ResourceSettings, Settings, SettingsError, TableSettings,
};
