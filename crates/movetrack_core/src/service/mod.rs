//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store, projection and reconciliation into session-level APIs.
//! - Keep UI callers decoupled from storage and wire-format details.
//!
//! # See also
//! - docs/architecture/data-model.md

pub mod session;
