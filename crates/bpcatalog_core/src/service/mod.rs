//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and hosting calls into use-case level APIs.
//! - Keep the CLI decoupled from storage and HTTP details.

pub mod contribution_service;
