//! linkhub - A multi-tenant URL shortener
//!
//! Short links on a base domain and on custom domains, with per-user quotas,
//! passcode + CAPTCHA protection, expiry with optional auto-delete and a
//! server-rendered admin console.
//!
//! # Architecture
//! - `api`: HTTP routes, session and access-control middleware
//! - `cli`: clap command definitions
//! - `config`: static TOML/env configuration and the editable site settings
//! - `errors`: application error type
//! - `interfaces`: CLI maintenance commands
//! - `runtime`: application lifecycle and execution modes
//! - `services`: business logic shared by HTTP handlers and the CLI
//! - `storage`: SeaORM data access
//! - `system`: logging
//! - `utils`: short codes, passwords, CAPTCHA, time and URL helpers
//! - `views`: HTML rendering

pub mod api;
pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
pub mod views;
