//! # reportview: Health Report Renderer
//!
//! Turns generated health reports (markdown with inline chart directives plus
//! a parallel array of chart specifications) into HTML with interactive
//! charts, and relays follow-up questions about a report.
//!
//! ## Architecture
//!
//! - **[`directive`]**: Chart directive extraction and placeholder correlation
//! - **[`markdown`]**: Markdown to HTML via pulldown-cmark
//! - **[`surface`]**: Display surface with placeholder lookup (scraper)
//! - **[`chart`]**: Chart model, config builder, charting engine seam, materializer
//! - **[`color`]**: Deterministic dataset palette
//! - **[`report`]**: Report payload, renderer and standalone page
//! - **[`client`]**: `/research` and `/ask` service client (reqwest)
//! - **[`session`]**: Request lifecycle, control locking and error surfacing
//! - **[`config`]**: Configuration loading and validation

pub mod chart;
pub mod client;
pub mod color;
pub mod config;
pub mod diagnostics;
pub mod directive;
pub mod error;
pub mod markdown;
pub mod report;
pub mod session;
pub mod surface;
