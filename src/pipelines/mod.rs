// SPDX-License-Identifier: GPL-3.0-only

//! Processing pipelines
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │ JPEG / PNG   │
//! │   (RGBA)     │     │  - Mirror         │     │  bytes       │
//! │              │     │  - Colour filter  │     │              │
//! │              │     │  - Encoding       │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: One-shot photo capture with filters and encoding

pub mod photo;
