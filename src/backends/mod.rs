// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for camera capture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │            Pipelines / CLI                   │
//! └────────────────────┬────────────────────────┘
//!                      │
//! ┌────────────────────┴────────────────────────┐
//! │              Backend Layer                   │
//! │  ┌──────────────────┐  ┌─────────────────┐  │
//! │  │     Camera       │  │ Virtual Camera  │  │
//! │  │     (V4L2)       │  │ (image/pattern) │  │
//! │  └──────────────────┘  └─────────────────┘  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Backend traits, sessions and the V4L2 implementation
//! - [`virtual_camera`]: Still image or test pattern served as a stream

pub mod camera;
pub mod virtual_camera;
