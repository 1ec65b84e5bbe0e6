//! Stitchview - needlepoint pattern previews
//!
//! Renders generated needlepoint patterns as gridded previews with a color
//! legend, talks to the pattern generation server, and serves previews over
//! HTTP. This library exposes modules for integration testing.

pub mod api;
pub mod error;
pub mod models;
pub mod rendering;
pub mod server;
pub mod services;
