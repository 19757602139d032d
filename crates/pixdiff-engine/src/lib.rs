//! pixdiff-engine - external pixel-engine protocol
//!
//! Bulk pixel operations can run in a separate engine process that speaks a
//! small binary protocol over its standard streams:
//!
//! - [`protocol`] - request, command and response encoding
//! - [`EngineChannel`] / [`ProcessEngine`] - the client, usable as a
//!   [`PixelEngine`](pixdiff_core::PixelEngine) for any bitmap
//! - [`serve`] - the engine side, used by the `bitmaptools` binary
//!
//! ```no_run
//! use std::sync::Arc;
//! use pixdiff_core::{Bitmap, RgbaColor};
//! use pixdiff_engine::ProcessEngine;
//!
//! let bmp = Bitmap::new(3, 1, 1, vec![255, 255, 255])
//!     .unwrap()
//!     .with_engine(Arc::new(ProcessEngine::from_env()));
//! let bb = bmp.get_bounding_box(RgbaColor::WHITE, 0).unwrap();
//! assert_eq!(bb.match_count, 1);
//! ```

mod client;
pub mod protocol;
mod server;

pub use client::{DEFAULT_ENGINE, ENGINE_ENV, EngineChannel, EngineConfig, ProcessEngine};
pub use protocol::Command;
pub use server::{serve, serve_with};
