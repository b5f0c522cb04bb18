//! PalmCursor Frame Model
//!
//! Defines the data contracts at the boundaries of the gesture pipeline:
//! - **Frames:** Timestamped hand landmark sets with a gesture reading
//! - **Smoothed frames:** Filtered pointer position, velocity, prediction
//! - **Actions:** Pointer actions (move / down / up / cancel) for emission
//! - **Streams:** JSONL encoding of frame and action sequences
//!
//! All coordinates are normalized to `[0.0, 1.0]` relative to the
//! tracked image.

pub mod action;
pub mod frame;
pub mod geometry;
pub mod stream;
pub mod synthetic;

pub use action::*;
pub use frame::*;
pub use geometry::*;
pub use stream::*;
