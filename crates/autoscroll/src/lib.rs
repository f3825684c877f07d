//! Autoscroll core for the PDF viewer.
//!
//! Converts a user-chosen speed into sub-pixel accurate scroll movement,
//! detects the end of the document and arbitrates between automatic and
//! manual scrolling.
//!
//! Everything runs on a single cooperative loop. A [`ViewingSession`] owns
//! all mutable state; [`FrameLoop`] drives it frame by frame and delivers
//! queued input between frames.
//!
//! # Example
//!
//! ```
//! use autoscroll_core::{
//!     AutoscrollConfig, DeviceClass, Document, FrameLoop, PageSurface, PlaybackState,
//!     ViewingSession,
//! };
//! use std::time::Duration;
//!
//! let mut session = ViewingSession::new(AutoscrollConfig::default(), DeviceClass::Regular);
//! let document = Document::new(vec![PageSurface::new(800.0, 1200.0); 3], 20.0);
//! session.open_document(document, 600.0);
//!
//! let mut frame_loop = FrameLoop::new(session);
//! frame_loop.session_mut().start();
//! frame_loop.run_for(Duration::from_secs(2));
//!
//! assert_eq!(frame_loop.session().state(), PlaybackState::Playing);
//! assert!(frame_loop.session().position_px() > 0.0);
//! ```

mod accumulator;
mod clock;
mod command;
mod config;
mod document;
mod frame_loop;
mod interaction;
mod session;
mod speed;
mod status;
mod timer;

pub use accumulator::ScrollAccumulator;
pub use clock::FrameClock;
pub use command::{command_for_key, Command, FocusTarget, Key};
pub use config::{AutoscrollConfig, ConfigError};
pub use document::{Document, PageSurface, Viewport};
pub use frame_loop::{FrameLoop, Input, DEFAULT_FRAME_INTERVAL};
pub use interaction::{InteractionEvent, InteractionMonitor};
pub use session::{
    FrameOutcome, PlaybackState, ScrollState, SessionEvent, StartOutcome, ViewingSession,
};
pub use speed::{speed_to_rate, DeviceClass, SpeedSetting, MIN_SPEED_FLOOR};
pub use status::Status;
pub use timer::{DeferredTask, TaskTicket};
