//! Incremental flow and box layout.
//!
//! Markup events arrive one at a time and are laid out immediately into a
//! [`DisplayTree`](numbat_display::DisplayTree) of rectangles, text runs and
//! images, using saturating fixed-point geometry throughout.
//!
//! - **Session** - drives an [`Event`] stream and keeps the stack in step
//! - **Dispatcher** - [`LayoutContext::dispatch`], the per-event state machine
//! - **Line finalizer** - [`LayoutContext::finalize_line`], baseline grouping
//!   and `text-align`
//! - **Stack** - one [`Frame`] per open element
//!
//! # Example
//!
//! ```
//! use numbat_layout::{ElementStart, Event, LayoutConfig, Session};
//!
//! let mut session = Session::with_fixed_pitch(&LayoutConfig::default());
//! session
//!     .run(&[
//!         Event::Start(ElementStart::new("div")),
//!         Event::Text("Hi".to_string()),
//!         Event::End("div".to_string()),
//!         Event::Complete,
//!     ])
//!     .unwrap();
//! assert_eq!(session.tree().len(), 2);
//! ```

pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod font_choice;
pub mod line;
pub mod session;
pub mod stack;

pub use config::LayoutConfig;
pub use context::LayoutContext;
pub use dispatch::Reason;
pub use error::{ConfigError, LayoutError};
pub use event::{ElementStart, Event};
pub use session::Session;
pub use stack::{Cursor, Frame, LayoutStack};
