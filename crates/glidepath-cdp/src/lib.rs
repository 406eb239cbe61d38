//! # Glidepath CDP
//!
//! Drives a real Chrome tab over the DevTools Protocol.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let client = CdpClient::connect("http://localhost:9222").await?;
//! let session = Arc::new(client.attach_first_page(Some("login")).await?);
//! let page = CdpSliderPage::new(session.clone());
//! let locator = Locator::new(&session);
//! ```
//!
//! Start Chrome with `--remote-debugging-port=9222` first.

mod client;
mod error;
mod locator;
mod page;
mod protocol;
pub mod scripts;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use locator::{BehaviorSlider, Locator, PuzzleSlider};
pub use page::{CdpSliderPage, PointerMode};
pub use protocol::{MouseButton, MouseEventType, PageInfo, RemoteObject};
pub use session::PageSession;
