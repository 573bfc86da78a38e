//! Danci webview client
//!
//! Client-side state for the vocabulary trainer running inside a webview host:
//! - `bridge`: message envelope, host transports, handler registry, dev simulator
//! - `messages`: typed commands and backend events
//! - `stores`: learning / settings / theme state behind watch channels
//! - `app`: wires one bridge and the stores together at startup

pub mod app;
pub mod bridge;
pub mod color;
pub mod config;
pub mod logging;
pub mod messages;
pub mod stores;
pub mod theme_config;

pub use app::App;
pub use bridge::{Bridge, BridgeError, DispatchOutcome};
pub use config::Config;
