//! Lead response assistant.
//!
//! Drafts replies to customer enquiries by sending a fixed policy prompt,
//! a tone instruction and the enquiry to a hosted chat-completion model.
//!
//! See `DESIGN.md` for the module map.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod credentials;
pub mod logging;
pub mod providers;

pub mod client;
pub mod prompt;
pub mod session;

pub mod web;
