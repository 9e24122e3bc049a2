//! Configuration for FormGuard
//!
//! The shared crate only knows the contact form settings. Loading them from
//! disk is left to the host; the backend embeds [`FormSettings`] in its YAML
//! configuration file.

pub mod form_settings;

pub use form_settings::*;
