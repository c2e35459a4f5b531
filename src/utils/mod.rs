//! Common utilities and helpers

pub mod path;
pub mod platform;

pub use platform::PlatformProfile;
