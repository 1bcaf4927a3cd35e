pub mod api;
#[cfg(feature = "desktop")]
pub mod dashboard;
pub mod resize;
pub mod settings;
pub mod shell;
pub mod timer;
