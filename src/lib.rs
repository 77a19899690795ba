pub mod config;
pub mod context;
pub mod error;
pub mod git;
pub mod manifest;
pub mod metadata;
pub mod pipeline;
pub mod platform;
pub mod process;
pub mod resolver;
pub mod stamper;
pub mod ui;
pub mod version;
pub mod warning;

pub use error::{Result, StampError};
