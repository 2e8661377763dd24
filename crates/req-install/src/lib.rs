//! req-install library - expose modules for testing
//!
//! The binary is a thin shell around [`installer::install_requirements_with`].

pub mod cli;
pub mod common;
pub mod errors;
pub mod installer;

pub use common::GlobalOpts;
