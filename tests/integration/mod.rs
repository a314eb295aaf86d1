//! Integration tests for codeflux
//!
//! These drive the built binary against a throwaway store and config. No
//! test here talks to the tutor service.

mod cli_tests;
mod helpers;

pub use helpers::*;
