//! Unit tests for codeflux modules
//!
//! These tests cover individual components without network I/O.

mod test_config;
mod test_content;
mod test_flow;
mod test_playback;
mod test_progress;
mod test_quiz;
mod test_view;
