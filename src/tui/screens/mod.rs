//! TUI screen drawing functions.

pub(crate) mod form;
