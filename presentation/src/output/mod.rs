//! Console rendering of chat replies

pub mod console;
