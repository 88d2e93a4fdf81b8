//! Progress indicators shown while delegates work

pub mod reporter;
