//! Command-line interface modules

pub mod inspect;
