//! # lio-import
//!
//! This is both an application and a library, the library can be used to convert tasks inside
//! your application the same way the `lio-import` binary does.

#[macro_use]
extern crate log;

pub mod error;
pub mod import;
pub mod opt;

pub use import::*;
pub use opt::*;
