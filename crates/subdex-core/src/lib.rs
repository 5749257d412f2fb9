#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
pub mod endings;
pub mod error;
pub mod normalize;
pub mod table;
pub mod traits;
pub mod transform;
pub mod types;

pub use error::{Error, Result};
