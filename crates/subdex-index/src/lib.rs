#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod artifact;
pub mod flat;
pub mod search;

pub use artifact::Artifact;
pub use flat::FlatIndex;
pub use search::{SearchEngine, SearchOutcome};
