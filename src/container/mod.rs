//! Persistent containers and their transient forms

mod map;
mod set;
mod transient;

pub use map::{Map, MapIter};
pub use set::Set;
pub use transient::{MapTransient, SetTransient};
