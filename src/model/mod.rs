//! Archive data model: content identities and node/root descriptions

mod description;
mod id;

pub(crate) use description::{branch_identity, collision_identity};
pub use description::{ContainerKind, NodeDescription, RootDescription};
pub use id::ContainerId;
