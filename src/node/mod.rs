//! Global ids and node resolution

pub mod global_id;
pub mod registry;
pub mod resolver;

pub use global_id::{to_global_id, GlobalId};
pub use registry::{EntityKind, TypeRegistry};
pub use resolver::{Node, NodeResolver, ResolveError};
