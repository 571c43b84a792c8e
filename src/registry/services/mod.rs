//! Registry services.

mod invoke;
mod maintenance;
mod registry;
mod signals;
mod tasks;

pub use registry::AgentRegistry;
pub use tasks::RegistryTasks;
