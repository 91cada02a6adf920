pub mod types;

pub use types::{LifecycleEvent, Metacard, ResultId};
