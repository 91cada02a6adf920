//! Shared selection state observed by the metacard panel.
pub mod context;
pub mod listeners;
pub mod result;

pub use context::{MetacardChanged, ResultChanged, SelectionContext, SelectionSnapshot};
pub use listeners::{Listeners, Subscription};
pub use result::ResultHolder;
