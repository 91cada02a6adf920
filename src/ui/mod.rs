//! Metacard detail panel: status tracking, throttling and composition.
pub mod clock;
pub mod status;
pub mod throttle;
pub mod tracker;
pub mod view;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use status::{ClassList, DisplayFlags, IS_SEARCHING_CLASS, NOT_FOUND_CLASS, PresentationNode};
pub use throttle::TrailingThrottle;
pub use tracker::{SelectionTracker, TrackerState};
pub use view::{DetailLayout, DetailLayoutFactory, LayoutOptions, MetacardView, PanelMsg, Region};
