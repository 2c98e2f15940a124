pub mod accumulator;
pub mod controller;
pub mod cursor;
pub mod hydrator;

pub use controller::{ControllerState, FeedController, FeedState, PageOutcome, PageReport};
pub use cursor::PartitionCursorSet;
pub use hydrator::Hydrator;
