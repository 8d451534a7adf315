pub mod engine;
mod feed;
pub mod progress;
pub mod session;
pub mod state;
mod store;

pub use engine::{EngineCommand, EngineError, PlaybackEngine, PositionReport};
pub use feed::{FeedStats, PositionFeed, PositionPoller};
pub use progress::{PlayerEvent, PlayerSnapshot};
pub use session::{SkipDirection, VolumeState};
pub use store::PlayerStore;
