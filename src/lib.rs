// Now-playing synchronization core: keeps the displayed playback position
// consistent between engine position reports, scrubbing and track changes.

pub mod config;
pub mod playback;

pub use config::PlayerConfig;
pub use playback::PlayerStore;

// Test support (only available with test-utils feature)
#[cfg(feature = "test-utils")]
pub mod test_support;
