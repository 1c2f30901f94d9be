use std::time::Duration;

/// Default bound of the pending queue kept while no peer is connected.
pub const DEFAULT_PENDING_CAPACITY: usize = 32;

/// Default bound of decoded commands waiting for the router.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// Largest accepted frame body. Longer frames end the session.
pub const MAX_FRAME_LENGTH: usize = 1024 * 1024;

/// How long the worker keeps retrying to reach the controller.
pub const CONNECT_BACKOFF_BUDGET: Duration = Duration::from_secs(10);

/// Bus name shared by launcher and player.
pub const DEFAULT_BUS_NAME: &str = "DynamicDesktop.CommandBus";

/// What `send` does while no peer is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingPolicy {
    /// Keep the most recent commands up to the capacity, dropping the oldest.
    #[default]
    Buffer,
    /// Reject with `ChannelError::Disconnected`.
    FailFast,
}

#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub pending_capacity: usize,
    pub pending_policy: PendingPolicy,
    pub inbox_capacity: usize,
    pub max_frame_length: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            pending_capacity: DEFAULT_PENDING_CAPACITY,
            pending_policy: PendingPolicy::default(),
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            max_frame_length: MAX_FRAME_LENGTH,
        }
    }
}
