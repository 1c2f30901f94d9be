use std::fmt::{Display, Formatter, Result as FormatResult};

/// Which side of the command bus a channel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Controller,
    Worker,
}

impl Display for Endpoint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            Endpoint::Controller => write!(formatter, "controller"),
            Endpoint::Worker => write!(formatter, "worker"),
        }
    }
}

/// Lifecycle of the session between the two endpoints.
///
/// `Disconnected -> Connecting -> Connected -> Disconnected`, repeatable until the
/// channel is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}
