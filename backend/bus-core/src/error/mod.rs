pub mod channel;
pub mod command;
pub mod instance;
pub mod settings;
pub mod spawn;

pub use channel::ChannelError;
pub use command::CommandError;
pub use instance::InstanceError;
pub use settings::SettingsError;
pub use spawn::SpawnError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Instance(#[from] InstanceError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Command(#[from] CommandError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}
