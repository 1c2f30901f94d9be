mod channel;
mod helpers;
mod scenario;
mod supervisor;
mod transport;
