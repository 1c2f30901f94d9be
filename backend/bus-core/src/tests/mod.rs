mod controller_router;
mod helpers;
mod settings;
mod worker_router;
