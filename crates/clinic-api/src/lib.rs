pub mod appointments;
pub mod error;
pub mod intake;
pub mod intent;
pub mod notifier;
pub mod queue;
pub mod routes;
pub mod state;
pub mod tokens;
pub mod webhook;
