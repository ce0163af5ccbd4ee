mod application;
pub mod data;
mod repl;
mod runtime_config;

pub use application::{Application, ApplicationError};
pub use repl::Repl;
pub use runtime_config::RuntimeConfig;
