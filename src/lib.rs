pub mod auth;
pub mod config;
pub mod console;
pub mod driver;
pub mod kernel;
pub mod services;
pub mod workflow;

pub use driver::Driver;
pub use kernel::reactor::Reactor;
