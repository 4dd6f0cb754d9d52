mod integration_server;

pub use integration_server::*;
