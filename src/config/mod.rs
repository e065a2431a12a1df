mod resolver;
mod server;

pub use self::{
    resolver::{ConfigResolver, ConfigSource, PRIVATE_KEY_NAME, ScriptProperties},
    server::ServerConfig,
};
