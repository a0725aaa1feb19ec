pub mod server;

use crate::api::handlers::auth::AuthConfig;

#[derive(Debug, Clone)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        auth: AuthConfig,
    },
}
