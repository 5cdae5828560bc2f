//! CSRF-protected demo server
//!
//! Run with `cargo run --bin rampart-demo`, then:
//!
//! ```text
//! curl -c jar -b jar http://localhost:3000/csrf-token
//! curl -c jar -b jar -H "x-csrf-token: <token>" -d "name=ada" http://localhost:3000/submit
//! ```
//!
//! `PORT` selects the port (default 3000); `RAMPART_ENV=production` marks
//! the secret cookie `Secure`.

use rampart::demo::{self, DEFAULT_PORT};
use rampart::prelude::*;
use rampart_config::EnvLoader;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rampart_config::load_dotenv(None)?;
    let _guard = LogConfig::from_env().init();

    let env = EnvLoader::new(None);
    let port = env.load_parsed::<u16>("PORT")?.unwrap_or(DEFAULT_PORT);
    let config = CsrfConfig::from_loader(&env)?;

    info!(
        secure_cookie = config.secure,
        cookie = %config.cookie_name,
        "CSRF protection enabled"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Server running on port {}", port);

    demo::app(config)?.listen(addr).await?;
    Ok(())
}
