use clap::Parser;
use core::time::Duration;

/// Demonstration client for the order management service.
#[derive(Parser, Debug, Clone)]
#[command(name = "ordermgt-client", version, about)]
pub struct CliArgs {
    /// Server URI.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("http://127.0.0.1:50051"))]
    pub server_addr: String,

    /// Deadline in seconds applied to connecting and to each unary call.
    ///
    /// Environment variable: `TIMEOUT_SECS`
    #[arg(long, env = "TIMEOUT_SECS", default_value_t = 5)]
    pub timeout_secs: u64,
}

impl CliArgs {
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
