use anyhow::bail;
use clap::Parser;
use core::num::NonZeroUsize;
use ordermgt_core::types::DEFAULT_BATCH_SIZE;
use std::path::PathBuf;

/// Runtime configuration for the `ordermgt-server` binary.
///
/// Every value can come from a CLI flag or an environment variable (which may
/// itself come from a `.env` file).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ordermgt-server",
    version,
    about = "A gRPC service for managing orders and consolidating shipments"
)]
pub struct CliArgs {
    /// Number of order references collected before combined shipments are
    /// flushed back on a `ProcessOrders` stream.
    ///
    /// Larger values mean fewer, larger shipments at the cost of latency:
    /// an order can wait for up to this many references before it ships.
    ///
    /// Environment variable: `BATCH_SIZE`
    #[arg(long, env = "BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: NonZeroUsize,

    /// Capacity of the channel between a streaming task and its gRPC
    /// response stream.
    ///
    /// A full channel suspends the producer until the client catches up.
    ///
    /// Environment variable: `STREAM_BUFFER_SIZE`
    #[arg(long, env = "STREAM_BUFFER_SIZE", default_value_t = 8)]
    pub stream_buffer_size: usize,

    /// Seconds to wait for in-flight streams to finish on shutdown before
    /// cancelling them.
    ///
    /// Environment variable: `SHUTDOWN_TIMEOUT`
    #[arg(long, env = "SHUTDOWN_TIMEOUT", default_value_t = 3)]
    pub shutdown_timeout: u64,

    /// JSON file holding an array of orders to seed the store with.
    ///
    /// Takes precedence over the built-in sample data.
    ///
    /// Environment variable: `SEED_FILE`
    #[arg(long, env = "SEED_FILE")]
    pub seed_file: Option<PathBuf>,

    /// Start with an empty store instead of the built-in sample orders.
    #[arg(long, default_value_t = false)]
    pub no_sample_data: bool,

    /// Address to listen on (TCP or Unix socket path; use --uds for Unix socket).
    ///
    /// Example: "0.0.0.0:50051" or "/tmp/ordermgt.sock"
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:50051"))]
    pub server_addr: String,

    /// Listen on a Unix socket instead of TCP. If set, `SERVER_ADDR` must be a file path.
    #[arg(short, long, default_value_t = false)]
    pub uds: bool,
}

/// How the order store is populated at start-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedSource {
    Empty,
    SampleData,
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub batch_size: NonZeroUsize,
    pub stream_buffer_size: usize,
    pub shutdown_timeout: u64,
    pub seed: SeedSource,
    pub server_addr: String,
    pub uds: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            stream_buffer_size: 8,
            shutdown_timeout: 3,
            seed: SeedSource::SampleData,
            server_addr: String::from("0.0.0.0:50051"),
            uds: false,
        }
    }
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.stream_buffer_size == 0 {
            bail!("STREAM_BUFFER_SIZE must be greater than 0");
        }

        let seed = match (args.seed_file, args.no_sample_data) {
            (Some(path), _) => SeedSource::File(path),
            (None, true) => SeedSource::Empty,
            (None, false) => SeedSource::SampleData,
        };

        Ok(Self {
            batch_size: args.batch_size,
            stream_buffer_size: args.stream_buffer_size,
            shutdown_timeout: args.shutdown_timeout,
            seed,
            server_addr: args.server_addr,
            uds: args.uds,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<ServerConfig> {
        let args = CliArgs::try_parse_from(std::iter::once("ordermgt-server").chain(args.iter().copied()))?;
        ServerConfig::try_from(args)
    }

    #[test]
    fn defaults_match_documentation() {
        let config = parse(&[]).unwrap();
        assert_eq!(config.batch_size.get(), 3);
        assert_eq!(config.stream_buffer_size, 8);
        assert_eq!(config.seed, SeedSource::SampleData);
        assert!(!config.uds);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        assert!(parse(&["--batch-size", "0"]).is_err());
    }

    #[test]
    fn zero_stream_buffer_is_rejected() {
        let err = parse(&["--stream-buffer-size", "0"]).unwrap_err();
        assert!(err.to_string().contains("STREAM_BUFFER_SIZE"));
    }

    #[test]
    fn seed_file_wins_over_sample_flag() {
        let config = parse(&["--seed-file", "orders.json", "--no-sample-data"]).unwrap();
        assert_eq!(config.seed, SeedSource::File(PathBuf::from("orders.json")));

        let config = parse(&["--no-sample-data"]).unwrap();
        assert_eq!(config.seed, SeedSource::Empty);
    }
}
