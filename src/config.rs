use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;

/// Interactive customer churn dashboard
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Churn dataset (.csv, .tsv, .json or .parquet)
    #[arg(short, long, env = "CHURN_DATA", default_value = "churn.csv")]
    pub data: PathBuf,

    /// Address to bind the HTTP server to
    #[arg(long, env = "CHURN_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to serve the dashboard on
    #[arg(short, long, env = "CHURN_PORT", default_value_t = 8050)]
    pub port: u16,
}

impl Args {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let args = Args::try_parse_from(["churn-dashboard", "--data", "x.parquet", "--port", "9000"]).unwrap();
        assert_eq!(args.data, PathBuf::from("x.parquet"));
        assert_eq!(args.bind_addr().port(), 9000);
    }

    #[test]
    fn rejects_a_bad_host() {
        assert!(Args::try_parse_from(["churn-dashboard", "--host", "not-an-ip"]).is_err());
    }
}
