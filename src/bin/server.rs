use clap::Parser;
use tracing::{debug, info, warn};

use oxidis::db::Db;
use oxidis::{persistence, server, Error};

const PORT: u16 = 6379;
const SNAPSHOT_PATH: &str = "dump.rdb";

#[derive(Parser, Debug)]
struct Args {
    /// The port to listen on
    #[arg(short, long, default_value_t = PORT)]
    port: u16,

    /// Path to the snapshot file
    #[arg(long, default_value = SNAPSHOT_PATH)]
    dbfilename: String,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let args = Args::parse();

    tracing_subscriber::fmt().init();

    let db = Db::new(args.dbfilename);

    match db.persistence.load() {
        Ok(result) => info!(
            "loaded snapshot: {} keys (strings={}, lists={}, hashes={}, sets={})",
            result.total_keys(),
            result.string_keys,
            result.list_keys,
            result.hash_keys,
            result.set_keys,
        ),
        Err(persistence::Error::NoSnapshot) => debug!("no snapshot file, starting empty"),
        Err(err) => warn!("failed to load snapshot: {}", err),
    }

    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received");
    };

    server::run(args.port, db, shutdown).await
}
