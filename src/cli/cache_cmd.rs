//! Cache CLI commands

use anyhow::Result;
use clap::Subcommand;
use tracing::debug;

use super::output::DetailBlock;
use crate::storage::{Bucket, CacheStore};

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Drop cached references (every bucket unless --bucket is given)
    Clear {
        #[arg(long, value_enum)]
        bucket: Option<Bucket>,
    },
}

pub fn run(cmd: CacheCommands, cache: &CacheStore) -> Result<String> {
    match cmd {
        CacheCommands::Clear { bucket } => clear(cache, bucket),
    }
}

fn clear(cache: &CacheStore, bucket: Option<Bucket>) -> Result<String> {
    let buckets: Vec<Bucket> = match bucket {
        Some(bucket) => vec![bucket],
        None => Bucket::ALL.to_vec(),
    };

    let mut removed = 0;
    for bucket in &buckets {
        if cache.clear_bucket(*bucket)? {
            removed += 1;
        } else {
            debug!(bucket = bucket.as_str(), "bucket already empty");
        }
    }

    let names: Vec<&str> = buckets.iter().map(Bucket::as_str).collect();
    let block = DetailBlock::new("CACHE_CLEARED")
        .field("BUCKETS", names.join(","))
        .field("REMOVED", removed.to_string());
    Ok(format!("{}\n", block))
}
