use std::sync::Arc;

use anyhow::Context;

use zver_blob::{BlobStore, FsBlobStore, InMemoryBlobStore};
use zver_index::ManifestFormatter;
use zver_server::{ReleaseServer, ServerConfig};
use zver_store::{InMemoryReleaseStore, ReleaseStore, SqliteReleaseStore};

use crate::cli::{Cli, Command};

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve {
            bind,
            db,
            blob_dir,
        } => {
            let store: Arc<dyn ReleaseStore> = match db {
                Some(path) => Arc::new(
                    SqliteReleaseStore::open(&path)
                        .with_context(|| format!("opening database {}", path.display()))?,
                ),
                None => Arc::new(InMemoryReleaseStore::new()),
            };
            let blobs: Arc<dyn BlobStore> = match blob_dir {
                Some(path) => Arc::new(
                    FsBlobStore::open(path.clone())
                        .await
                        .with_context(|| format!("opening blob directory {}", path.display()))?,
                ),
                None => Arc::new(InMemoryBlobStore::new()),
            };

            let mut config = ServerConfig::from_env();
            config.bind_addr = bind;
            let server = ReleaseServer::new(config, store, blobs);
            server.serve().await?;
            Ok(())
        }

        Command::Index { db, url_base } => {
            let store = SqliteReleaseStore::open(&db)
                .with_context(|| format!("opening database {}", db.display()))?;
            let formatter = ManifestFormatter::new(url_base);
            let tagged = store.all_tagged_desc()?;
            let index = formatter.full_index(&tagged)?;
            println!("{}", serde_json::to_string_pretty(&index)?);
            Ok(())
        }
    }
}
