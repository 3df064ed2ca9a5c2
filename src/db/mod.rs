use std::time::Duration;

use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, IndexOptions},
    Client, Collection, Database, IndexModel,
};

use crate::{config::Config, errors::AppResult};

const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle on the quiz bundle collection. Connecting checks that the server
/// answers and that the collection carries the indexes storage relies on.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
    collection_name: String,
}

impl MongoStore {
    pub async fn connect(config: &Config) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.mongo_conn_string).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.connect_timeout = Some(config.request_timeout().min(SERVER_SELECTION_TIMEOUT));
        options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);

        let client = Client::with_options(options)?;
        let store = Self {
            database: client.database(&config.mongo_db_name),
            collection_name: config.quiz_collection.clone(),
        };

        store.ping().await?;
        store.prepare_bundle_collection().await?;

        log::info!(
            "Storing quizzes in MongoDB collection '{}.{}'",
            config.mongo_db_name,
            config.quiz_collection
        );
        Ok(store)
    }

    pub fn quiz_bundles<T: Send + Sync>(&self) -> Collection<T> {
        self.database.collection(&self.collection_name)
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn prepare_bundle_collection(&self) -> AppResult<()> {
        let indexes = bundle_indexes();
        let count = indexes.len();
        self.quiz_bundles::<Document>().create_indexes(indexes).await?;
        log::info!("Ensured {} indexes on '{}'", count, self.collection_name);
        Ok(())
    }
}

/// Unique `normalized_url` turns a concurrent second write into a duplicate
/// key error. Unique `id` serves lookups and `created_at_ms` serves history.
pub fn bundle_indexes() -> Vec<IndexModel> {
    let index = |keys: Document, name: &str, unique: bool| {
        IndexModel::builder()
            .keys(keys)
            .options(
                IndexOptions::builder()
                    .name(name.to_string())
                    .unique(unique)
                    .build(),
            )
            .build()
    };

    vec![
        index(doc! { "normalized_url": 1 }, "normalized_url_unique", true),
        index(doc! { "id": 1 }, "id_unique", true),
        index(doc! { "created_at_ms": -1 }, "created_at_desc", false),
    ]
}
