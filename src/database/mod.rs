use mongodb::{Client, Collection, Database};
use std::error::Error;

#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn new(uri: &str) -> Result<Self, Box<dyn Error>> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(5);
        client_options.max_idle_time = Some(std::time::Duration::from_secs(300));

        client_options.connect_timeout = Some(std::time::Duration::from_secs(5));
        client_options.server_selection_timeout = Some(std::time::Duration::from_secs(5));

        let client = Client::with_options(client_options)?;

        // Extract database name from URI or use default
        let db_name = uri
            .split('/')
            .last()
            .and_then(|s| s.split('?').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("mtgcollection");

        let db = client.database(db_name);

        let mongodb = Self { db };

        // Ping non bloquant : si MongoDB est indisponible, le serveur démarre
        // en mode dégradé et le driver se reconnecte quand la base revient.
        match mongodb.db.list_collection_names().await {
            Ok(_) => {
                log::info!("✅ MongoDB reachable, ensuring indexes...");
                if let Err(e) = mongodb.ensure_indexes().await {
                    log::warn!("⚠️  Failed to create indexes: {}", e);
                }
            }
            Err(e) => {
                log::error!("❌ MongoDB unreachable, starting degraded: {}", e);
            }
        }

        Ok(mongodb)
    }

    /// Creates necessary indexes for optimal query performance
    async fn ensure_indexes(&self) -> Result<(), Box<dyn Error>> {
        use mongodb::bson::doc;
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        log::info!("🔧 Creating database indexes...");

        let users = self.db.collection::<mongodb::bson::Document>("users");

        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        match users.create_index(email_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(email) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let user_id_index = IndexModel::builder().keys(doc! { "user_id": 1 }).build();
        match users.create_index(user_id_index).await {
            Ok(_) => log::info!("   ✅ Index created: users(user_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let collections = self.db.collection::<mongodb::bson::Document>("collections");
        let owner_index = IndexModel::builder().keys(doc! { "owner_id": 1 }).build();
        match collections.create_index(owner_index).await {
            Ok(_) => log::info!("   ✅ Index created: collections(owner_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let decks = self.db.collection::<mongodb::bson::Document>("decks");
        let deck_owner_index = IndexModel::builder().keys(doc! { "owner_id": 1 }).build();
        match decks.create_index(deck_owner_index).await {
            Ok(_) => log::info!("   ✅ Index created: decks(owner_id)"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        let cards = self.db.collection::<mongodb::bson::Document>("cards");
        let scryfall_index = IndexModel::builder()
            .keys(doc! { "scryfall_id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        match cards.create_index(scryfall_index).await {
            Ok(_) => log::info!("   ✅ Index created: cards(scryfall_id) unique"),
            Err(e) => log::debug!("   ℹ️  Index already exists: {}", e),
        }

        log::info!("✅ Database indexes ready");

        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}
