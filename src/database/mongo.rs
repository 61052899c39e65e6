use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{
    ClientOptions, FindOptions, IndexOptions, ServerApi, ServerApiVersion, UpdateOptions,
};
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;

use super::{StudyStore, CONNECTIONS, PARTNERS, USERS};
use crate::models::{
    increment_partner_count, DeleteAck, ExperienceLevel, InsertAck, InsertOutcome, NewConnection,
    NewUser, PartnerQuery, PartnerSort, UpdateAck, EXPERIENCE_FIELD,
};
use crate::utils::AppError;

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoDB {
    client: Client,
    db: Database,
}

impl MongoDB {
    /// Connects, pings the deployment and makes sure the unique indexes exist.
    /// Any connection failure is returned to the caller.
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, AppError> {
        let mut client_options = ClientOptions::parse(uri).await?;

        // Connection pool
        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));

        // Timeouts
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(5));

        client_options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);
        let mongodb = Self { client, db };

        mongodb.ping().await?;
        log::info!("✅ Pinged your deployment. Connected to MongoDB database: {}", db_name);

        mongodb.ensure_indexes().await;

        Ok(mongodb)
    }

    /// Unique indexes backing the email and (email, partner_id) rules. Creation
    /// fails if existing data already violates them; that is logged, not fatal.
    async fn ensure_indexes(&self) {
        log::info!("🔧 Creating database indexes...");

        let unique = IndexOptions::builder().unique(true).build();

        let users_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(unique.clone())
            .build();

        match self.collection::<Document>(USERS).create_index(users_index).await {
            Ok(_) => log::info!("   ✅ Index ready: {}(email) unique", USERS),
            Err(e) => log::warn!("   ⚠️  Could not create {}(email) index: {}", USERS, e),
        }

        let connections_index = IndexModel::builder()
            .keys(doc! { "email": 1, "partner_id": 1 })
            .options(unique)
            .build();

        match self.collection::<Document>(CONNECTIONS).create_index(connections_index).await {
            Ok(_) => log::info!("   ✅ Index ready: {}(email, partner_id) unique", CONNECTIONS),
            Err(e) => log::warn!(
                "   ⚠️  Could not create {}(email, partner_id) index: {}",
                CONNECTIONS,
                e
            ),
        }
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }

    /// Inserts `document` only if nothing matches `filter`, as one upsert. A
    /// concurrent upsert losing the race on the unique index counts as a match.
    async fn insert_if_absent(
        &self,
        collection: &str,
        filter: Document,
        document: Document,
    ) -> Result<InsertOutcome, AppError> {
        let update = set_on_insert(&filter, document);
        let options = UpdateOptions::builder().upsert(true).build();

        match self
            .collection::<Document>(collection)
            .update_one(filter, update)
            .with_options(options)
            .await
        {
            Ok(result) => Ok(match result.upserted_id {
                Some(id) => InsertOutcome::Inserted(InsertAck::new(id)),
                None => InsertOutcome::AlreadyExists,
            }),
            Err(e) if is_duplicate_key(&e) => Ok(InsertOutcome::AlreadyExists),
            Err(e) => Err(e.into()),
        }
    }
}

/// Upsert body for a conditional insert. The filter fields are copied into
/// the new document by the server, so they must not appear in `$setOnInsert`
/// as well; `_id` is assigned here so the stored id is always an ObjectId.
pub fn set_on_insert(filter: &Document, mut document: Document) -> Document {
    for key in filter.keys() {
        document.remove(key);
    }
    document.insert("_id", ObjectId::new());
    doc! { "$setOnInsert": document }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}

pub fn partner_filter(query: &PartnerQuery) -> Document {
    match &query.subject_pattern {
        Some(pattern) => doc! { "subject": { "$regex": pattern.as_str(), "$options": "i" } },
        None => Document::new(),
    }
}

pub fn partner_sort(sort: PartnerSort) -> Option<Document> {
    match sort {
        PartnerSort::Natural => None,
        PartnerSort::NewestFirst => Some(doc! { "_id": -1 }),
        PartnerSort::RatingDesc => Some(doc! { "rating": -1 }),
    }
}

/// `$addFields sortKey = $indexOfArray(priority, $experienceLevel)`, sort on it,
/// then drop it again.
pub fn experience_sort_pipeline(priority: &[ExperienceLevel]) -> Vec<Document> {
    let levels: Vec<&str> = priority.iter().map(|level| level.as_str()).collect();
    let field = format!("${}", EXPERIENCE_FIELD);

    vec![
        doc! { "$addFields": { "sortKey": { "$indexOfArray": [levels, field] } } },
        doc! { "$sort": { "sortKey": 1 } },
        doc! { "$project": { "sortKey": 0 } },
    ]
}

#[async_trait]
impl StudyStore for MongoDB {
    async fn ping(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn insert_user_if_absent(&self, user: NewUser) -> Result<InsertOutcome, AppError> {
        self.insert_if_absent(USERS, doc! { "email": user.email.as_str() }, user.profile)
            .await
    }

    async fn insert_partner(&self, partner: Document) -> Result<InsertAck, AppError> {
        let result = self
            .collection::<Document>(PARTNERS)
            .insert_one(partner)
            .await?;
        Ok(result.into())
    }

    async fn find_partners(&self, query: PartnerQuery) -> Result<Vec<Document>, AppError> {
        let mut options = FindOptions::default();
        options.sort = partner_sort(query.sort);
        options.limit = query.limit;

        let cursor = self
            .collection::<Document>(PARTNERS)
            .find(partner_filter(&query))
            .with_options(options)
            .await?;

        Ok(cursor.try_collect::<Vec<Document>>().await?)
    }

    async fn find_partner(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
        Ok(self
            .collection::<Document>(PARTNERS)
            .find_one(doc! { "_id": id })
            .await?)
    }

    async fn partners_by_experience(
        &self,
        priority: &[ExperienceLevel],
    ) -> Result<Vec<Document>, AppError> {
        let cursor = self
            .collection::<Document>(PARTNERS)
            .aggregate(experience_sort_pipeline(priority))
            .await?;

        Ok(cursor.try_collect::<Vec<Document>>().await?)
    }

    async fn update_partner(&self, id: ObjectId, set: Document) -> Result<UpdateAck, AppError> {
        let result = self
            .collection::<Document>(PARTNERS)
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(result.into())
    }

    async fn increment_partner_count(&self, id: ObjectId) -> Result<UpdateAck, AppError> {
        let result = self
            .collection::<Document>(PARTNERS)
            .update_one(doc! { "_id": id }, increment_partner_count())
            .await?;
        Ok(result.into())
    }

    async fn find_connections(&self, email: &str) -> Result<Vec<Document>, AppError> {
        let cursor = self
            .collection::<Document>(CONNECTIONS)
            .find(doc! { "email": email })
            .await?;

        Ok(cursor.try_collect::<Vec<Document>>().await?)
    }

    async fn insert_connection_if_absent(
        &self,
        connection: NewConnection,
    ) -> Result<InsertOutcome, AppError> {
        let filter = doc! {
            "email": connection.email.as_str(),
            "partner_id": connection.partner_id.clone(),
        };
        self.insert_if_absent(CONNECTIONS, filter, connection.document)
            .await
    }

    async fn delete_connection(&self, id: ObjectId) -> Result<DeleteAck, AppError> {
        let result = self
            .collection::<Document>(CONNECTIONS)
            .delete_one(doc! { "_id": id })
            .await?;
        Ok(result.into())
    }
}
