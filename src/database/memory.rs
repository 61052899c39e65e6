//! In-process `StudyStore` for tests. Mirrors what the MongoDB queries do on
//! the server: insertion order is natural order, `_id` order is creation order.

use async_trait::async_trait;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Mutex;

use super::StudyStore;
use crate::models::{
    DeleteAck, ExperienceLevel, InsertAck, InsertOutcome, NewConnection, NewUser, PartnerQuery,
    PartnerSort, UpdateAck, EXPERIENCE_FIELD, PARTNER_COUNT_FIELD,
};
use crate::utils::AppError;

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<Vec<Document>>,
    partners: Mutex<Vec<Document>>,
    connections: Mutex<Vec<Document>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail as if the server were unreachable.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    pub fn user_count(&self) -> usize {
        self.users.lock().unwrap().len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            Err(AppError::DatabaseError("server selection timeout".to_string()))
        } else {
            Ok(())
        }
    }
}

fn with_new_id(document: Document) -> (ObjectId, Document) {
    let id = ObjectId::new();
    let mut stored = doc! { "_id": id };
    for (key, value) in document {
        if key != "_id" {
            stored.insert(key, value);
        }
    }
    (id, stored)
}

fn id_of(doc: &Document) -> Option<ObjectId> {
    doc.get_object_id("_id").ok()
}

fn number(value: Option<&Bson>) -> Option<f64> {
    match value {
        Some(Bson::Double(v)) => Some(*v),
        Some(Bson::Int32(v)) => Some(f64::from(*v)),
        Some(Bson::Int64(v)) => Some(*v as f64),
        _ => None,
    }
}

/// Position of a document's experience level within `priority`, or -1 when
/// the field is missing or holds any other value (same as `$indexOfArray`).
fn experience_rank(priority: &[ExperienceLevel], doc: &Document) -> i32 {
    match doc.get(EXPERIENCE_FIELD) {
        Some(Bson::String(level)) => priority
            .iter()
            .position(|p| p.as_str() == level.as_str())
            .map(|i| i as i32)
            .unwrap_or(-1),
        _ => -1,
    }
}

fn incremented(value: Option<&Bson>) -> Bson {
    match value {
        Some(Bson::Int32(v)) => Bson::Int32(v + 1),
        Some(Bson::Int64(v)) => Bson::Int64(v + 1),
        Some(Bson::Double(v)) => Bson::Double(v + 1.0),
        _ => Bson::Int32(1),
    }
}

#[async_trait]
impl StudyStore for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        self.check()
    }

    async fn insert_user_if_absent(&self, user: NewUser) -> Result<InsertOutcome, AppError> {
        self.check()?;
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.get_str("email").ok() == Some(user.email.as_str())) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        let (id, stored) = with_new_id(user.profile);
        users.push(stored);
        Ok(InsertOutcome::Inserted(InsertAck::new(Bson::ObjectId(id))))
    }

    async fn insert_partner(&self, partner: Document) -> Result<InsertAck, AppError> {
        self.check()?;
        let (id, stored) = with_new_id(partner);
        self.partners.lock().unwrap().push(stored);
        Ok(InsertAck::new(Bson::ObjectId(id)))
    }

    async fn find_partners(&self, query: PartnerQuery) -> Result<Vec<Document>, AppError> {
        self.check()?;
        let matcher = match &query.subject_pattern {
            Some(pattern) => Some(
                regex::RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| AppError::DatabaseError(e.to_string()))?,
            ),
            None => None,
        };

        let mut found: Vec<Document> = self
            .partners
            .lock()
            .unwrap()
            .iter()
            .filter(|p| match &matcher {
                Some(re) => p.get_str("subject").map(|s| re.is_match(s)).unwrap_or(false),
                None => true,
            })
            .cloned()
            .collect();

        match query.sort {
            PartnerSort::Natural => {}
            PartnerSort::NewestFirst => found.sort_by(|a, b| id_of(b).cmp(&id_of(a))),
            PartnerSort::RatingDesc => found.sort_by(|a, b| {
                number(b.get("rating"))
                    .partial_cmp(&number(a.get("rating")))
                    .unwrap_or(Ordering::Equal)
            }),
        }

        if let Some(limit) = query.limit {
            found.truncate(limit.max(0) as usize);
        }
        Ok(found)
    }

    async fn find_partner(&self, id: ObjectId) -> Result<Option<Document>, AppError> {
        self.check()?;
        let partners = self.partners.lock().unwrap();
        Ok(partners.iter().find(|p| id_of(p) == Some(id)).cloned())
    }

    async fn partners_by_experience(
        &self,
        priority: &[ExperienceLevel],
    ) -> Result<Vec<Document>, AppError> {
        self.check()?;
        let mut found = self.partners.lock().unwrap().clone();
        found.sort_by_key(|p| experience_rank(priority, p));
        Ok(found)
    }

    async fn update_partner(&self, id: ObjectId, set: Document) -> Result<UpdateAck, AppError> {
        self.check()?;
        let mut partners = self.partners.lock().unwrap();
        let Some(partner) = partners.iter_mut().find(|p| id_of(p) == Some(id)) else {
            return Ok(UpdateAck::new(0, 0));
        };

        let mut modified = false;
        for (key, value) in set {
            if partner.get(&key) != Some(&value) {
                partner.insert(key, value);
                modified = true;
            }
        }
        Ok(UpdateAck::new(1, u64::from(modified)))
    }

    async fn increment_partner_count(&self, id: ObjectId) -> Result<UpdateAck, AppError> {
        self.check()?;
        let mut partners = self.partners.lock().unwrap();
        let Some(partner) = partners.iter_mut().find(|p| id_of(p) == Some(id)) else {
            return Ok(UpdateAck::new(0, 0));
        };

        let next = incremented(partner.get(PARTNER_COUNT_FIELD));
        partner.insert(PARTNER_COUNT_FIELD, next);
        Ok(UpdateAck::new(1, 1))
    }

    async fn find_connections(&self, email: &str) -> Result<Vec<Document>, AppError> {
        self.check()?;
        let connections = self.connections.lock().unwrap();
        Ok(connections
            .iter()
            .filter(|c| c.get_str("email").ok() == Some(email))
            .cloned()
            .collect())
    }

    async fn insert_connection_if_absent(
        &self,
        connection: NewConnection,
    ) -> Result<InsertOutcome, AppError> {
        self.check()?;
        let mut connections = self.connections.lock().unwrap();
        let exists = connections.iter().any(|c| {
            c.get_str("email").ok() == Some(connection.email.as_str())
                && c.get("partner_id") == Some(&connection.partner_id)
        });
        if exists {
            return Ok(InsertOutcome::AlreadyExists);
        }
        let (id, stored) = with_new_id(connection.document);
        connections.push(stored);
        Ok(InsertOutcome::Inserted(InsertAck::new(Bson::ObjectId(id))))
    }

    async fn delete_connection(&self, id: ObjectId) -> Result<DeleteAck, AppError> {
        self.check()?;
        let mut connections = self.connections.lock().unwrap();
        let before = connections.len();
        connections.retain(|c| id_of(c) != Some(id));
        Ok(DeleteAck::new((before - connections.len()) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experience_rank_unknown_is_minus_one() {
        let order = ExperienceLevel::DEFAULT_ORDER;
        assert_eq!(experience_rank(&order, &doc! { "experienceLevel": "Expert" }), 0);
        assert_eq!(experience_rank(&order, &doc! { "experienceLevel": "Beginner" }), 2);
        assert_eq!(experience_rank(&order, &doc! { "experienceLevel": "Guru" }), -1);
        assert_eq!(experience_rank(&order, &doc! { "name": "no level" }), -1);
    }
}
