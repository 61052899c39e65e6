use mongodb::bson::Document;

use crate::{
    database::StudyStore,
    models::{
        ExperienceLevel, InsertAck, PartnerDetailsUpdate, PartnerQuery, PartnerSort, UpdateAck,
    },
    utils::{parse_object_id, AppError},
};

pub const RECENT_LIMIT: i64 = 5;
pub const TOP_LIMIT: i64 = 6;

pub async fn create_partner(db: &dyn StudyStore, mut body: Document) -> Result<InsertAck, AppError> {
    body.remove("_id");
    db.insert_partner(body).await
}

pub async fn all_partners(db: &dyn StudyStore) -> Result<Vec<Document>, AppError> {
    db.find_partners(PartnerQuery::all()).await
}

/// Newest partners first, by `_id`.
pub async fn recent_partners(db: &dyn StudyStore) -> Result<Vec<Document>, AppError> {
    db.find_partners(PartnerQuery {
        subject_pattern: None,
        sort: PartnerSort::NewestFirst,
        limit: Some(RECENT_LIMIT),
    })
    .await
}

pub async fn top_partners(db: &dyn StudyStore) -> Result<Vec<Document>, AppError> {
    db.find_partners(PartnerQuery {
        subject_pattern: None,
        sort: PartnerSort::RatingDesc,
        limit: Some(TOP_LIMIT),
    })
    .await
}

pub async fn get_partner(db: &dyn StudyStore, id: &str) -> Result<Document, AppError> {
    let id = parse_object_id(id)?;
    db.find_partner(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Partner not found".to_string()))
}

/// Literal search text to a case-insensitive subject pattern. Regex
/// metacharacters are escaped; blank input means no filter.
pub fn subject_pattern(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(regex::escape)
}

pub async fn search_partners(
    db: &dyn StudyStore,
    search: Option<&str>,
) -> Result<Vec<Document>, AppError> {
    db.find_partners(PartnerQuery {
        subject_pattern: subject_pattern(search),
        sort: PartnerSort::Natural,
        limit: None,
    })
    .await
}

pub async fn sort_by_experience(
    db: &dyn StudyStore,
    exp_sort: Option<&str>,
) -> Result<Vec<Document>, AppError> {
    let priority = ExperienceLevel::order_for(exp_sort);
    db.partners_by_experience(&priority).await
}

pub async fn update_details(
    db: &dyn StudyStore,
    id: &str,
    update: &PartnerDetailsUpdate,
) -> Result<UpdateAck, AppError> {
    let id = parse_object_id(id)?;
    let set = update.to_set_document().ok_or_else(|| {
        AppError::InvalidRequest(
            "Nothing to update: send name, imgURL, sub or stdMode".to_string(),
        )
    })?;
    db.update_partner(id, set).await
}

pub async fn increment_partner_count(db: &dyn StudyStore, id: &str) -> Result<UpdateAck, AppError> {
    let id = parse_object_id(id)?;
    db.increment_partner_count(id).await
}
