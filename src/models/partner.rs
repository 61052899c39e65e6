use mongodb::bson::{doc, Document};
use serde::Deserialize;

/// Field incremented each time someone connects with a partner.
pub const PARTNER_COUNT_FIELD: &str = "partnerCount";
pub const EXPERIENCE_FIELD: &str = "experienceLevel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Expert,
}

impl ExperienceLevel {
    pub const DEFAULT_ORDER: [ExperienceLevel; 3] = [
        ExperienceLevel::Expert,
        ExperienceLevel::Intermediate,
        ExperienceLevel::Beginner,
    ];

    /// Exact, case-sensitive match on the stored spelling.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Beginner" => Some(ExperienceLevel::Beginner),
            "Intermediate" => Some(ExperienceLevel::Intermediate),
            "Expert" => Some(ExperienceLevel::Expert),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "Beginner",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Expert => "Expert",
        }
    }

    /// Sort priority when this level is the one requested first.
    pub fn priority_order(&self) -> [ExperienceLevel; 3] {
        match self {
            ExperienceLevel::Expert => Self::DEFAULT_ORDER,
            ExperienceLevel::Intermediate => [
                ExperienceLevel::Intermediate,
                ExperienceLevel::Expert,
                ExperienceLevel::Beginner,
            ],
            ExperienceLevel::Beginner => [
                ExperienceLevel::Beginner,
                ExperienceLevel::Intermediate,
                ExperienceLevel::Expert,
            ],
        }
    }

    /// Priority for an optional `expSort` value; unknown values fall back to the default.
    pub fn order_for(exp_sort: Option<&str>) -> [ExperienceLevel; 3] {
        exp_sort
            .and_then(ExperienceLevel::parse)
            .map(|level| level.priority_order())
            .unwrap_or(Self::DEFAULT_ORDER)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartnerSort {
    Natural,
    NewestFirst,
    RatingDesc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartnerQuery {
    /// Already-escaped, case-insensitive pattern matched against `subject`.
    pub subject_pattern: Option<String>,
    pub sort: PartnerSort,
    pub limit: Option<i64>,
}

impl PartnerQuery {
    pub fn all() -> Self {
        Self {
            subject_pattern: None,
            sort: PartnerSort::Natural,
            limit: None,
        }
    }
}

/// Partial update of a partner's public details. Absent keys are left untouched.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct PartnerDetailsUpdate {
    pub name: Option<String>,
    #[serde(rename = "imgURL")]
    pub img_url: Option<String>,
    pub sub: Option<String>,
    #[serde(rename = "stdMode")]
    pub std_mode: Option<String>,
}

impl PartnerDetailsUpdate {
    /// The `$set` document for this update, or `None` if it changes nothing.
    pub fn to_set_document(&self) -> Option<Document> {
        let mut set = Document::new();
        let fields = [
            ("name", &self.name),
            ("profileimage", &self.img_url),
            ("subject", &self.sub),
            ("studyMode", &self.std_mode),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                set.insert(key, value.as_str());
            }
        }

        if set.is_empty() {
            None
        } else {
            Some(set)
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Case-insensitive substring of the partner's subject.
    pub search: Option<String>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExperienceSortQuery {
    /// `Expert`, `Intermediate` or `Beginner`.
    #[serde(rename = "expSort")]
    pub exp_sort: Option<String>,
}

/// `{ $inc: { partnerCount: 1 } }`
pub fn increment_partner_count() -> Document {
    let mut inc = Document::new();
    inc.insert(PARTNER_COUNT_FIELD, 1_i32);
    doc! { "$inc": inc }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_orders() {
        use ExperienceLevel::*;
        assert_eq!(ExperienceLevel::order_for(Some("Expert")), [Expert, Intermediate, Beginner]);
        assert_eq!(
            ExperienceLevel::order_for(Some("Intermediate")),
            [Intermediate, Expert, Beginner]
        );
        assert_eq!(ExperienceLevel::order_for(Some("Beginner")), [Beginner, Intermediate, Expert]);
        assert_eq!(ExperienceLevel::order_for(Some("expert")), ExperienceLevel::DEFAULT_ORDER);
        assert_eq!(ExperienceLevel::order_for(None), ExperienceLevel::DEFAULT_ORDER);
    }

    #[test]
    fn test_details_update_sets_only_present_fields() {
        let update: PartnerDetailsUpdate =
            serde_json::from_str(r#"{"name":"Rafi","stdMode":"Online"}"#).unwrap();
        let set = update.to_set_document().unwrap();

        assert_eq!(set, doc! { "name": "Rafi", "studyMode": "Online" });
        assert!(PartnerDetailsUpdate::default().to_set_document().is_none());
    }

    #[test]
    fn test_details_update_maps_client_keys() {
        let update: PartnerDetailsUpdate =
            serde_json::from_str(r#"{"imgURL":"https://img/x.png","sub":"Physics"}"#).unwrap();
        let set = update.to_set_document().unwrap();

        assert_eq!(set.get_str("profileimage").unwrap(), "https://img/x.png");
        assert_eq!(set.get_str("subject").unwrap(), "Physics");
    }
}
