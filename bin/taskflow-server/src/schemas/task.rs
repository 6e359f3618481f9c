//! Wire shapes for `/api/tasks` and the mapping between them and
//! [`TaskRecord`].

use std::borrow::Cow;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::entities::TaskRecord;

/// Body of `POST /api/tasks`.
///
/// `title` is optional at the serde level so that a missing title surfaces
/// as a field validation error rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(length(max = 1000, message = "size must be between 0 and 1000"))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "size must be between 0 and 1000"))]
    pub description: Option<String>,
    #[validate(length(max = 50, message = "size must be between 0 and 50"))]
    pub status: Option<String>,
    #[validate(length(max = 100, message = "size must be between 0 and 100"))]
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "local_date_time::deserialize")]
    #[schema(value_type = Option<String>, example = "2030-01-15T09:30:00")]
    pub deadline: Option<NaiveDateTime>,
    #[validate(range(min = 1, message = "must be greater than or equal to 1"))]
    pub priority: Option<i32>,
}

/// Body of `PUT` and `PATCH /api/tasks/{id}`.
///
/// PUT overwrites every field (absent ones are cleared); PATCH only the
/// fields that are present. Neither path validates the body.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<String>,
    #[serde(default, deserialize_with = "local_date_time::deserialize")]
    #[schema(value_type = Option<String>, example = "2030-01-15T09:30:00")]
    pub deadline: Option<NaiveDateTime>,
    pub priority: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Option<i64>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub assignee: Option<String>,
    #[schema(value_type = Option<String>, example = "2030-01-15T09:30:00")]
    pub deadline: Option<NaiveDateTime>,
    pub priority: Option<i32>,
    pub created_on: DateTime<Utc>,
    pub updated_on: Option<DateTime<Utc>>,
}

/// Zone-less ISO local date-time, seconds and fraction optional:
/// `2030-01-15T09:30`, `2030-01-15T09:30:00`, `2030-01-15T09:30:00.250`.
mod local_date_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer};

    const WITH_SECONDS: &str = "%Y-%m-%dT%H:%M:%S%.f";
    const WITHOUT_SECONDS: &str = "%Y-%m-%dT%H:%M";

    pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw, WITH_SECONDS)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, WITHOUT_SECONDS))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// Check a create request before it is turned into a record.
///
/// Field-level rules come from the [`Validate`] derive; the non-blank title
/// rule is checked here because it has to fire for a missing title too.
pub fn validate_create(req: &CreateTaskRequest) -> Result<(), ValidationErrors> {
    let mut errors = req.validate().err().unwrap_or_else(ValidationErrors::new);

    if req.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        errors.add(
            "title",
            ValidationError::new("not_blank").with_message(Cow::Borrowed("must not be blank")),
        );
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

impl CreateTaskRequest {
    /// Build a new, unsaved record. Stamps `created_on`; `id` and
    /// `updated_on` stay unset.
    pub fn to_record(self) -> TaskRecord {
        TaskRecord {
            id: None,
            title: self.title,
            description: self.description,
            status: self.status,
            assignee: self.assignee,
            deadline: self.deadline,
            priority: self.priority,
            created_on: Utc::now(),
            updated_on: None,
        }
    }
}

impl UpdateTaskRequest {
    /// Partial merge: only fields present in the request overwrite the
    /// record. `updated_on` is stamped unconditionally.
    pub fn merge_into(self, record: &mut TaskRecord) {
        if let Some(title) = self.title {
            record.title = Some(title);
        }
        if let Some(description) = self.description {
            record.description = Some(description);
        }
        if let Some(status) = self.status {
            record.status = Some(status);
        }
        if let Some(assignee) = self.assignee {
            record.assignee = Some(assignee);
        }
        if let Some(deadline) = self.deadline {
            record.deadline = Some(deadline);
        }
        if let Some(priority) = self.priority {
            record.priority = Some(priority);
        }
        record.touch();
    }
}

impl TaskRecord {
    pub fn to_response(&self) -> TaskResponse {
        TaskResponse {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            assignee: self.assignee.clone(),
            deadline: self.deadline,
            priority: self.priority,
            created_on: self.created_on,
            updated_on: self.updated_on,
        }
    }
}
