use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::AppError;

/// Represents the priority of a task.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Represents the status of a task.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed and under review.
    Review,
    /// Task is completed.
    Done,
}

/// Input structure for creating or replacing a task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,

    /// Defaults to `todo` when omitted.
    #[serde(default)]
    pub status: TaskStatus,
}

/// Partial update for `PATCH`. Absent fields are left untouched.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
    }

    /// The `$set` body for this patch, always bumping `updated_at`.
    pub fn to_set_document(&self) -> Result<Document, AppError> {
        let mut set = doc! { "updated_at": bson::DateTime::now() };
        if let Some(title) = &self.title {
            set.insert("title", title.as_str());
        }
        if let Some(description) = &self.description {
            set.insert("description", description.as_str());
        }
        if let Some(priority) = &self.priority {
            set.insert("priority", bson::to_bson(priority)?);
        }
        if let Some(due_date) = self.due_date {
            set.insert("due_date", bson::DateTime::from_chrono(due_date));
        }
        if let Some(status) = &self.status {
            set.insert("status", bson::to_bson(status)?);
        }
        Ok(set)
    }
}

/// A task as stored in the `tasks` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: TaskStatus,
    pub due_date: Option<bson::DateTime>,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
    /// Owner of the task.
    pub user_id: ObjectId,
}

impl TaskDocument {
    /// Creates a new document from `TaskInput`, owned by `user_id`.
    /// `created_at` and `updated_at` are set to the current time.
    pub fn new(input: TaskInput, user_id: ObjectId) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: None,
            title: input.title,
            description: input.description,
            priority: input.priority,
            status: input.status,
            due_date: input.due_date.map(bson::DateTime::from_chrono),
            created_at: now,
            updated_at: now,
            user_id,
        }
    }

    /// The `$set` body for a full replace of the editable fields.
    pub fn replacement(input: &TaskInput) -> Result<Document, AppError> {
        Ok(doc! {
            "title": input.title.as_str(),
            "description": input.description.as_deref(),
            "priority": bson::to_bson(&input.priority)?,
            "status": bson::to_bson(&input.status)?,
            "due_date": input.due_date.map(bson::DateTime::from_chrono),
            "updated_at": bson::DateTime::now(),
        })
    }
}

/// Represents a task as returned by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: String,
}

impl From<TaskDocument> for Task {
    fn from(doc: TaskDocument) -> Self {
        Self {
            id: doc.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: doc.title,
            description: doc.description,
            priority: doc.priority,
            status: doc.status,
            due_date: doc.due_date.map(|d| d.to_chrono()),
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
            user_id: doc.user_id.to_hex(),
        }
    }
}

/// Query parameters for filtering tasks when listing them.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive literal match against title or description.
    pub search: Option<String>,
}

impl TaskQuery {
    /// Builds the find filter, always scoped to `owner`.
    pub fn to_filter(&self, owner: ObjectId) -> Result<Document, AppError> {
        let mut filter = doc! { "user_id": owner };
        if let Some(status) = &self.status {
            filter.insert("status", bson::to_bson(status)?);
        }
        if let Some(priority) = &self.priority {
            filter.insert("priority", bson::to_bson(priority)?);
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = regex::escape(search);
            filter.insert(
                "$or",
                vec![
                    doc! { "title": { "$regex": pattern.as_str(), "$options": "i" } },
                    doc! { "description": { "$regex": pattern.as_str(), "$options": "i" } },
                ],
            );
        }
        Ok(filter)
    }
}
