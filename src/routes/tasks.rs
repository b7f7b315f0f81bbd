use crate::{
    auth::{AuthMiddleware, AuthenticatedUser},
    db,
    error::AppError,
    models::{Task, TaskDocument, TaskInput, TaskPatch, TaskQuery},
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::ReturnDocument;
use mongodb::Database;
use validator::Validate;

/// Registers the task endpoints under `/tasks`. Every route requires a bearer token.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/tasks")
            .wrap(AuthMiddleware)
            .service(get_tasks)
            .service(create_task)
            .service(get_task)
            .service(update_task)
            .service(patch_task)
            .service(delete_task),
    );
}

fn parse_task_id(raw: &str) -> Result<ObjectId, AppError> {
    ObjectId::parse_str(raw).map_err(|_| AppError::BadRequest("Invalid task id".into()))
}

/// Filter matching one task owned by `owner`. Tasks of other users look absent.
fn owned_by(task_id: ObjectId, owner: ObjectId) -> Document {
    doc! { "_id": task_id, "user_id": owner }
}

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Query Parameters:
/// - `status` (optional): e.g. "todo", "in_progress", "done".
/// - `priority` (optional): e.g. "low", "medium", "high".
/// - `search` (optional): case-insensitive match in title or description.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    database: web::Data<Database>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let filter = query_params.to_filter(user.0)?;

    let tasks: Vec<Task> = db::tasks(&database)
        .find(filter)
        .sort(doc! { "created_at": -1 })
        .await?
        .map_ok(Task::from)
        .try_collect()
        .await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `400 Bad Request`: malformed JSON body.
/// - `422 Unprocessable Entity`: title or description out of bounds.
#[post("")]
pub async fn create_task(
    database: web::Data<Database>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let mut task = TaskDocument::new(task_data.into_inner(), user.0);
    let inserted = db::tasks(&database).insert_one(&task).await?;
    task.id = inserted.inserted_id.as_object_id();

    Ok(HttpResponse::Created().json(Task::from(task)))
}

/// Retrieves a specific task by its id.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `400 Bad Request`: `id` is not an ObjectId.
/// - `404 Not Found`: no such task, or not owned by the caller.
#[get("/{id}")]
pub async fn get_task(
    database: web::Data<Database>,
    task_id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_id = parse_task_id(&task_id)?;

    let task = db::tasks(&database)
        .find_one(owned_by(task_id, user.0))
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(Task::from(task)))
}

/// Replaces the editable fields of a task.
///
/// Fields missing from the body (`description`, `priority`, `due_date`) are cleared.
#[put("/{id}")]
pub async fn update_task(
    database: web::Data<Database>,
    task_id: web::Path<String>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task_id = parse_task_id(&task_id)?;

    let update = doc! { "$set": TaskDocument::replacement(&task_data)? };
    let task = db::tasks(&database)
        .find_one_and_update(owned_by(task_id, user.0), update)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found or not owned by user".into()))?;

    Ok(HttpResponse::Ok().json(Task::from(task)))
}

/// Updates only the fields present in the body.
///
/// An empty patch is rejected with `400 Bad Request`.
#[patch("/{id}")]
pub async fn patch_task(
    database: web::Data<Database>,
    task_id: web::Path<String>,
    task_data: web::Json<TaskPatch>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    if task_data.is_empty() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    let task_id = parse_task_id(&task_id)?;

    let update = doc! { "$set": task_data.to_set_document()? };
    let task = db::tasks(&database)
        .find_one_and_update(owned_by(task_id, user.0), update)
        .return_document(ReturnDocument::After)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found or not owned by user".into()))?;

    Ok(HttpResponse::Ok().json(Task::from(task)))
}

/// Deletes a task the caller owns.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no such task, or not owned by the caller.
#[delete("/{id}")]
pub async fn delete_task(
    database: web::Data<Database>,
    task_id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_id = parse_task_id(&task_id)?;

    let result = db::tasks(&database)
        .delete_one(owned_by(task_id, user.0))
        .await?;

    if result.deleted_count == 0 {
        return Err(AppError::NotFound(
            "Task not found or not owned by user".into(),
        ));
    }

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_id() {
        let id = ObjectId::new();
        assert_eq!(parse_task_id(&id.to_hex()).unwrap(), id);
        assert!(matches!(
            parse_task_id("not-an-id"),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_owned_by_filter() {
        let task_id = ObjectId::new();
        let owner = ObjectId::new();
        let filter = owned_by(task_id, owner);
        assert_eq!(filter.get_object_id("_id").unwrap(), task_id);
        assert_eq!(filter.get_object_id("user_id").unwrap(), owner);
    }
}
