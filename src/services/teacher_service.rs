// src/services/teacher_service.rs
use crate::{
    error::{AppError, AppResult},
    models::teacher::{AssignedClass, NewTeacher, Teacher},
    services::required,
};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

/// Hashes a password with bcrypt off the async runtime.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(&password, cost))
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking failed while hashing password: {:?}", e);
            AppError::Internal
        })?
        .map_err(|e| {
            tracing::error!("bcrypt failed to hash password: {:?}", e);
            AppError::PasswordHashing
        })
}

pub async fn create_teacher(
    db_pool: &SqlitePool,
    new: NewTeacher,
    password_cost: u32,
) -> AppResult<Teacher> {
    let name = required("name", new.name)?;
    let email = required("email", new.email)?;
    let password = required("password", new.password)?;

    let password_hash = hash_password(&password, password_cost).await?;
    let teacher = Teacher {
        id: Uuid::new_v4().to_string(),
        name,
        email,
        password_hash,
        assigned_classes: Vec::new(),
    };

    sqlx::query(
        r#"
        INSERT INTO teachers (id, name, email, password_hash)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&teacher.id)
    .bind(&teacher.name)
    .bind(&teacher.email)
    .bind(&teacher.password_hash)
    .execute(db_pool)
    .await?;

    tracing::info!("Teacher '{}' created ({}).", teacher.name, teacher.id);
    Ok(teacher)
}

async fn load_assigned_classes(
    conn: &mut SqliteConnection,
    teacher_id: &str,
) -> AppResult<Vec<AssignedClass>> {
    let classes = sqlx::query_as::<_, AssignedClass>(
        r#"
        SELECT department, class_name, subject
        FROM teacher_assigned_classes
        WHERE teacher_id = ?1
        ORDER BY rowid ASC
        "#,
    )
    .bind(teacher_id)
    .fetch_all(conn)
    .await?;
    Ok(classes)
}

pub async fn find_teacher_by_id(
    db_pool: &SqlitePool,
    teacher_id: &str,
) -> AppResult<Option<Teacher>> {
    tracing::debug!("Looking up teacher {}", teacher_id);
    let mut conn = db_pool.acquire().await?;

    let teacher = sqlx::query_as::<_, Teacher>(
        "SELECT id, name, email, password_hash FROM teachers WHERE id = ?1",
    )
    .bind(teacher_id)
    .fetch_optional(&mut *conn)
    .await?;

    match teacher {
        Some(mut teacher) => {
            teacher.assigned_classes = load_assigned_classes(&mut *conn, teacher_id).await?;
            Ok(Some(teacher))
        }
        None => Ok(None),
    }
}

pub async fn get_teacher(db_pool: &SqlitePool, teacher_id: &str) -> AppResult<Teacher> {
    find_teacher_by_id(db_pool, teacher_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Teacher not found".to_string()))
}

pub async fn assigned_classes(
    db_pool: &SqlitePool,
    teacher_id: &str,
) -> AppResult<Vec<AssignedClass>> {
    Ok(get_teacher(db_pool, teacher_id).await?.assigned_classes)
}

pub async fn find_all_teachers(db_pool: &SqlitePool) -> AppResult<Vec<Teacher>> {
    let mut teachers = sqlx::query_as::<_, Teacher>(
        "SELECT id, name, email, password_hash FROM teachers ORDER BY created_at ASC, name ASC",
    )
    .fetch_all(db_pool)
    .await?;

    // One pass over every assignment instead of a query per teacher.
    let rows: Vec<(String, String, String, String)> = sqlx::query_as(
        r#"
        SELECT teacher_id, department, class_name, subject
        FROM teacher_assigned_classes
        ORDER BY rowid ASC
        "#,
    )
    .fetch_all(db_pool)
    .await?;

    let mut by_teacher: HashMap<String, Vec<AssignedClass>> = HashMap::new();
    for (teacher_id, department, class_name, subject) in rows {
        by_teacher.entry(teacher_id).or_default().push(AssignedClass {
            department,
            class_name,
            subject,
        });
    }
    for teacher in &mut teachers {
        teacher.assigned_classes = by_teacher.remove(&teacher.id).unwrap_or_default();
    }

    tracing::debug!("Found {} teachers.", teachers.len());
    Ok(teachers)
}

pub(crate) async fn teacher_exists(conn: &mut SqliteConnection, teacher_id: &str) -> AppResult<bool> {
    let found: Option<String> = sqlx::query_scalar("SELECT id FROM teachers WHERE id = ?1")
        .bind(teacher_id)
        .fetch_optional(conn)
        .await?;
    Ok(found.is_some())
}

/// Adds the class to the teacher's assignments unless the exact triple is
/// already there. Returns whether a new assignment was stored.
pub(crate) async fn assign_class(
    conn: &mut SqliteConnection,
    teacher_id: &str,
    class: &AssignedClass,
) -> AppResult<bool> {
    let inserted = sqlx::query(
        r#"
        INSERT OR IGNORE INTO teacher_assigned_classes (teacher_id, department, class_name, subject)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(teacher_id)
    .bind(&class.department)
    .bind(&class.class_name)
    .bind(&class.subject)
    .execute(conn)
    .await?
    .rows_affected();
    Ok(inserted > 0)
}
