use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqliteExecutor};
use uuid::Uuid;

/// Role every account receives on creation, when it exists.
pub const EVERYONE_ROLE: &str = "@everyone";

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

impl Role {
    pub async fn find_by_name<'e, E: SqliteExecutor<'e>>(
        executor: E,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Role>("SELECT id, name FROM roles WHERE name = ?")
            .bind(name)
            .fetch_optional(executor)
            .await
    }

    pub async fn create<'e, E: SqliteExecutor<'e>>(
        executor: E,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Role>("INSERT INTO roles (id, name) VALUES (?, ?) RETURNING id, name")
            .bind(Uuid::new_v4().to_string())
            .bind(name)
            .fetch_one(executor)
            .await
    }

    pub async fn assign<'e, E: SqliteExecutor<'e>>(
        executor: E,
        role_id: &str,
        user_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO roles_users (id, role_id, user_id) VALUES (?, ?, ?)")
            .bind(Uuid::new_v4().to_string())
            .bind(role_id)
            .bind(user_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn names_for_user<'e, E: SqliteExecutor<'e>>(
        executor: E,
        user_id: &str,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT roles.name
            FROM roles_users
            INNER JOIN roles ON roles.id = roles_users.role_id
            WHERE roles_users.user_id = ?
            ORDER BY roles.name
            "#,
        )
        .bind(user_id)
        .fetch_all(executor)
        .await
    }
}
