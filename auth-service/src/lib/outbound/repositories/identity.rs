use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::identity::models::EmailAddress;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::Permission;
use crate::domain::identity::models::Role;
use crate::domain::identity::models::UserId;
use crate::domain::identity::ports::IdentityStore;
use crate::identity::errors::AuthError;

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct RolePermissionRow {
    role_name: String,
    permission_name: Option<String>,
}

/// Identity store backed by PostgreSQL.
///
/// Expects the schema from `migrations/`, including the seeded `USER` and
/// `ADMIN` roles.
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn roles_for(&self, user_id: Uuid) -> Result<Vec<Role>, AuthError> {
        let rows = sqlx::query_as::<_, RolePermissionRow>(
            r#"
            SELECT r.name AS role_name, p.name AS permission_name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            LEFT JOIN role_permissions rp ON rp.role_id = r.id
            LEFT JOIN permissions p ON p.id = rp.permission_id
            WHERE ur.user_id = $1
            ORDER BY r.id, p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(fold_roles(rows))
    }
}

/// Group flat role/permission join rows into roles, keeping row order.
fn fold_roles(rows: Vec<RolePermissionRow>) -> Vec<Role> {
    let mut roles: Vec<Role> = Vec::new();

    for row in rows {
        let index = match roles.iter().position(|role| role.name == row.role_name) {
            Some(index) => index,
            None => {
                roles.push(Role::new(row.role_name, Vec::new()));
                roles.len() - 1
            }
        };

        if let Some(permission) = row.permission_name {
            roles[index].permissions.push(Permission::new(permission));
        }
    }

    roles
}

fn map_save_error(e: sqlx::Error, email: &EmailAddress) -> AuthError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) {
            return AuthError::DuplicateIdentity(email.to_string());
        }
    }
    AuthError::DatabaseError(e.to_string())
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn exists_by_email(&self, email: &EmailAddress) -> Result<bool, AuthError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Identity {
                id: UserId(r.id),
                email: EmailAddress::new(r.email)?,
                password_hash: r.password_hash,
                roles: self.roles_for(r.id).await?,
                created_at: r.created_at,
            })),
            None => Ok(None),
        }
    }

    async fn save(&self, identity: Identity) -> Result<Identity, AuthError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(identity.id.0)
        .bind(identity.email.as_str())
        .bind(&identity.password_hash)
        .bind(identity.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_save_error(e, &identity.email))?;

        for role in &identity.roles {
            let result = sqlx::query(
                r#"
                INSERT INTO user_roles (user_id, role_id)
                SELECT $1, id FROM roles WHERE name = $2
                "#,
            )
            .bind(identity.id.0)
            .bind(&role.name)
            .execute(&mut *tx)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

            if result.rows_affected() == 0 {
                return Err(AuthError::Configuration(format!(
                    "Role '{}' not found",
                    role.name
                )));
            }
        }

        tx.commit()
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(identity)
    }

    async fn find_role(&self, name: &str) -> Result<Option<Role>, AuthError> {
        let rows = sqlx::query_as::<_, RolePermissionRow>(
            r#"
            SELECT r.name AS role_name, p.name AS permission_name
            FROM roles r
            LEFT JOIN role_permissions rp ON rp.role_id = r.id
            LEFT JOIN permissions p ON p.id = rp.permission_id
            WHERE r.name = $1
            ORDER BY p.id
            "#,
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(fold_roles(rows).into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str, permission: Option<&str>) -> RolePermissionRow {
        RolePermissionRow {
            role_name: role.to_string(),
            permission_name: permission.map(str::to_string),
        }
    }

    #[test]
    fn test_fold_roles_groups_permissions() {
        let roles = fold_roles(vec![
            row("USER", Some("profile:read")),
            row("ADMIN", Some("profile:read")),
            row("ADMIN", Some("users:manage")),
        ]);

        assert_eq!(
            roles,
            vec![
                Role::new("USER", vec![Permission::new("profile:read")]),
                Role::new(
                    "ADMIN",
                    vec![
                        Permission::new("profile:read"),
                        Permission::new("users:manage")
                    ]
                ),
            ]
        );
    }

    #[test]
    fn test_fold_roles_without_permissions() {
        let roles = fold_roles(vec![row("GUEST", None)]);
        assert_eq!(roles, vec![Role::new("GUEST", vec![])]);
        assert!(fold_roles(vec![]).is_empty());
    }
}
