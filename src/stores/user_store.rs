use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use crate::errors::InternalError;
use crate::errors::internal::WorkflowError;
use crate::types::db::user;
use crate::types::internal::{DirectoryIdentity, UserRole};

/// Fields for a new account
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub role: UserRole,
    pub department: String,
    pub is_directory_user: bool,
    /// Ignored for directory accounts
    pub password_hash: Option<String>,
}

/// Administrative edits; `None` leaves the field unchanged
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<UserRole>,
    pub department: Option<String>,
    pub is_active: Option<bool>,
}

/// Repository for user accounts
///
/// Every read filters out soft-deleted rows.
pub struct UserStore {
    db: DatabaseConnection,
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty())
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .filter(user::Column::DeletedAt.is_null())
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("find_user_by_username", e))
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<user::Model>, InternalError> {
        Self::find_by_id_in(&self.db, id).await
    }

    pub async fn find_by_id_in<C: ConnectionTrait>(
        conn: &C,
        id: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find_by_id(id.to_string())
            .filter(user::Column::DeletedAt.is_null())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))
    }

    /// Fetch a user or fail with NotFound
    pub async fn get(&self, id: &str) -> Result<user::Model, InternalError> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| WorkflowError::not_found("user", id).into())
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<user::Model>, InternalError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        user::Entity::find()
            .filter(user::Column::Id.is_in(ids.iter().cloned()))
            .filter(user::Column::DeletedAt.is_null())
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("find_users_by_ids", e))
    }

    pub async fn find_by_usernames(&self, usernames: &[String]) -> Result<Vec<user::Model>, InternalError> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        user::Entity::find()
            .filter(user::Column::Username.is_in(usernames.iter().cloned()))
            .filter(user::Column::DeletedAt.is_null())
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("find_users_by_usernames", e))
    }

    /// All live accounts, newest first
    pub async fn list(&self) -> Result<Vec<user::Model>, InternalError> {
        user::Entity::find()
            .filter(user::Column::DeletedAt.is_null())
            .order_by_desc(user::Column::CreatedAt)
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_users", e))
    }

    /// Fail with Conflict when the username or email is taken, soft-deleted rows included
    async fn ensure_unique(
        &self,
        username: Option<&str>,
        email: Option<&str>,
        except_id: Option<&str>,
    ) -> Result<(), InternalError> {
        let mut any = Condition::any();
        if let Some(username) = username {
            any = any.add(user::Column::Username.eq(username));
        }
        if let Some(email) = email {
            any = any.add(user::Column::Email.eq(email));
        }
        if any.is_empty() {
            return Ok(());
        }

        let mut query = user::Entity::find().filter(any);
        if let Some(id) = except_id {
            query = query.filter(user::Column::Id.ne(id));
        }

        let existing = query
            .one(&self.db)
            .await
            .map_err(|e| InternalError::database("check_user_unique", e))?;

        match existing {
            Some(found) if username.is_some_and(|u| u == found.username) => {
                Err(WorkflowError::conflict(format!("username '{}' already exists", found.username)).into())
            }
            Some(_) => Err(WorkflowError::conflict("email already in use").into()),
            None => Ok(()),
        }
    }

    pub async fn create(&self, new_user: NewUser, now: i64) -> Result<user::Model, InternalError> {
        let email = normalize_email(new_user.email);
        self.ensure_unique(Some(&new_user.username), email.as_deref(), None).await?;

        // Directory accounts never keep a local credential
        let password_hash = if new_user.is_directory_user { None } else { new_user.password_hash };

        let model = user::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            username: Set(new_user.username),
            email: Set(email),
            full_name: Set(new_user.full_name),
            password_hash: Set(password_hash),
            role: Set(new_user.role),
            department: Set(new_user.department),
            is_active: Set(true),
            is_directory_user: Set(new_user.is_directory_user),
            last_login_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        };

        let created = model
            .insert(&self.db)
            .await
            .map_err(|e| InternalError::database("create_user", e))?;

        tracing::info!(user_id = %created.id, username = %created.username, role = %created.role, "user created");

        Ok(created)
    }

    /// Insert a directory account seen for the first time
    pub async fn provision_directory_user(
        &self,
        identity: &DirectoryIdentity,
        role: UserRole,
        now: i64,
    ) -> Result<user::Model, InternalError> {
        self.create(
            NewUser {
                username: identity.username.clone(),
                email: identity.email.clone(),
                full_name: identity.full_name.clone(),
                role,
                department: identity.department.clone(),
                is_directory_user: true,
                password_hash: None,
            },
            now,
        )
        .await
    }

    /// Copy directory-sourced profile fields onto the stored record.
    /// Role, active flag and directory flag are left as stored.
    pub async fn refresh_directory_profile(
        &self,
        id: &str,
        identity: &DirectoryIdentity,
        now: i64,
    ) -> Result<user::Model, InternalError> {
        let email = normalize_email(identity.email.clone());
        if email.is_some() {
            self.ensure_unique(None, email.as_deref(), Some(id)).await?;
        }

        let model = user::ActiveModel {
            id: Set(id.to_string()),
            email: Set(email),
            full_name: Set(identity.full_name.clone()),
            department: Set(identity.department.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        model
            .update(&self.db)
            .await
            .map_err(|e| InternalError::database("refresh_directory_profile", e))
    }

    pub async fn touch_last_login(&self, id: &str, now: i64) -> Result<user::Model, InternalError> {
        let model = user::ActiveModel {
            id: Set(id.to_string()),
            last_login_at: Set(Some(now)),
            updated_at: Set(now),
            ..Default::default()
        };

        model
            .update(&self.db)
            .await
            .map_err(|e| InternalError::database("touch_last_login", e))
    }

    pub async fn update(&self, id: &str, changes: UserUpdate, now: i64) -> Result<user::Model, InternalError> {
        let existing = self.get(id).await?;

        let email = changes.email.map(|e| normalize_email(Some(e)));
        if let Some(Some(email)) = &email {
            self.ensure_unique(None, Some(email), Some(id)).await?;
        }

        let mut model: user::ActiveModel = existing.into();
        if let Some(email) = email {
            model.email = Set(email);
        }
        if let Some(full_name) = changes.full_name {
            model.full_name = Set(full_name);
        }
        if let Some(role) = changes.role {
            model.role = Set(role);
        }
        if let Some(department) = changes.department {
            model.department = Set(department);
        }
        if let Some(is_active) = changes.is_active {
            model.is_active = Set(is_active);
        }
        model.updated_at = Set(now);

        model
            .update(&self.db)
            .await
            .map_err(|e| InternalError::database("update_user", e))
    }

    pub async fn set_role_by_username(
        &self,
        username: &str,
        role: UserRole,
        now: i64,
    ) -> Result<user::Model, InternalError> {
        let existing = self
            .find_by_username(username)
            .await?
            .ok_or_else(|| WorkflowError::not_found("user", username))?;

        self.update(&existing.id, UserUpdate { role: Some(role), ..Default::default() }, now)
            .await
    }

    /// Flip the active flag and return the updated record
    pub async fn toggle_active(&self, id: &str, now: i64) -> Result<user::Model, InternalError> {
        let existing = self.get(id).await?;
        let next = !existing.is_active;
        self.update(id, UserUpdate { is_active: Some(next), ..Default::default() }, now)
            .await
    }

    pub async fn soft_delete(&self, id: &str, now: i64) -> Result<(), InternalError> {
        let result = user::Entity::update_many()
            .col_expr(user::Column::DeletedAt, Expr::value(now))
            .col_expr(user::Column::IsActive, Expr::value(false))
            .col_expr(user::Column::UpdatedAt, Expr::value(now))
            .filter(user::Column::Id.eq(id))
            .filter(user::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| InternalError::database("soft_delete_user", e))?;

        if result.rows_affected == 0 {
            return Err(WorkflowError::not_found("user", id).into());
        }
        Ok(())
    }

    /// Live accounts with any of the given roles
    pub async fn list_active_by_roles(&self, roles: &[UserRole]) -> Result<Vec<user::Model>, InternalError> {
        user::Entity::find()
            .filter(user::Column::Role.is_in(roles.iter().copied()))
            .filter(user::Column::IsActive.eq(true))
            .filter(user::Column::DeletedAt.is_null())
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await
            .map_err(|e| InternalError::database("list_users_by_role", e))
    }
}
