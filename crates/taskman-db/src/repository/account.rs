//! SurrealDB implementation of [`AccountRepository`].
//!
//! Passwords arrive already hashed; this layer never sees plaintext.
//! Active-email uniqueness is enforced by the `email_key` unique index
//! (see the schema), and a violation surfaces as `AlreadyExists`.

use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use taskman_core::error::TaskmanResult;
use taskman_core::models::account::{Account, CreateAccount, Role, UpdateAccount};
use taskman_core::repository::AccountRepository;
use uuid::Uuid;

use crate::error::DbError;

const ENTITY: &str = "account";

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct AccountRow {
    email: String,
    name: String,
    password_hash: String,
    role: String,
    phone: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct AccountRowWithId {
    record_id: String,
    email: String,
    name: String,
    password_hash: String,
    role: String,
    phone: Option<String>,
    location: Option<String>,
    bio: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    s.parse().map_err(|e: String| DbError::decode(ENTITY, e))
}

/// Value held in `email_key` after a soft delete.
fn tombstone(id: &str) -> String {
    format!("deleted:{id}")
}

impl AccountRow {
    fn into_account(self, id: Uuid) -> Result<Account, DbError> {
        Ok(Account {
            id,
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            phone: self.phone,
            location: self.location,
            bio: self.bio,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        })
    }
}

impl AccountRowWithId {
    fn try_into_account(self) -> Result<Account, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::decode(ENTITY, format!("invalid UUID: {e}")))?;
        AccountRow {
            email: self.email,
            name: self.name,
            password_hash: self.password_hash,
            role: self.role,
            phone: self.phone,
            location: self.location,
            bio: self.bio,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
        .into_account(id)
    }
}

/// SurrealDB implementation of the Account repository.
#[derive(Clone)]
pub struct SurrealAccountRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAccountRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AccountRepository for SurrealAccountRepository<C> {
    async fn create(&self, input: CreateAccount) -> TaskmanResult<Account> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('account', $id) SET \
                 email = $email, email_key = $email, \
                 name = $name, \
                 password_hash = $password_hash, \
                 role = $role, \
                 phone = $phone, location = $location, bio = $bio",
            )
            .bind(("id", id_str.clone()))
            .bind(("email", input.email))
            .bind(("name", input.name))
            .bind(("password_hash", input.password_hash))
            .bind(("role", input.role.as_str().to_string()))
            .bind(("phone", input.phone))
            .bind(("location", input.location))
            .bind(("bio", input.bio))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e, ENTITY))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: ENTITY.into(),
            id: id_str,
        })?;

        Ok(row.into_account(id)?)
    }

    async fn find_by_id(&self, id: Uuid) -> TaskmanResult<Option<Account>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('account', $id) \
                 WHERE deleted_at IS NONE",
            )
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_account(id)?)),
            None => Ok(None),
        }
    }

    async fn find_by_email(&self, email: &str) -> TaskmanResult<Option<Account>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM account \
                 WHERE email = $email AND deleted_at IS NONE",
            )
            .bind(("email", email.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRowWithId> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.try_into_account()?)),
            None => Ok(None),
        }
    }

    async fn update(&self, id: Uuid, input: UpdateAccount) -> TaskmanResult<Option<Account>> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.email.is_some() {
            sets.push("email = $email, email_key = $email");
        }
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        if input.role.is_some() {
            sets.push("role = $role");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.location.is_some() {
            sets.push("location = $location");
        }
        if input.bio.is_some() {
            sets.push("bio = $bio");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('account', $id) SET {} \
             WHERE deleted_at IS NONE",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str));

        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(password_hash) = input.password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }
        if let Some(role) = input.role {
            builder = builder.bind(("role", role.as_str().to_string()));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(location) = input.location {
            builder = builder.bind(("location", location));
        }
        if let Some(bio) = input.bio {
            builder = builder.bind(("bio", bio));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::from_write(e, ENTITY))?;

        let rows: Vec<AccountRow> = result.take(0).map_err(DbError::from)?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_account(id)?)),
            None => Ok(None),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> TaskmanResult<()> {
        let id_str = id.to_string();

        self.db
            .query(
                "UPDATE type::record('account', $id) SET \
                 deleted_at = time::now(), updated_at = time::now(), \
                 email_key = $tombstone \
                 WHERE deleted_at IS NONE",
            )
            .bind(("tombstone", tombstone(&id_str)))
            .bind(("id", id_str))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::from_write(e, ENTITY))?;

        Ok(())
    }

    async fn list_active(&self) -> TaskmanResult<Vec<Account>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM account \
                 WHERE deleted_at IS NONE \
                 ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AccountRowWithId> = result.take(0).map_err(DbError::from)?;

        let accounts = rows
            .into_iter()
            .map(|row| row.try_into_account())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tombstone_is_unique_per_row_and_not_an_email() {
        let a = tombstone("1");
        let b = tombstone("2");
        assert_ne!(a, b);
        assert!(!a.contains('@'));
    }

    #[test]
    fn stored_roles_parse() {
        assert_eq!(parse_role("admin").unwrap(), Role::Admin);
        assert_eq!(parse_role("member").unwrap(), Role::Member);
        assert!(parse_role("owner").is_err());
    }
}
