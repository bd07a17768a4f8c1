use super::rows::UserRowFactory;
use crate::error::{Error, Result};
use crate::model::{Role, UserIdentity};
use rusqlite::{Connection, OptionalExtension, params};

pub struct UsersRepository<'a> {
    conn: &'a Connection,
}

impl<'a> UsersRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        UsersRepository { conn }
    }

    /// Insert or replace a roster entry
    pub fn upsert(&self, user: &UserIdentity) -> Result<()> {
        if user.user_id.is_empty() {
            return Err(Error::InvalidInput("user id must not be empty".to_string()));
        }

        self.conn.execute(
            "INSERT INTO users (user_id, display_name, email, photo_url, role)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(user_id) DO UPDATE SET
                display_name = excluded.display_name,
                email = excluded.email,
                photo_url = excluded.photo_url,
                role = excluded.role",
            params![
                user.user_id,
                user.display_name,
                user.email,
                user.photo_url,
                user.role.as_str()
            ],
        )?;
        Ok(())
    }

    pub fn get(&self, user_id: &str) -> Result<Option<UserIdentity>> {
        let raw = self
            .conn
            .query_row(
                "SELECT user_id, display_name, email, photo_url, role FROM users WHERE user_id = ?1",
                [user_id],
                UserRowFactory::from_row,
            )
            .optional()?;

        raw.map(UserIdentity::try_from).transpose()
    }

    /// Users with the given role, ordered by user id
    pub fn by_role(&self, role: Role) -> Result<Vec<UserIdentity>> {
        let mut stmt = self.conn.prepare(
            "SELECT user_id, display_name, email, photo_url, role
             FROM users WHERE role = ?1 ORDER BY user_id",
        )?;
        let raw_rows = stmt
            .query_map([role.as_str()], UserRowFactory::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        raw_rows.into_iter().map(UserIdentity::try_from).collect()
    }

    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }
}
