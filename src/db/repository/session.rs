use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

/// Persist a session. `token_hash` is the SHA-256 hex of the cookie value.
pub fn insert_session(
    conn: &Connection,
    token_hash: &str,
    user_id: &str,
    user_type: UserType,
    user_name: &str,
    created_at: &str,
    expires_at: &str,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO sessions (user_id, user_type, user_name, session_token, created_at, expires_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id,
            user_type.as_str(),
            user_name,
            token_hash,
            created_at,
            expires_at
        ],
    )?;
    Ok(())
}

/// Resolve a token hash to its session, ignoring expired rows.
pub fn get_active_session(
    conn: &Connection,
    token_hash: &str,
    now: &str,
) -> Result<Option<SessionUser>, DatabaseError> {
    let row = conn
        .query_row(
            "SELECT user_id, user_type, user_name, expires_at FROM sessions
             WHERE session_token = ?1 AND expires_at > ?2",
            params![token_hash, now],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()?;

    match row {
        Some((user_id, user_type, user_name, expires_at)) => Ok(Some(SessionUser {
            user_id,
            user_type: user_type.parse()?,
            user_name,
            expires_at,
        })),
        None => Ok(None),
    }
}

/// Returns whether a row was removed.
pub fn delete_session(conn: &Connection, token_hash: &str) -> Result<bool, DatabaseError> {
    let n = conn.execute(
        "DELETE FROM sessions WHERE session_token = ?1",
        params![token_hash],
    )?;
    Ok(n > 0)
}

pub fn purge_expired_sessions(conn: &Connection, now: &str) -> Result<usize, DatabaseError> {
    let n = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", params![now])?;
    Ok(n)
}
