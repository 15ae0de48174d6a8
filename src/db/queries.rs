use chrono::Utc;
use rusqlite::{params, Connection};

// ── Session ──

pub fn load_session_token(conn: &Connection) -> anyhow::Result<Option<String>> {
    let result = conn.query_row("SELECT token FROM session WHERE id = 1", [], |row| {
        row.get::<_, String>(0)
    });

    match result {
        Ok(token) => Ok(Some(token)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn save_session_token(conn: &Connection, token: &str) -> anyhow::Result<()> {
    let now = Utc::now().naive_utc().format("%Y-%m-%d %H:%M:%S").to_string();
    conn.execute(
        "INSERT INTO session (id, token, updated_at) VALUES (1, ?1, ?2)
         ON CONFLICT(id) DO UPDATE SET token = excluded.token, updated_at = excluded.updated_at",
        params![token, now],
    )?;
    Ok(())
}

pub fn clear_session_token(conn: &Connection) -> anyhow::Result<bool> {
    let rows = conn.execute("DELETE FROM session WHERE id = 1", [])?;
    Ok(rows > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_session_token_lifecycle() {
        let conn = db::init_db(":memory:").unwrap();
        assert_eq!(load_session_token(&conn).unwrap(), None);

        save_session_token(&conn, "tok-1").unwrap();
        save_session_token(&conn, "tok-2").unwrap();
        assert_eq!(load_session_token(&conn).unwrap().as_deref(), Some("tok-2"));

        assert!(clear_session_token(&conn).unwrap());
        assert!(!clear_session_token(&conn).unwrap());
        assert_eq!(load_session_token(&conn).unwrap(), None);
    }
}
