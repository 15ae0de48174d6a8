use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::db::queries;

/// Authenticated session for API calls. Passed explicitly to whatever issues
/// requests; the token is read per request.
#[derive(Default)]
pub struct Session {
    db: Option<Arc<Mutex<Connection>>>,
    token: Mutex<Option<String>>,
}

impl Session {
    /// Session that is not persisted anywhere.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Loads a previously attached token from the store, if any.
    pub fn restore(db: Arc<Mutex<Connection>>) -> anyhow::Result<Self> {
        let token = {
            let conn = lock(&db)?;
            queries::load_session_token(&conn)?
        };
        if token.is_some() {
            tracing::info!("restored saved session");
        }
        Ok(Self {
            db: Some(db),
            token: Mutex::new(token),
        })
    }

    pub fn attach(&self, token: &str) -> anyhow::Result<()> {
        if let Some(db) = &self.db {
            let conn = lock(db)?;
            queries::save_session_token(&conn, token)?;
        }
        *self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))? = Some(token.to_string());
        tracing::info!("session attached");
        Ok(())
    }

    pub fn clear(&self) -> anyhow::Result<()> {
        if let Some(db) = &self.db {
            let conn = lock(db)?;
            queries::clear_session_token(&conn)?;
        }
        *self
            .token
            .lock()
            .map_err(|_| anyhow::anyhow!("session lock poisoned"))? = None;
        tracing::info!("session cleared");
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }
}

fn lock(db: &Mutex<Connection>) -> anyhow::Result<std::sync::MutexGuard<'_, Connection>> {
    db.lock().map_err(|_| anyhow::anyhow!("database lock poisoned"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[test]
    fn test_in_memory_attach_clear() {
        let session = Session::in_memory();
        assert!(!session.is_authenticated());
        session.attach("abc").unwrap();
        assert_eq!(session.token().as_deref(), Some("abc"));
        session.clear().unwrap();
        assert!(session.token().is_none());
    }

    #[test]
    fn test_persisted_session_survives_restore() {
        let conn = Arc::new(Mutex::new(db::init_db(":memory:").unwrap()));

        let session = Session::restore(Arc::clone(&conn)).unwrap();
        assert!(!session.is_authenticated());
        session.attach("persisted").unwrap();

        let restored = Session::restore(Arc::clone(&conn)).unwrap();
        assert_eq!(restored.token().as_deref(), Some("persisted"));

        restored.clear().unwrap();
        let after_clear = Session::restore(conn).unwrap();
        assert!(!after_clear.is_authenticated());
    }
}
