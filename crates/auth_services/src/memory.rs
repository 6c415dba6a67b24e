//! In-memory session store used by handler tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::cookie::SESSION_TTL_DAYS;
use crate::session::{Flash, FlashKind, Session, SessionError, SessionStore};

#[derive(Clone)]
struct Record {
    session: Session,
    flash: Flash,
}

/// Session store holding everything in a mutex-guarded map.
pub struct InMemorySessionStore {
    records: Mutex<HashMap<Uuid, Record>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Peeks at the flash slots without clearing them.
    pub fn peek_flash(&self, session_id: &Uuid) -> Flash {
        self.records
            .lock()
            .unwrap()
            .get(session_id)
            .map(|record| record.flash.clone())
            .unwrap_or_default()
    }

    /// Returns the user bound to a session, if any.
    pub fn user_of(&self, session_id: &Uuid) -> Option<Uuid> {
        self.records
            .lock()
            .unwrap()
            .get(session_id)
            .and_then(|record| record.session.user_id)
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self) -> Result<Session, SessionError> {
        let session = Session {
            id: Uuid::new_v4(),
            user_id: None,
            expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
        };
        self.records.lock().unwrap().insert(
            session.id,
            Record {
                session: session.clone(),
                flash: Flash::default(),
            },
        );
        Ok(session)
    }

    async fn get(&self, session_id: &Uuid) -> Result<Option<Session>, SessionError> {
        let records = self.records.lock().unwrap();
        Ok(records
            .get(session_id)
            .filter(|record| record.session.expires_at > Utc::now())
            .map(|record| record.session.clone()))
    }

    async fn set_user(&self, session_id: &Uuid, user_id: Option<Uuid>) -> Result<(), SessionError> {
        if let Some(record) = self.records.lock().unwrap().get_mut(session_id) {
            record.session.user_id = user_id;
        }
        Ok(())
    }

    async fn push_flash(
        &self,
        session_id: &Uuid,
        kind: FlashKind,
        message: &str,
    ) -> Result<(), SessionError> {
        if let Some(record) = self.records.lock().unwrap().get_mut(session_id) {
            match kind {
                FlashKind::Success => record.flash.success = Some(message.to_string()),
                FlashKind::Error => record.flash.error = Some(message.to_string()),
            }
        }
        Ok(())
    }

    async fn take_flash(&self, session_id: &Uuid) -> Result<Flash, SessionError> {
        let mut records = self.records.lock().unwrap();
        Ok(records
            .get_mut(session_id)
            .map(|record| std::mem::take(&mut record.flash))
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_flash_is_read_once() {
        let store = InMemorySessionStore::new();
        let session = store.create().await.unwrap();

        store
            .push_flash(&session.id, FlashKind::Success, "Welcome back!")
            .await
            .unwrap();

        let flash = store.take_flash(&session.id).await.unwrap();
        assert_eq!(flash.success.as_deref(), Some("Welcome back!"));
        assert_eq!(flash.error, None);

        // Cleared after the first take.
        assert_eq!(store.take_flash(&session.id).await.unwrap(), Flash::default());
    }

    #[tokio::test]
    async fn test_set_user_binds_and_clears() {
        let store = InMemorySessionStore::new();
        let session = store.create().await.unwrap();
        let user_id = Uuid::new_v4();

        store.set_user(&session.id, Some(user_id)).await.unwrap();
        assert_eq!(
            store.get(&session.id).await.unwrap().unwrap().user_id,
            Some(user_id)
        );

        store.set_user(&session.id, None).await.unwrap();
        assert_eq!(store.get(&session.id).await.unwrap().unwrap().user_id, None);
    }

    #[tokio::test]
    async fn test_unknown_session_is_none() {
        let store = InMemorySessionStore::new();
        assert!(store.get(&Uuid::new_v4()).await.unwrap().is_none());
    }
}
