use std::path::Path;

use tracing::{debug, warn};

use aid_store::KvStore;
use aid_types::{User, UserId};

use crate::error::ClientError;

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";
const USER_ID_KEY: &str = "user_id";

/// An authenticated identity: bearer token plus the user it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

impl Session {
    pub fn user_id(&self) -> UserId {
        self.user.user_id
    }
}

/// Durable session storage backed by the local key/value store.
pub struct SessionStore {
    db: KvStore,
}

impl SessionStore {
    pub fn open(path: &Path) -> Result<Self, ClientError> {
        let db = KvStore::open(path)?;
        Ok(Self { db })
    }

    pub fn in_memory() -> Result<Self, ClientError> {
        let db = KvStore::open_in_memory()?;
        Ok(Self { db })
    }

    pub fn save(&self, session: &Session) -> Result<(), ClientError> {
        let user_json = serde_json::to_string(&session.user)?;
        let user_id = session.user.user_id.to_string();
        self.db
            .set_many(&[
                (TOKEN_KEY, session.token.as_str()),
                (USER_KEY, user_json.as_str()),
                (USER_ID_KEY, user_id.as_str()),
            ])
            ?;
        debug!("Session saved for user {}", session.user.user_id);
        Ok(())
    }

    /// Load the persisted session. A partially written or corrupt session is
    /// treated as logged out.
    pub fn load(&self) -> Result<Option<Session>, ClientError> {
        let token = self.db.get(TOKEN_KEY)?;
        let user = self.db.get(USER_KEY)?;

        let (Some(token), Some(user)) = (token, user) else {
            return Ok(None);
        };

        match serde_json::from_str::<User>(&user) {
            Ok(user) => Ok(Some(Session { token, user })),
            Err(e) => {
                warn!("Ignoring corrupt stored user record: {}", e);
                Ok(None)
            }
        }
    }

    /// Like `load`, but a missing session is an error.
    pub fn require(&self) -> Result<Session, ClientError> {
        self.load()?.ok_or(ClientError::NotAuthenticated)
    }

    pub fn clear(&self) -> Result<(), ClientError> {
        let removed = self
            .db
            .remove_many(&[TOKEN_KEY, USER_KEY, USER_ID_KEY])
            ?;
        debug!("Session cleared ({} entries)", removed);
        Ok(())
    }
}
