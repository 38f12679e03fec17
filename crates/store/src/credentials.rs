//! Stored Instagram credentials.

use postcraft_common::error::PostcraftResult;

use crate::kv::SharedStore;

pub const ACCESS_TOKEN_KEY: &str = "instagram_access_token";
pub const USER_ID_KEY: &str = "instagram_user_id";

/// Long-lived access token plus the account it belongs to.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    pub user_id: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

#[derive(Clone)]
pub struct CredentialStore {
    store: SharedStore,
}

impl CredentialStore {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Both values must be present; half a pair counts as logged out.
    pub fn load(&self) -> PostcraftResult<Option<Credentials>> {
        let token = self.store.get_item(ACCESS_TOKEN_KEY)?;
        let user_id = self.store.get_item(USER_ID_KEY)?;
        Ok(match (token, user_id) {
            (Some(access_token), Some(user_id))
                if !access_token.is_empty() && !user_id.is_empty() =>
            {
                Some(Credentials {
                    access_token,
                    user_id,
                })
            }
            _ => None,
        })
    }

    pub fn save(&self, credentials: &Credentials) -> PostcraftResult<()> {
        self.store
            .set_item(ACCESS_TOKEN_KEY, &credentials.access_token)?;
        self.store.set_item(USER_ID_KEY, &credentials.user_id)
    }

    pub fn clear(&self) -> PostcraftResult<()> {
        self.store.remove_item(ACCESS_TOKEN_KEY)?;
        self.store.remove_item(USER_ID_KEY)
    }
}
