//! User orchestration: login plus self-only mutation.

use std::sync::Arc;

use shelf_authz::{ensure_owner, Identity, TokenService};
use shelf_db::{NewUser, User, UserId, UserPatch, UserStore};
use tracing::instrument;

use crate::modules::error::{ServiceError, ServiceResult};

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Exchange an email and secret for a token bound to the user's id.
    #[instrument(skip_all)]
    pub async fn login(&self, email: &str, secret: &str) -> ServiceResult<String> {
        let user = match self.store.find_by_email(email).await {
            Ok(user) => user,
            Err(err) if err.is_not_found() => {
                tracing::warn!("login rejected: unknown email");
                return Err(ServiceError::Unauthorized);
            }
            Err(err) => return Err(err.into()),
        };

        if user.secret != secret {
            tracing::warn!(user_id = user.id, "login rejected: secret mismatch");
            return Err(ServiceError::Unauthorized);
        }

        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = user.id, "login succeeded");
        Ok(token)
    }

    pub async fn find_all(&self) -> ServiceResult<Vec<User>> {
        Ok(self.store.find_all().await?)
    }

    pub async fn find_by_id(&self, id: UserId) -> ServiceResult<User> {
        Ok(self.store.find_by_id(id).await?)
    }

    #[instrument(skip_all)]
    pub async fn create(&self, user: NewUser) -> ServiceResult<User> {
        let user = self.store.create(user).await?;
        tracing::info!(user_id = user.id, "user created");
        Ok(user)
    }

    #[instrument(skip(self, patch), fields(caller = caller.user_id()))]
    pub async fn update(
        &self,
        caller: &Identity,
        id: UserId,
        patch: UserPatch,
    ) -> ServiceResult<User> {
        ensure_owner(caller, "user", id)?;
        Ok(self.store.update(id, patch).await?)
    }

    #[instrument(skip(self), fields(caller = caller.user_id()))]
    pub async fn delete(&self, caller: &Identity, id: UserId) -> ServiceResult<()> {
        ensure_owner(caller, "user", id)?;
        self.store.delete_by_id(id).await?;
        tracing::info!(user_id = id, "user deleted");
        Ok(())
    }
}
