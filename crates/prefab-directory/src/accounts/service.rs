use std::sync::Arc;

use chrono::Duration;
use tracing::{info, warn};

use super::domain::{
    AuthenticatedUser, LoginRequest, NewUser, Role, User, UserChanges, UserId, UserInput,
    UserUpdate, UserView,
};
use super::password::{
    hash_password, verify_against_dummy, verify_password, MIN_PASSWORD_LEN,
};
use super::repository::UserRepository;
use super::session::{Session, SessionManager};
use crate::error::ServiceError;
use crate::storage::StoreError;
use crate::validation::{clean, Validator, MAX_NAME_LEN};

/// Login, session resolution, and user administration.
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    sessions: SessionManager,
}

impl AccountService {
    pub fn new(users: Arc<dyn UserRepository>, session_ttl: Duration) -> Self {
        Self {
            users,
            sessions: SessionManager::new(session_ttl),
        }
    }

    pub fn session_ttl(&self) -> Duration {
        self.sessions.ttl()
    }

    pub fn login(&self, request: LoginRequest) -> Result<(Session, UserView), ServiceError> {
        let email = request.email.trim().to_lowercase();
        let verified = match self.users.fetch_by_email(&email)? {
            Some(user) => verify_password(&request.password, &user.password_hash).then_some(user),
            None => {
                verify_against_dummy(&request.password);
                None
            }
        };
        let user = match verified {
            Some(user) => user,
            None => {
                warn!(%email, "rejected login attempt");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        let session = self.sessions.issue(&user);
        info!(user_id = user.id.0, "user signed in");
        Ok((session, user.view()))
    }

    pub fn logout(&self, token: &str) {
        self.sessions.revoke(token);
    }

    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, ServiceError> {
        let session = self
            .sessions
            .resolve(token)
            .ok_or(ServiceError::Unauthorized)?;

        Ok(AuthenticatedUser {
            user_id: session.user_id,
            role: session.role,
            token: session.token,
        })
    }

    pub fn current_user(&self, actor: &AuthenticatedUser) -> Result<UserView, ServiceError> {
        let user = self
            .users
            .fetch(actor.user_id)?
            .ok_or(ServiceError::Unauthorized)?;
        Ok(user.view())
    }

    pub fn list_users(&self) -> Result<Vec<UserView>, ServiceError> {
        Ok(self.users.list()?.iter().map(User::view).collect())
    }

    pub fn get_user(&self, id: UserId) -> Result<UserView, ServiceError> {
        self.users
            .fetch(id)?
            .map(|user| user.view())
            .ok_or(ServiceError::NotFound("user"))
    }

    pub fn create_user(&self, input: UserInput) -> Result<UserView, ServiceError> {
        let mut validator = Validator::new();
        validator
            .email("email", &input.email)
            .required("name", &input.name, MAX_NAME_LEN);
        check_password(&mut validator, &input.password);
        validator.finish()?;

        let password_hash =
            hash_password(&input.password).map_err(|err| ServiceError::Internal(err.to_string()))?;
        let user = self.users.insert(&NewUser {
            email: input.email.trim().to_lowercase(),
            name: input.name.trim().to_string(),
            password_hash,
            role: input.role,
        })?;

        info!(user_id = user.id.0, role = user.role.label(), "user created");
        Ok(user.view())
    }

    pub fn update_user(
        &self,
        actor: &AuthenticatedUser,
        id: UserId,
        update: UserUpdate,
    ) -> Result<UserView, ServiceError> {
        let existing = self.users.fetch(id)?.ok_or(ServiceError::NotFound("user"))?;

        let mut validator = Validator::new();
        let name = match clean(update.name) {
            Some(name) => {
                validator.required("name", &name, MAX_NAME_LEN);
                name
            }
            None => existing.name.clone(),
        };
        if let Some(password) = update.password.as_deref() {
            check_password(&mut validator, password);
        }
        validator.finish()?;

        let role = update.role.unwrap_or(existing.role);

        let password_hash = match update.password.as_deref() {
            Some(password) => Some(
                hash_password(password).map_err(|err| ServiceError::Internal(err.to_string()))?,
            ),
            None => None,
        };
        let password_changed = password_hash.is_some();

        let user = self
            .users
            .update(
                id,
                &UserChanges {
                    name,
                    role,
                    password_hash,
                },
            )
            .map_err(|err| last_admin_as("cannot demote the last admin", err))?;

        if password_changed && actor.user_id != id {
            self.sessions.revoke_user(id);
        } else {
            self.sessions.update_role(id, role);
        }

        info!(user_id = id.0, actor = actor.user_id.0, "user updated");
        Ok(user.view())
    }

    pub fn delete_user(&self, actor: &AuthenticatedUser, id: UserId) -> Result<(), ServiceError> {
        if actor.user_id == id {
            return Err(ServiceError::BadRequest(
                "you cannot delete your own account".to_string(),
            ));
        }

        self.users
            .delete(id)
            .map_err(|err| last_admin_as("cannot delete the last admin", err))?;
        self.sessions.revoke_user(id);
        info!(user_id = id.0, actor = actor.user_id.0, "user deleted");
        Ok(())
    }

    /// Creates the first admin when no accounts exist yet. Returns `None` when users already exist.
    pub fn ensure_bootstrap_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserView>, ServiceError> {
        if self.users.count()? > 0 {
            return Ok(None);
        }

        let created = self.create_user(UserInput {
            email: email.to_string(),
            name: "Administrator".to_string(),
            password: password.to_string(),
            role: Role::Admin,
        })?;
        Ok(Some(created))
    }
}

/// The store refuses to leave the system without an admin; phrase that for the caller.
fn last_admin_as(message: &str, err: StoreError) -> ServiceError {
    match err {
        StoreError::LastAdmin => ServiceError::BadRequest(message.to_string()),
        other => other.into(),
    }
}

fn check_password(validator: &mut Validator, password: &str) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        validator.fail(
            "password",
            format!("must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Barrier;
    use std::thread;

    use super::*;
    use crate::storage::SqliteStore;

    fn seeded_admin(store: &SqliteStore, email: &str) -> UserId {
        store
            .insert(&NewUser {
                email: email.to_string(),
                name: "Admin".to_string(),
                password_hash: "$argon2id$placeholder".to_string(),
                role: Role::Admin,
            })
            .expect("insert admin")
            .id
    }

    fn acting_as(user_id: UserId) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id,
            role: Role::Admin,
            token: format!("token-{}", user_id.0),
        }
    }

    fn demotion() -> UserUpdate {
        UserUpdate {
            name: None,
            role: Some(Role::Editor),
            password: None,
        }
    }

    #[test]
    fn demoting_the_only_admin_is_refused() {
        let store = Arc::new(SqliteStore::open_in_memory().expect("store"));
        let first = seeded_admin(&store, "first@example.com");
        let second = seeded_admin(&store, "second@example.com");
        let service = AccountService::new(store, Duration::hours(1));

        service
            .update_user(&acting_as(first), second, demotion())
            .expect("one admin remains");
        let err = service
            .update_user(&acting_as(second), first, demotion())
            .expect_err("last admin");
        assert!(matches!(
            err,
            ServiceError::BadRequest(message) if message == "cannot demote the last admin"
        ));

        let err = service
            .delete_user(&acting_as(second), first)
            .expect_err("last admin");
        assert!(matches!(
            err,
            ServiceError::BadRequest(message) if message == "cannot delete the last admin"
        ));
    }

    #[test]
    fn concurrent_mutual_demotion_keeps_one_admin() {
        for _ in 0..50 {
            let store = Arc::new(SqliteStore::open_in_memory().expect("store"));
            let first = seeded_admin(&store, "first@example.com");
            let second = seeded_admin(&store, "second@example.com");
            let service = Arc::new(AccountService::new(store.clone(), Duration::hours(1)));
            let barrier = Arc::new(Barrier::new(2));

            let handles: Vec<_> = [(first, second), (second, first)]
                .into_iter()
                .map(|(actor, target)| {
                    let service = Arc::clone(&service);
                    let barrier = Arc::clone(&barrier);
                    thread::spawn(move || {
                        barrier.wait();
                        service.update_user(&acting_as(actor), target, demotion())
                    })
                })
                .collect();
            let outcomes: Vec<_> = handles
                .into_iter()
                .map(|handle| handle.join().expect("demotion thread"))
                .collect();

            assert_eq!(outcomes.iter().filter(|outcome| outcome.is_ok()).count(), 1);
            let admins = store
                .list()
                .expect("list")
                .into_iter()
                .filter(|user| user.role == Role::Admin)
                .count();
            assert_eq!(admins, 1);
        }
    }
}
