use crate::{
    auth::Authenticator,
    backend::{blocking, AppointmentBackend},
    error::AppError,
    types::{Identity, Role, User},
};
use tracing::{info, warn};

/// Registration and login against the credential store.
#[derive(Clone)]
pub struct AccountService<T: AppointmentBackend> {
    backend: T,
    authenticator: Authenticator,
}

impl<T: AppointmentBackend> AccountService<T> {
    pub fn new(backend: T, authenticator: Authenticator) -> Self {
        Self {
            backend,
            authenticator,
        }
    }

    pub async fn register(
        &self,
        username: String,
        password: String,
        role: Role,
    ) -> Result<User, AppError> {
        if self.find_user(username.clone()).await?.is_some() {
            return Err(AppError::DuplicateUsername);
        }

        let password_hash = self.authenticator.hash_password(password).await?;
        let backend = self.backend.clone();
        let user = blocking(move || Ok(backend.add_user(username, password_hash, role)?)).await?;
        info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    /// Returns a signed token for the user on success.
    pub async fn login(&self, username: &str, password: String) -> Result<String, AppError> {
        let Some(user) = self.find_user(username.to_owned()).await? else {
            warn!(username, "Login for unknown user");
            return Err(AppError::InvalidCredentials);
        };

        if !self
            .authenticator
            .verify_password(password, user.password_hash.clone())
            .await?
        {
            warn!(user_id = user.id, "Login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        self.authenticator.issue_token(Identity {
            id: user.id,
            role: user.role,
        })
    }

    async fn find_user(&self, username: String) -> Result<Option<User>, AppError> {
        let backend = self.backend.clone();
        blocking(move || Ok(backend.user_by_username(&username)?)).await
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::local_ledger::LocalLedger;

    fn account_service() -> (AccountService<LocalLedger>, Authenticator) {
        let authenticator = Authenticator::new("test-secret", 4);
        (
            AccountService::new(LocalLedger::default(), authenticator.clone()),
            authenticator,
        )
    }

    #[tokio::test]
    async fn test_register_stores_hashed_password() {
        let (accounts, _) = account_service();
        let user = accounts
            .register("studentA1".into(), "password".into(), Role::Student)
            .await
            .unwrap();

        assert_eq!(user.username, "studentA1");
        assert_eq!(user.role, Role::Student);
        assert_ne!(user.password_hash, "password");
    }

    #[tokio::test]
    async fn test_duplicate_registration_fails() {
        let (accounts, _) = account_service();
        accounts
            .register("professorP1".into(), "password".into(), Role::Professor)
            .await
            .unwrap();

        let err = accounts
            .register("professorP1".into(), "other".into(), Role::Student)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateUsername));
    }

    #[tokio::test]
    async fn test_login_issues_token_with_identity() {
        let (accounts, authenticator) = account_service();
        let user = accounts
            .register("professorP1".into(), "password".into(), Role::Professor)
            .await
            .unwrap();

        let token = accounts
            .login("professorP1", "password".into())
            .await
            .unwrap();
        let identity = authenticator.verify_token(&token).unwrap();
        assert_eq!(
            identity,
            Identity {
                id: user.id,
                role: Role::Professor
            }
        );
    }

    #[test_case::test_case("studentA1", "wrong" ; "wrong password")]
    #[test_case::test_case("nobody", "password" ; "unknown user")]
    #[tokio::test]
    async fn test_login_rejects_bad_credentials(username: &str, password: &str) {
        let (accounts, _) = account_service();
        accounts
            .register("studentA1".into(), "password".into(), Role::Student)
            .await
            .unwrap();

        let err = accounts
            .login(username, password.into())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }
}
