use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::store::SessionStore;
use crate::error::{DiscoveryError, Result};
use crate::models::{LoginForm, SessionUser, SignupForm};

pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in all fields";
pub const PASSWORD_MISMATCH_MESSAGE: &str = "Passwords do not match";

/// 身份提供者
///
/// 本地模拟实现与真实实现共用该接口，替换时调用方无需改动
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn login(&self, form: &LoginForm) -> Result<SessionUser>;
    async fn signup(&self, form: &SignupForm) -> Result<SessionUser>;
}

/// 模拟身份提供者：任意非空邮箱和密码均可登录
#[derive(Debug, Clone)]
pub struct StubIdentityProvider {
    latency: Duration,
}

impl StubIdentityProvider {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    async fn simulate_round_trip(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

impl Default for StubIdentityProvider {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    async fn login(&self, form: &LoginForm) -> Result<SessionUser> {
        self.simulate_round_trip().await;

        if form.email.is_empty() || form.password.is_empty() {
            return Err(DiscoveryError::Auth(MISSING_FIELDS_MESSAGE.to_string()));
        }

        // 用户名取邮箱 @ 之前的部分
        let username = form.email.split('@').next().unwrap_or_default();
        Ok(SessionUser::new(form.email.clone(), username))
    }

    async fn signup(&self, form: &SignupForm) -> Result<SessionUser> {
        self.simulate_round_trip().await;

        if form.email.is_empty() || form.password.is_empty() || form.username.is_empty() {
            return Err(DiscoveryError::Auth(MISSING_FIELDS_MESSAGE.to_string()));
        }

        Ok(SessionUser::new(form.email.clone(), form.username.clone()))
    }
}

/// 会话管理：持有当前用户，负责登录、注册、登出
pub struct SessionManager {
    provider: Arc<dyn IdentityProvider>,
    store: SessionStore,
    current: watch::Sender<Option<SessionUser>>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: SessionStore) -> Self {
        let (current, _) = watch::channel(None);
        Self {
            provider,
            store,
            current,
        }
    }

    /// 启动时加载一次已保存的用户
    pub async fn restore(&self) -> Result<Option<SessionUser>> {
        let user = self.store.load().await?;
        if let Some(ref user) = user {
            tracing::info!("Restored session for {}", user.username);
        }
        self.current.send_replace(user.clone());
        Ok(user)
    }

    pub async fn login(&self, form: &LoginForm) -> Result<SessionUser> {
        let user = self.provider.login(form).await?;
        self.establish(user).await
    }

    /// 注册前先校验两次密码一致
    pub async fn signup(&self, form: &SignupForm) -> Result<SessionUser> {
        if form.password != form.confirm_password {
            return Err(DiscoveryError::Auth(PASSWORD_MISMATCH_MESSAGE.to_string()));
        }
        let user = self.provider.signup(form).await?;
        self.establish(user).await
    }

    pub async fn logout(&self) -> Result<()> {
        self.store.clear().await?;
        if let Some(user) = self.current.send_replace(None) {
            tracing::info!("{} signed out", user.username);
        }
        Ok(())
    }

    pub fn current_user(&self) -> Option<SessionUser> {
        self.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SessionUser>> {
        self.current.subscribe()
    }

    async fn establish(&self, user: SessionUser) -> Result<SessionUser> {
        self.store.save(&user).await?;
        tracing::info!("{} signed in", user.username);
        self.current.send_replace(Some(user.clone()));
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::store::MemoryKeyValueStore;

    fn manager() -> SessionManager {
        let store = SessionStore::new(Arc::new(MemoryKeyValueStore::new()));
        SessionManager::new(Arc::new(StubIdentityProvider::new(Duration::ZERO)), store)
    }

    #[tokio::test]
    async fn test_login_derives_username_from_email() {
        let sessions = manager();
        let user = sessions
            .login(&LoginForm {
                email: "morpheus@nebuchadnezzar.io".to_string(),
                password: "redpill".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(user.username, "morpheus");
        assert!(user.is_logged_in);
        assert_eq!(sessions.current_user(), Some(user));
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let sessions = manager();
        let err = sessions
            .login(&LoginForm {
                email: "a@b.c".to_string(),
                password: String::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), MISSING_FIELDS_MESSAGE);
        assert!(sessions.current_user().is_none());
    }

    #[tokio::test]
    async fn test_signup_password_mismatch() {
        let sessions = manager();
        let err = sessions
            .signup(&SignupForm {
                username: "neo".to_string(),
                email: "neo@matrix.io".to_string(),
                password: "one".to_string(),
                confirm_password: "two".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), PASSWORD_MISMATCH_MESSAGE);
    }

    #[tokio::test]
    async fn test_signup_requires_username() {
        let sessions = manager();
        let err = sessions
            .signup(&SignupForm {
                username: String::new(),
                email: "neo@matrix.io".to_string(),
                password: "pw".to_string(),
                confirm_password: "pw".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), MISSING_FIELDS_MESSAGE);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stub_simulates_latency() {
        let provider = StubIdentityProvider::new(Duration::from_millis(1000));
        let started = tokio::time::Instant::now();
        provider
            .login(&LoginForm {
                email: "a@b.c".to_string(),
                password: "pw".to_string(),
            })
            .await
            .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(1000));
    }
}
