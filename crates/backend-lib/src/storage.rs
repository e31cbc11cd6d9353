// ============================
// chatterd-backend-lib/src/storage.rs
// ============================
//! Storage abstraction with flat-file implementations.
//!
//! Two traits back the identity core: [`UserDirectory`] persists account
//! records and [`AttemptStore`] keeps the append-only failed-login log the
//! lockout tracker counts over. Both are injected as trait objects so tests
//! can run against an isolated temp directory.
use crate::error::AppError;
use async_trait::async_trait;
use chatterd_common::{AccountId, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs as tokio_fs, io::AsyncWriteExt, sync::Mutex, sync::RwLock};

/// A stored account row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub id: AccountId,
    /// Normalized (trimmed, lowercased) email, unique across accounts
    pub email: String,
    /// Unique display name; defaults to the local part of the email
    pub display_name: String,
    /// Opaque PHC-format password hash, never empty
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// One failed authentication try.
///
/// Keyed by the submitted identifier rather than an account id, so attempts
/// against unknown identifiers are tracked without revealing which accounts
/// exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedAttempt {
    /// Identifier exactly as submitted (email or display name)
    pub identifier: String,
    /// Origin address of the attempt
    pub origin: String,
    pub attempted_at: DateTime<Utc>,
}

/// Trait for account storage backends
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert a new account, enforcing email and display-name uniqueness.
    /// This check is the final authority under concurrent registration.
    async fn insert_account(
        &self,
        email: &str,
        password_hash: &str,
        display_name: &str,
    ) -> Result<AccountId, AppError>;

    /// Look an account up by email (case-insensitive) or display name.
    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountRecord>, AppError>;

    /// Look an account up by id.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<AccountRecord>, AppError>;

    /// Whether an account with this email exists (case-insensitive).
    async fn email_exists(&self, email: &str) -> Result<bool, AppError>;

    /// All accounts, for the admin listing.
    async fn list_accounts(&self) -> Result<Vec<AccountRecord>, AppError>;
}

/// Trait for failed-attempt log backends
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Append one attempt as a discrete durable write. Concurrent appends
    /// must never lose a record.
    async fn append(&self, attempt: &FailedAttempt) -> Result<(), AppError>;

    /// Count attempts for `identifier` with `attempted_at >= cutoff`.
    /// The boundary is inclusive: a record exactly at the cutoff counts.
    async fn count_since(&self, identifier: &str, cutoff: DateTime<Utc>)
        -> Result<u32, AppError>;

    /// Delete every record for `identifier`, expired or not.
    /// Returns the number of records removed.
    async fn clear(&self, identifier: &str) -> Result<u64, AppError>;

    /// Delete records strictly older than `cutoff`, for all identifiers.
    /// Returns the number of records removed.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}

#[derive(Debug, Default)]
struct DirectoryInner {
    next_id: AccountId,
    accounts: Vec<AccountRecord>,
}

/// Flat-file implementation of the `UserDirectory` trait.
///
/// Accounts live in a single `accounts.json` snapshot that is rewritten on
/// every insert; reads are served from memory.
#[derive(Clone)]
pub struct FlatFileDirectory {
    path: PathBuf,
    inner: Arc<RwLock<DirectoryInner>>,
}

impl FlatFileDirectory {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        let path = root.join("accounts.json");

        let accounts: Vec<AccountRecord> = if path.exists() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };
        let next_id = accounts.iter().map(|a| a.id).max().unwrap_or(0) + 1;

        Ok(Self {
            path,
            inner: Arc::new(RwLock::new(DirectoryInner { next_id, accounts })),
        })
    }

    /// Administrative role change. Not part of [`UserDirectory`]: the core
    /// never mutates roles, this exists for operator tooling and tests.
    pub async fn set_role(&self, id: AccountId, role: Role) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("account {id}")))?;
        account.role = role;
        persist_accounts(&self.path, &inner.accounts).await
    }
}

async fn persist_accounts(path: &Path, accounts: &[AccountRecord]) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(accounts)?;
    tokio_fs::write(path, json).await?;
    Ok(())
}

#[async_trait]
impl UserDirectory for FlatFileDirectory {
    async fn insert_account(
        &self,
        email: &str,
        password_hash: &str,
        display_name: &str,
    ) -> Result<AccountId, AppError> {
        let mut inner = self.inner.write().await;

        // uniqueness is re-checked under the write lock; the facade's
        // pre-check is best-effort only
        let taken = inner.accounts.iter().any(|a| {
            a.email.eq_ignore_ascii_case(email) || a.display_name == display_name
        });
        if taken {
            return Err(AppError::Conflict);
        }

        let id = inner.next_id;
        inner.next_id += 1;
        inner.accounts.push(AccountRecord {
            id,
            email: email.to_string(),
            display_name: display_name.to_string(),
            password_hash: password_hash.to_string(),
            role: Role::User,
            created_at: Utc::now(),
        });
        persist_accounts(&self.path, &inner.accounts).await?;

        Ok(id)
    }

    async fn find_by_identifier(
        &self,
        identifier: &str,
    ) -> Result<Option<AccountRecord>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .iter()
            .find(|a| a.email.eq_ignore_ascii_case(identifier) || a.display_name == identifier)
            .cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<AccountRecord>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .accounts
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(email)))
    }

    async fn list_accounts(&self) -> Result<Vec<AccountRecord>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.clone())
    }
}

/// Flat-file implementation of the `AttemptStore` trait.
///
/// One JSON line per attempt in `login-attempts.log`. Appends are additive
/// inserts, never read-modify-write, so no attempt is ever lost to a
/// concurrent writer; `clear`/`purge_before` rewrite the log under the same
/// lock that serializes appends.
#[derive(Clone)]
pub struct FlatFileAttemptLog {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl FlatFileAttemptLog {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self {
            path: root.join("login-attempts.log"),
            lock: Arc::new(Mutex::new(())),
        })
    }

    /// Read and parse the whole log. A line that fails to parse is a
    /// storage error: undercounting attempts would weaken the lockout.
    async fn read_all(&self) -> Result<Vec<FailedAttempt>, AppError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = tokio_fs::read_to_string(&self.path).await?;
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .map_err(|e| AppError::Storage(format!("corrupt attempt log: {e}")))
            })
            .collect()
    }

    async fn rewrite(&self, attempts: &[FailedAttempt]) -> Result<(), AppError> {
        let mut content = String::new();
        for attempt in attempts {
            content.push_str(&serde_json::to_string(attempt)?);
            content.push('\n');
        }
        tokio_fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl AttemptStore for FlatFileAttemptLog {
    async fn append(&self, attempt: &FailedAttempt) -> Result<(), AppError> {
        let _guard = self.lock.lock().await;

        let mut line = serde_json::to_string(attempt)?;
        line.push('\n');

        let mut file = tokio_fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn count_since(
        &self,
        identifier: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<u32, AppError> {
        let _guard = self.lock.lock().await;
        let attempts = self.read_all().await?;
        let count = attempts
            .iter()
            .filter(|a| a.identifier == identifier && a.attempted_at >= cutoff)
            .count();
        Ok(count as u32)
    }

    async fn clear(&self, identifier: &str) -> Result<u64, AppError> {
        let _guard = self.lock.lock().await;
        let attempts = self.read_all().await?;
        let kept: Vec<FailedAttempt> = attempts
            .iter()
            .filter(|a| a.identifier != identifier)
            .cloned()
            .collect();
        let removed = (attempts.len() - kept.len()) as u64;
        if removed > 0 {
            self.rewrite(&kept).await?;
        }
        Ok(removed)
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let _guard = self.lock.lock().await;
        let attempts = self.read_all().await?;
        let kept: Vec<FailedAttempt> = attempts
            .iter()
            .filter(|a| a.attempted_at >= cutoff)
            .cloned()
            .collect();
        let removed = (attempts.len() - kept.len()) as u64;
        if removed > 0 {
            self.rewrite(&kept).await?;
        }
        Ok(removed)
    }
}
