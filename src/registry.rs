//! Реестр пользователей для рассылки: JSON-массив id в одном файле.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Ошибка ввода-вывода реестра {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Реестр {} повреждён: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Результат регистрации.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterOutcome {
    /// Пользователь добавлен впервые
    pub added: bool,
    /// Сколько админов дописано в реестр
    pub backfilled_admins: usize,
}

pub struct UserRegistry {
    path: PathBuf,
    admin_ids: Vec<i64>,
    write_lock: Mutex<()>,
}

impl UserRegistry {
    pub fn new(path: impl Into<PathBuf>, admin_ids: Vec<i64>) -> Self {
        Self {
            path: path.into(),
            admin_ids,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Добавляет пользователя и всех админов, затем перезаписывает файл целиком.
    pub async fn register(&self, user_id: i64) -> Result<RegisterOutcome, RegistryError> {
        let _guard = self.write_lock.lock().await;
        let mut users = self.read().await?;

        let added = push_unique(&mut users, user_id);
        let mut backfilled_admins = 0;
        for admin_id in &self.admin_ids {
            if push_unique(&mut users, *admin_id) {
                backfilled_admins += 1;
            }
        }

        self.write(&users).await?;
        tracing::debug!(
            user_id = user_id,
            added = added,
            backfilled_admins = backfilled_admins,
            total = users.len(),
            "Registry updated"
        );
        Ok(RegisterOutcome {
            added,
            backfilled_admins,
        })
    }

    /// Все id в порядке добавления.
    pub async fn list_all(&self) -> Result<Vec<i64>, RegistryError> {
        let _guard = self.write_lock.lock().await;
        self.read().await
    }

    async fn read(&self) -> Result<Vec<i64>, RegistryError> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(RegistryError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_slice(&raw).map_err(|source| RegistryError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    async fn write(&self, users: &[i64]) -> Result<(), RegistryError> {
        let io_error = |source: std::io::Error| RegistryError::Io {
            path: self.path.clone(),
            source,
        };
        let payload = serde_json::to_vec(users).map_err(|source| RegistryError::Malformed {
            path: self.path.clone(),
            source,
        })?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(io_error)?;
        }

        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, payload).await.map_err(io_error)?;
        tokio::fs::rename(&tmp_path, &self.path)
            .await
            .map_err(io_error)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn push_unique(users: &mut Vec<i64>, user_id: i64) -> bool {
    if users.contains(&user_id) {
        false
    } else {
        users.push(user_id);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup(admins: Vec<i64>) -> (TempDir, UserRegistry) {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let registry = UserRegistry::new(dir.path().join("users.json"), admins);
        (dir, registry)
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let (_dir, registry) = setup(vec![]);
        assert!(registry.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_register_twice_keeps_single_entry() {
        let (_dir, registry) = setup(vec![]);
        let first = registry.register(42).await.unwrap();
        let second = registry.register(42).await.unwrap();

        assert!(first.added);
        assert!(!second.added);
        assert_eq!(registry.list_all().await.unwrap(), vec![42]);
    }

    #[tokio::test]
    async fn test_admins_backfilled_on_register() {
        let (_dir, registry) = setup(vec![999, 1000]);
        let outcome = registry.register(1).await.unwrap();

        assert_eq!(outcome.backfilled_admins, 2);
        assert_eq!(registry.list_all().await.unwrap(), vec![1, 999, 1000]);

        let again = registry.register(2).await.unwrap();
        assert_eq!(again.backfilled_admins, 0);
        assert_eq!(registry.list_all().await.unwrap(), vec![1, 999, 1000, 2]);
    }

    #[tokio::test]
    async fn test_admin_registering_is_not_duplicated() {
        let (_dir, registry) = setup(vec![999]);
        registry.register(999).await.unwrap();
        assert_eq!(registry.list_all().await.unwrap(), vec![999]);
    }

    #[tokio::test]
    async fn test_existing_file_order_preserved() {
        let (_dir, registry) = setup(vec![999]);
        std::fs::write(registry.path(), "[111, 222]").unwrap();

        registry.register(111).await.unwrap();
        assert_eq!(registry.list_all().await.unwrap(), vec![111, 222, 999]);
    }

    #[tokio::test]
    async fn test_malformed_file_is_error() {
        let (_dir, registry) = setup(vec![]);
        std::fs::write(registry.path(), "{\"not\": \"a list\"}").unwrap();

        assert!(matches!(
            registry.list_all().await,
            Err(RegistryError::Malformed { .. })
        ));
        assert!(matches!(
            registry.register(1).await,
            Err(RegistryError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_no_tmp_file_left_behind() {
        let (dir, registry) = setup(vec![]);
        registry.register(5).await.unwrap();
        assert!(!dir.path().join("users.json.tmp").exists());
        let raw = std::fs::read_to_string(registry.path()).unwrap();
        assert_eq!(raw, "[5]");
    }

    #[tokio::test]
    async fn test_concurrent_registrations_lose_nothing() {
        let (_dir, registry) = setup(vec![0]);
        let registry = Arc::new(registry);

        let mut handles = Vec::new();
        for user_id in 1..=20 {
            let registry = Arc::clone(&registry);
            handles.push(tokio::spawn(async move { registry.register(user_id).await }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let mut users = registry.list_all().await.unwrap();
        users.sort_unstable();
        assert_eq!(users, (0..=20).collect::<Vec<i64>>());
    }
}
