//! One-shot notices shown on the next rendered page.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session::keys;

/// Visual weight of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
    Info,
    Warning,
}

impl FlashLevel {
    /// CSS modifier for the notice box.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub title: String,
    pub message: String,
}

impl Flash {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Success, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Error, title, message)
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Info, title, message)
    }

    pub fn warning(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(FlashLevel::Warning, title, message)
    }

    fn new(level: FlashLevel, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn class(&self) -> &'static str {
        self.level.as_str()
    }

    /// Store the flash for the next page. Failures are logged, not raised:
    /// losing a notice must never fail the action that produced it.
    pub async fn push(self, session: &Session) {
        if let Err(e) = session.insert(keys::FLASH, self).await {
            tracing::warn!(error = %e, "failed to store flash message");
        }
    }

    /// Remove and return the pending flash, if any.
    pub async fn take(session: &Session) -> Option<Self> {
        session.remove::<Self>(keys::FLASH).await.ok().flatten()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    #[tokio::test]
    async fn test_flash_is_shown_once() {
        let session = Session::new(None, Arc::new(MemoryStore::default()), None);
        Flash::success("Berhasil", "Produk ditambahkan.").push(&session).await;

        let flash = Flash::take(&session).await.unwrap();
        assert_eq!(flash.class(), "success");
        assert_eq!(flash.message, "Produk ditambahkan.");
        assert!(Flash::take(&session).await.is_none());
    }
}
