//! Interfaces the host consumes but does not implement itself.

use std::{
    io,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use shared::{domain::DocumentFilter, error::ControlError, protocol::OutboundFrame};

#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn read(&self, path: &Path) -> io::Result<String>;
    async fn write(&self, path: &Path, data: &str) -> io::Result<()>;
}

/// `None` means the user dismissed the dialog.
#[async_trait]
pub trait FilePicker: Send + Sync {
    async fn choose_open(&self, filter: &DocumentFilter) -> Option<PathBuf>;
    async fn choose_save(&self, filter: &DocumentFilter) -> Option<PathBuf>;
}

#[async_trait]
pub trait ModalPrompt: Send + Sync {
    /// Shows `message` with `options` and returns the chosen index.
    async fn confirm(&self, message: &str, options: &[&str]) -> usize;

    /// Blocking error notice; returns once dismissed.
    async fn show_error(&self, message: &str);

    /// Non-modal error notice.
    fn notify_error(&self, message: &str);
}

pub trait Window: Send + Sync {
    fn set_title(&self, title: &str);
    fn destroy(&self);
}

/// Host-side handle on the remote-control link.
#[async_trait]
pub trait RemoteEndpoint: Send + Sync {
    /// Binds a listening endpoint, replacing any previous one. Returns the bound port.
    async fn open(&self, port: u16) -> Result<u16, ControlError>;

    /// Queues a frame for the connected peer, if any.
    fn send(&self, frame: OutboundFrame);
}

pub struct TokioFileSystem;

#[async_trait]
impl FileSystem for TokioFileSystem {
    async fn read(&self, path: &Path) -> io::Result<String> {
        tokio::fs::read_to_string(path).await
    }

    async fn write(&self, path: &Path, data: &str) -> io::Result<()> {
        tokio::fs::write(path, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tokio_file_system_writes_and_reads_back() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("scene.json");

        TokioFileSystem
            .write(&path, "{\"length\":4}")
            .await
            .expect("write");
        let read = TokioFileSystem.read(&path).await.expect("read");
        assert_eq!(read, "{\"length\":4}");
    }

    #[tokio::test]
    async fn tokio_file_system_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = TokioFileSystem
            .read(&dir.path().join("missing.json"))
            .await
            .expect_err("missing");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
