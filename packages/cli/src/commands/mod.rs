pub mod delete;
pub mod init;
pub mod upload;
pub mod view;
pub mod write;

pub use delete::{delete, DeleteArgs};
pub use init::{init, InitArgs};
pub use upload::{upload, UploadArgs};
pub use view::{view, ViewArgs};
pub use write::{write, WriteArgs};

use crate::config::Config;
use crate::console::ConsoleNotifier;
use diary_client::{HttpDiaryBackend, TokenGate};
use diary_common::EntryId;
use diary_editor::EditorPorts;
use diary_viewer::{DeletionCoordinator, EntryView, ViewState};
use std::path::Path;
use std::sync::Arc;

/// Collaborators shared by the networked commands.
pub struct Context {
    pub config: Config,
    pub backend: Arc<HttpDiaryBackend>,
    pub gate: Arc<TokenGate>,
    pub notifier: Arc<ConsoleNotifier>,
}

impl Context {
    pub fn new(config: Config, cwd: &Path) -> anyhow::Result<Self> {
        let backend = HttpDiaryBackend::from_host_port(&config.host, config.port)?;
        let gate = TokenGate::new(config.get_token_path(cwd));

        Ok(Self {
            config,
            backend: Arc::new(backend),
            gate: Arc::new(gate),
            notifier: Arc::new(ConsoleNotifier),
        })
    }

    pub fn editor_ports(&self) -> EditorPorts {
        EditorPorts {
            entries: self.backend.clone(),
            media: self.backend.clone(),
            gate: self.gate.clone(),
            notifier: self.notifier.clone(),
        }
    }

    pub fn deletion(&self) -> DeletionCoordinator {
        DeletionCoordinator::new(
            self.backend.clone(),
            self.backend.clone(),
            self.gate.clone(),
            self.notifier.clone(),
        )
    }

    /// Mounts a view and waits for it to settle. Ctrl-C tears it down.
    pub async fn load_entry(&self, id: &EntryId) -> anyhow::Result<ViewState> {
        let view = EntryView::mount(
            self.backend.clone(),
            self.gate.clone(),
            id.clone(),
            self.config.loading_floor(),
        );

        tokio::select! {
            state = view.settled() => {
                state.ok_or_else(|| anyhow::anyhow!("view closed before the entry loaded"))
            }
            _ = tokio::signal::ctrl_c() => {
                view.teardown();
                anyhow::bail!("interrupted")
            }
        }
    }
}
