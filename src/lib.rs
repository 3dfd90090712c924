//! Runnable block language server.
//!
//! Finds runnable blocks in open documents (fenced blocks in markdown, the
//! whole file and its sections elsewhere), publishes a run code lens on each,
//! and runs a block in a shell when the client executes the lens command.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock, RwLock};

use serde_json::Value;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};

pub mod blocks;
mod document;
pub mod executor;
mod lsp;
pub mod runners;
pub mod settings;

pub use blocks::{block_at_line, detect_blocks, Block, BlockKind, DocumentKind, HostDocument};
pub use document::{DocumentState, DocumentStore, TextLines};
pub use executor::{ExecError, Executor, OutputLine, RunOptions};
pub use lsp::{code_lenses, parse_command, RunRequest, RUN_BLOCK, RUN_BLOCK_AT_LINE};
pub use runners::{RunnerDef, RunnerRegistry};
pub use settings::{discover_settings, load_settings, Settings, SettingsPatch};

use executor::{OutputSender, Stream};

pub struct Backend {
    client: Client,
    documents: DocumentStore,
    workspace_root: OnceLock<PathBuf>,
    /// Settings from the discovered settings file; client patches apply on top.
    file_settings: OnceLock<Settings>,
    settings: RwLock<Arc<Settings>>,
    executor: Executor,
    output: OnceLock<OutputSender>,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            workspace_root: OnceLock::new(),
            file_settings: OnceLock::new(),
            settings: RwLock::new(Arc::new(Settings::default())),
            executor: Executor::default(),
            output: OnceLock::new(),
        }
    }

    /// Current effective settings.
    fn settings(&self) -> Arc<Settings> {
        let guard = self.settings.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&guard)
    }

    fn replace_settings(&self, settings: Settings) {
        let mut guard = self.settings.write().unwrap_or_else(|e| e.into_inner());
        *guard = Arc::new(settings);
    }

    /// Parse client configuration, logging and ignoring it when malformed.
    fn client_patch(value: &Value) -> SettingsPatch {
        SettingsPatch::from_client_value(value).unwrap_or_else(|e| {
            tracing::warn!("ignoring client configuration: {e}");
            SettingsPatch::default()
        })
    }

    /// Sender for shell output, forwarding to the client's log.
    fn output_sender(&self) -> OutputSender {
        self.output
            .get_or_init(|| {
                let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<OutputLine>();
                let client = self.client.clone();
                tokio::spawn(async move {
                    while let Some(line) = rx.recv().await {
                        let kind = match line.stream {
                            Stream::Stdout => MessageType::INFO,
                            Stream::Stderr => MessageType::WARNING,
                        };
                        client.log_message(kind, line.text).await;
                    }
                });
                tx
            })
            .clone()
    }

    /// Resolve a run request to the block it designates.
    fn block_for(&self, request: RunRequest, settings: &Settings) -> Option<Block> {
        match request {
            RunRequest::Block { block, .. } => Some(block),
            RunRequest::AtLine { uri, line } => {
                let doc = self.documents.get(&uri)?;
                let blocks = doc.blocks(&settings.registry());
                block_at_line(&blocks, line).cloned()
            }
        }
    }

    async fn run_block(
        &self,
        block: &Block,
        settings: &Settings,
    ) -> std::result::Result<Value, ExecError> {
        let registry = settings.registry();
        let runner = registry
            .get(&block.language_id)
            .ok_or_else(|| ExecError::UnknownRunner(block.language_id.clone()))?;
        let options = RunOptions {
            shell: settings.shell.clone(),
            reuse: settings.reuse_executor,
            cwd: self.workspace_root.get().cloned(),
        };

        let run = self
            .executor
            .run(block, runner, &options, self.output_sender())
            .await?;
        Ok(serde_json::json!({
            "command": run.command,
            "file": run.path,
            "reused": run.reused,
        }))
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        let file_settings = match workspace_root {
            Some(root) => {
                let (settings, _) = settings::discover_settings(&root);
                let _ = self.workspace_root.set(root);
                settings
            }
            None => Settings::default(),
        };

        let effective = match params.initialization_options.as_ref() {
            Some(options) => file_settings.clone().with_patch(Self::client_patch(options)),
            None => file_settings.clone(),
        };
        let _ = self.file_settings.set(file_settings);
        self.replace_settings(effective);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                code_lens_provider: Some(CodeLensOptions {
                    resolve_provider: Some(false),
                }),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: lsp::COMMANDS.iter().map(|c| c.to_string()).collect(),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "runlens initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        self.executor.reset().await;
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let doc = params.text_document;
        self.documents
            .open(doc.uri, &doc.text, doc.language_id, doc.version);
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // We use FULL sync, so there's exactly one change with the full text
        if let Some(change) = params.content_changes.into_iter().next() {
            let uri = &params.text_document.uri;
            if self
                .documents
                .update(uri, &change.text, params.text_document.version)
                .is_none()
            {
                tracing::warn!(%uri, "change for a document that was never opened");
            }
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.close(&params.text_document.uri);
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        let base = self.file_settings.get().cloned().unwrap_or_default();
        self.replace_settings(base.with_patch(Self::client_patch(&params.settings)));

        if let Err(e) = self.client.code_lens_refresh().await {
            tracing::debug!("client did not refresh code lenses: {e}");
        }
    }

    async fn code_lens(&self, params: CodeLensParams) -> Result<Option<Vec<CodeLens>>> {
        let settings = self.settings();
        if !settings.show_code_lens {
            return Ok(None);
        }

        let uri = &params.text_document.uri;
        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };

        let blocks = doc.blocks(&settings.registry());
        Ok(Some(lsp::code_lenses(uri, &blocks)))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        let request = lsp::parse_command(&params.command, &params.arguments)?;
        let settings = self.settings();

        let uri = request.uri().clone();
        if let RunRequest::AtLine { line, .. } = request {
            if self.documents.get(&uri).is_none() {
                return Err(Error::invalid_params(format!("document not open: {uri}")));
            }
            tracing::debug!(%uri, line, "running block at line");
        }

        let Some(block) = self.block_for(request, &settings) else {
            self.client
                .show_message(MessageType::INFO, "No runnable block at the cursor")
                .await;
            return Ok(None);
        };

        match self.run_block(&block, &settings).await {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                tracing::warn!(%uri, "failed to run block: {e}");
                self.client
                    .show_message(MessageType::ERROR, format!("runlens: {e}"))
                    .await;
                Ok(None)
            }
        }
    }
}

pub fn create_service() -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::new(Backend::new)
}
