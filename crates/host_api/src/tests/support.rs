//! Recording fakes for the host collaborators.

use std::{
    collections::{HashMap, VecDeque},
    io,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use shared::{
    domain::{ContextId, DocumentFilter},
    error::ControlError,
    protocol::OutboundFrame,
};

use crate::{
    collaborators::{FilePicker, FileSystem, ModalPrompt, RemoteEndpoint, Window},
    router::{CommandRouter, HostContext},
};

pub const UI: ContextId = ContextId(1);

#[derive(Default)]
pub struct MemoryFiles {
    pub files: Mutex<HashMap<PathBuf, String>>,
    pub writes: Mutex<Vec<(PathBuf, String)>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
}

impl MemoryFiles {
    pub fn insert(&self, path: &str, data: &str) {
        self.files
            .lock()
            .expect("files")
            .insert(PathBuf::from(path), data.to_string());
    }

    pub fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().expect("writes").clone()
    }
}

#[async_trait]
impl FileSystem for MemoryFiles {
    async fn read(&self, path: &Path) -> io::Result<String> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        self.files
            .lock()
            .expect("files")
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }

    async fn write(&self, path: &Path, data: &str) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"));
        }
        self.files
            .lock()
            .expect("files")
            .insert(path.to_path_buf(), data.to_string());
        self.writes
            .lock()
            .expect("writes")
            .push((path.to_path_buf(), data.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct ScriptedPicker {
    pub opens: Mutex<VecDeque<Option<PathBuf>>>,
    pub saves: Mutex<VecDeque<Option<PathBuf>>>,
    pub open_calls: AtomicUsize,
    pub save_calls: AtomicUsize,
    pub filters: Mutex<Vec<DocumentFilter>>,
}

impl ScriptedPicker {
    pub fn answer_open(&self, path: Option<&str>) {
        self.opens
            .lock()
            .expect("opens")
            .push_back(path.map(PathBuf::from));
    }

    pub fn answer_save(&self, path: Option<&str>) {
        self.saves
            .lock()
            .expect("saves")
            .push_back(path.map(PathBuf::from));
    }
}

#[async_trait]
impl FilePicker for ScriptedPicker {
    async fn choose_open(&self, filter: &DocumentFilter) -> Option<PathBuf> {
        self.open_calls.fetch_add(1, Ordering::SeqCst);
        self.filters.lock().expect("filters").push(filter.clone());
        self.opens.lock().expect("opens").pop_front().flatten()
    }

    async fn choose_save(&self, filter: &DocumentFilter) -> Option<PathBuf> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        self.filters.lock().expect("filters").push(filter.clone());
        self.saves.lock().expect("saves").pop_front().flatten()
    }
}

#[derive(Default)]
pub struct ScriptedPrompt {
    pub answers: Mutex<VecDeque<usize>>,
    pub confirms: Mutex<Vec<(String, Vec<String>)>>,
    pub errors: Mutex<Vec<String>>,
    pub notices: Mutex<Vec<String>>,
    /// When set, `confirm` never returns.
    pub hang: AtomicBool,
}

impl ScriptedPrompt {
    pub fn answer(&self, choice: usize) {
        self.answers.lock().expect("answers").push_back(choice);
    }

    pub fn confirm_count(&self) -> usize {
        self.confirms.lock().expect("confirms").len()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().expect("errors").clone()
    }
}

#[async_trait]
impl ModalPrompt for ScriptedPrompt {
    async fn confirm(&self, message: &str, options: &[&str]) -> usize {
        self.confirms.lock().expect("confirms").push((
            message.to_string(),
            options.iter().map(|o| o.to_string()).collect(),
        ));
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        self.answers.lock().expect("answers").pop_front().unwrap_or(1)
    }

    async fn show_error(&self, message: &str) {
        self.errors.lock().expect("errors").push(message.to_string());
    }

    fn notify_error(&self, message: &str) {
        self.notices.lock().expect("notices").push(message.to_string());
    }
}

#[derive(Default)]
pub struct RecordingWindow {
    pub titles: Mutex<Vec<String>>,
    pub destroyed: AtomicBool,
}

impl RecordingWindow {
    pub fn title(&self) -> String {
        self.titles
            .lock()
            .expect("titles")
            .last()
            .cloned()
            .unwrap_or_default()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl Window for RecordingWindow {
    fn set_title(&self, title: &str) {
        self.titles.lock().expect("titles").push(title.to_string());
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct RecordingRemote {
    pub frames: Mutex<Vec<OutboundFrame>>,
    pub opened: Mutex<Vec<u16>>,
    pub fail_open: AtomicBool,
}

impl RecordingRemote {
    pub fn frames(&self) -> Vec<OutboundFrame> {
        self.frames.lock().expect("frames").clone()
    }
}

#[async_trait]
impl RemoteEndpoint for RecordingRemote {
    async fn open(&self, port: u16) -> Result<u16, ControlError> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(ControlError::Bind {
                port,
                source: io::Error::new(io::ErrorKind::AddrInUse, "address in use"),
            });
        }
        self.opened.lock().expect("opened").push(port);
        Ok(port)
    }

    fn send(&self, frame: OutboundFrame) {
        self.frames.lock().expect("frames").push(frame);
    }
}

pub struct Fixture {
    pub router: CommandRouter,
    pub files: Arc<MemoryFiles>,
    pub picker: Arc<ScriptedPicker>,
    pub prompt: Arc<ScriptedPrompt>,
    pub window: Arc<RecordingWindow>,
    pub remote: Arc<RecordingRemote>,
}

pub fn fixture() -> Fixture {
    let files = Arc::new(MemoryFiles::default());
    let picker = Arc::new(ScriptedPicker::default());
    let prompt = Arc::new(ScriptedPrompt::default());
    let window = Arc::new(RecordingWindow::default());
    let remote = Arc::new(RecordingRemote::default());

    let router = CommandRouter::new(
        HostContext {
            files: files.clone(),
            picker: picker.clone(),
            prompt: prompt.clone(),
            window: window.clone(),
            remote: remote.clone(),
            filter: DocumentFilter::default(),
        },
        UI,
    );

    Fixture {
        router,
        files,
        picker,
        prompt,
        window,
        remote,
    }
}
