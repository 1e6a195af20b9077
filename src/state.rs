use crate::config::AppConfig;
use crate::storage::KvStore;
use crate::workspace::Workspace;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

pub struct AppData {
    pub store: KvStore,
    pub workspace: Workspace,
}

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub teacher: String,
    pub data: Arc<Mutex<AppData>>,
}

impl AppState {
    pub fn new(config: &AppConfig, store: KvStore, workspace: Workspace) -> Self {
        Self {
            data_path: config.data_path.clone(),
            teacher: config.teacher.clone(),
            data: Arc::new(Mutex::new(AppData { store, workspace })),
        }
    }
}
