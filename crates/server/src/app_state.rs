use std::path::PathBuf;

pub(crate) struct AppState {
    pub(crate) message: String,
    pub(crate) frontend_dir: PathBuf,
}
