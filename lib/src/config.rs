use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Crash report JSON files to symbolicate, in output order.
    #[serde(default)]
    pub reports: Vec<PathBuf>,
    #[serde(default)]
    pub symbols: Symbols,
    #[serde(default)]
    pub worker_threads: WorkerThreads,
}

#[derive(Debug, Default, Deserialize)]
pub struct Symbols {
    /// Symbol archives to build the cache directory from. Later archives
    /// win on duplicate debug ids.
    #[serde(default)]
    pub archives: Vec<PathBuf>,
}

#[derive(Copy, Clone, Debug, Default, Deserialize)]
pub enum WorkerThreads {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(untagged)]
    Exact(usize),
}
