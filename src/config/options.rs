// src/config/options.rs
use std::path::PathBuf;

use super::consts::*;

/// Everything a run needs, resolved once at startup and passed down explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppOptions {
    /// Local working directory: lock file and debug log live here.
    pub work_dir: PathBuf,
    pub store: StoreOptions,
    pub notify: NotifyOptions,
    pub export: ExportOptions,
    pub retention: RetentionPolicy,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from(STORE_DIR),
            store: StoreOptions::default(),
            notify: NotifyOptions::default(),
            export: ExportOptions::default(),
            retention: RetentionPolicy::default(),
        }
    }
}

impl AppOptions {
    pub fn log_path(&self) -> PathBuf {
        self.work_dir.join(DEBUG_LOG_FILE)
    }
}

/* ---------------- Persistence ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreOptions {
    Local { dir: PathBuf },
    Github(GithubOptions),
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions::Local { dir: PathBuf::from(STORE_DIR) }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct GithubOptions {
    /// "owner/name"
    pub repo: String,
    pub branch: String,
    pub token: String,
    /// Directory inside the repository holding the JSON files.
    pub dir: String,
    pub api_base: String,
}

impl GithubOptions {
    pub fn new(repo: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: s!(GITHUB_BRANCH),
            token: token.into(),
            dir: s!(GITHUB_DATA_DIR),
            api_base: s!(GITHUB_API),
        }
    }
}

// Keep the token out of debug output and logs.
impl std::fmt::Debug for GithubOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubOptions")
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("dir", &self.dir)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

/* ---------------- Notification ---------------- */

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotifyOptions {
    pub telegram: Option<TelegramOptions>,
    pub dashboard_url: Option<String>,
}

#[derive(Clone, PartialEq, Eq)]
pub struct TelegramOptions {
    pub token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl TelegramOptions {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self { token: token.into(), chat_id: chat_id.into(), api_base: s!(TELEGRAM_API) }
    }
}

impl std::fmt::Debug for TelegramOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramOptions")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

/// Pages URL for a repository: `https://<actor>.github.io/<repo-name>`.
/// Needs both the actor and an "owner/name" repository.
pub fn dashboard_url(actor: Option<&str>, repository: Option<&str>) -> Option<String> {
    let actor = actor.map(str::trim).filter(|a| !a.is_empty())?;
    let name = repository?.split('/').nth(1).filter(|n| !n.is_empty())?;
    Some(format!("https://{actor}.github.io/{name}"))
}

/* ---------------- Export ---------------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Tsv,
}

impl ExportFormat {
    pub fn ext(&self) -> &'static str {
        match self { ExportFormat::Csv => "csv", ExportFormat::Tsv => "tsv" }
    }
    pub fn delim(&self) -> char {
        match self { ExportFormat::Csv => ',', ExportFormat::Tsv => '\t' }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportOptions {
    pub format: ExportFormat,
    dir: PathBuf,
    stem: String, // without extension
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Csv,
            dir: PathBuf::from(DEFAULT_OUT_DIR),
            stem: s!(DEFAULT_REPORT_STEM),
        }
    }
}

impl ExportOptions {
    /// `<dir>/<stem>.<ext>`; the extension always follows the format.
    pub fn out_path(&self) -> PathBuf {
        self.dir.join(join!(&self.stem, ".", self.format.ext()))
    }

    pub fn set_dir(&mut self, dir: impl Into<PathBuf>) {
        self.dir = dir.into();
    }

    /// Sanitized; an unusable name falls back to the default stem.
    pub fn set_stem(&mut self, stem: &str) {
        self.stem = crate::core::sanitize::sanitize_file_stem(stem, DEFAULT_REPORT_STEM);
    }
}

/* ---------------- Retention ---------------- */

/// How many transitions each ledger entry keeps. Applied after the merge,
/// never inside it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RetentionPolicy {
    #[default]
    Unbounded,
    KeepLast(usize),
}
