// src/store/github.rs
//! Documents kept as files in a GitHub repository, via the contents API.
//!
//! GET  /repos/{repo}/contents/{dir}/{key}?ref={branch}   (404 ⇒ absent)
//! PUT  /repos/{repo}/contents/{dir}/{key}                 (sha of the current blob for updates)

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::json;

use super::Store;
use crate::config::consts::USER_AGENT;
use crate::config::options::GithubOptions;
use crate::error::StoreError;

pub struct GithubStore {
    opts: GithubOptions,
}

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
}

impl GithubStore {
    pub fn new(opts: GithubOptions) -> Self {
        Self { opts }
    }

    fn repo_path(&self, key: &str) -> String {
        let dir = self.opts.dir.trim_matches('/');
        if dir.is_empty() { key.to_string() } else { format!("{dir}/{key}") }
    }

    fn url(&self, key: &str) -> String {
        format!(
            "{}/repos/{}/contents/{}",
            self.opts.api_base.trim_end_matches('/'),
            self.opts.repo,
            self.repo_path(key)
        )
    }

    fn authed<B>(&self, req: ureq::RequestBuilder<B>, accept: &str) -> ureq::RequestBuilder<B> {
        req.header("Authorization", &format!("Bearer {}", self.opts.token))
            .header("Accept", accept)
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    fn http_err(key: &str, e: impl std::fmt::Display) -> StoreError {
        StoreError::Http { key: key.to_string(), message: e.to_string() }
    }

    /// Blob sha of the stored file, if there is one.
    fn current_sha(&self, key: &str) -> Result<Option<String>, StoreError> {
        let agent = ureq::Agent::new_with_defaults();
        let url = format!("{}?ref={}", self.url(key), self.opts.branch);
        match self.authed(agent.get(&url), "application/vnd.github+json").call() {
            Ok(resp) => {
                let body: ContentsResponse = resp
                    .into_body()
                    .read_json()
                    .map_err(|e| Self::http_err(key, e))?;
                Ok(Some(body.sha))
            }
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(e) => Err(Self::http_err(key, e)),
        }
    }
}

impl Store for GithubStore {
    fn describe(&self) -> String {
        format!("github:{}@{}/{}", self.opts.repo, self.opts.branch, self.opts.dir)
    }

    fn load_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let agent = ureq::Agent::new_with_defaults();
        let url = format!("{}?ref={}", self.url(key), self.opts.branch);
        // raw media type: file body directly, no 1 MB base64 cap
        match self.authed(agent.get(&url), "application/vnd.github.raw+json").call() {
            Ok(resp) => resp
                .into_body()
                .read_to_string()
                .map(Some)
                .map_err(|e| Self::http_err(key, e)),
            Err(ureq::Error::StatusCode(404)) => Ok(None),
            Err(e) => Err(Self::http_err(key, e)),
        }
    }

    fn save_raw(&self, key: &str, text: &str) -> Result<(), StoreError> {
        let sha = self.current_sha(key)?;

        let mut body = json!({
            "message": format!("Atualiza {key}"),
            "content": STANDARD.encode(text.as_bytes()),
            "branch": self.opts.branch,
        });
        if let Some(sha) = sha {
            body["sha"] = json!(sha);
        }

        let agent = ureq::Agent::new_with_defaults();
        self.authed(agent.put(&self.url(key)), "application/vnd.github+json")
            .send_json(&body)
            .map_err(|e| Self::http_err(key, e))?;
        Ok(())
    }
}
