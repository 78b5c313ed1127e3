// src/notify.rs
//! Chat notification: message text and delivery.
//!
//! Delivery never decides the fate of a run. Each send is attempted on its
//! own and failures are only logged by the caller.

use std::fmt::Write as _;
use std::path::Path;

use serde_json::json;

use crate::config::consts::{MAX_CHANGES_LISTED, MAX_DISAPPEARED_LISTED, MAX_OFF_LISTED};
use crate::config::options::{NotifyOptions, TelegramOptions};
use crate::core::Stamp;
use crate::error::NotifyError;
use crate::ledger::Change;
use crate::summary::{ItemLine, Summary};

pub trait Notifier {
    fn send_message(&self, text: &str) -> Result<(), NotifyError>;

    fn send_document(&self, path: &Path, caption: &str) -> Result<(), NotifyError>;
}

/// Used when no chat is configured: the message only goes to the log.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        logf!("notification (not delivered, no chat configured):\n{text}");
        Ok(())
    }

    fn send_document(&self, path: &Path, _caption: &str) -> Result<(), NotifyError> {
        logd!("document {} not delivered, no chat configured", path.display());
        Ok(())
    }
}

pub struct TelegramNotifier {
    opts: TelegramOptions,
}

impl TelegramNotifier {
    pub fn new(opts: TelegramOptions) -> Self {
        Self { opts }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.opts.api_base.trim_end_matches('/'), self.opts.token)
    }
}

impl Notifier for TelegramNotifier {
    fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        let agent = ureq::Agent::new_with_defaults();
        agent
            .post(&self.method_url("sendMessage"))
            .send_json(json!({ "chat_id": self.opts.chat_id, "text": text }))
            .map_err(|e| NotifyError::Http(redact(&e.to_string(), &self.opts.token)))?;
        Ok(())
    }

    fn send_document(&self, path: &Path, caption: &str) -> Result<(), NotifyError> {
        let bytes = std::fs::read(path).map_err(|source| NotifyError::Attachment {
            path: path.display().to_string(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| s!("relatorio.csv"));

        let (content_type, body) = multipart(
            &[("chat_id", self.opts.chat_id.as_str()), ("caption", caption)],
            ("document", filename.as_str(), bytes.as_slice()),
        );

        let agent = ureq::Agent::new_with_defaults();
        agent
            .post(&self.method_url("sendDocument"))
            .header("Content-Type", &content_type)
            .send(&body[..])
            .map_err(|e| NotifyError::Http(redact(&e.to_string(), &self.opts.token)))?;
        Ok(())
    }
}

pub fn from_options(opts: &NotifyOptions) -> Box<dyn Notifier> {
    match &opts.telegram {
        Some(tg) => Box::new(TelegramNotifier::new(tg.clone())),
        None => Box::new(NullNotifier),
    }
}

const BOUNDARY: &str = "menu-watch-boundary-7f3a9c";

/// multipart/form-data with text fields and one file part.
fn multipart(fields: &[(&str, &str)], file: (&str, &str, &[u8])) -> (String, Vec<u8>) {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                .as_bytes(),
        );
    }
    let (name, filename, bytes) = file;
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// Bot tokens are part of the URL; keep them out of error text.
fn redact(msg: &str, token: &str) -> String {
    if token.is_empty() { msg.to_string() } else { msg.replace(token, "***") }
}

/* ---------------- Message text ---------------- */

fn push_items(text: &mut String, items: &[ItemLine], cap: usize) {
    for p in items.iter().take(cap) {
        let _ = writeln!(text, "- {} - {} - Preço: {}", p.section, p.name, p.price);
    }
    if items.len() > cap {
        let _ = writeln!(text, "... e mais {} produtos", items.len() - cap);
    }
}

fn change_line(c: &Change) -> String {
    match c.from {
        Some(from) => format!("- {} - {}: {} → {}", c.key.section, c.key.name, from, c.to),
        None => format!("- {} - {}: novo ({})", c.key.section, c.key.name, c.to),
    }
}

/// The run's alert text.
pub fn format_alert(summary: &Summary, now: &Stamp, dashboard: Option<&str>) -> String {
    let mut text = s!("🚨 ALERTA: Monitoramento de Produtos 🚨\n\n");
    let _ = writeln!(text, "Data/Hora: {}\n", now.display_br());
    let _ = writeln!(text, "✅ Produtos ativos no site: {}\n", summary.active());

    if !summary.disappeared_items.is_empty() {
        let _ = writeln!(text, "⚠️ {} produtos DESAPARECERAM (OFF):", summary.disappeared_items.len());
        push_items(&mut text, &summary.disappeared_items, MAX_DISAPPEARED_LISTED);
        text.push('\n');
    }

    if !summary.off_items.is_empty() {
        let _ = writeln!(text, "⚠️ {} produtos marcados como OFF no site:", summary.off_items.len());
        push_items(&mut text, &summary.off_items, MAX_OFF_LISTED);
        text.push('\n');
    }

    if !summary.sections.is_empty() {
        text.push_str("📊 Status por Seção:\n");
        for (section, c) in &summary.sections {
            let _ = write!(text, "- {section}: 🟢 {} ON | 🔴 {} OFF", c.on, c.off);
            if c.disappeared > 0 {
                let _ = write!(text, " (inclui {} desaparecidos)", c.disappeared);
            }
            text.push('\n');
        }
        text.push('\n');
    }

    if summary.changes.is_empty() {
        text.push_str("🔁 Nenhuma mudança de status nesta verificação\n\n");
    } else {
        let _ = writeln!(text, "🔁 {} mudanças nesta verificação:", summary.changes.len());
        for c in summary.changes.iter().take(MAX_CHANGES_LISTED) {
            text.push_str(&change_line(c));
            text.push('\n');
        }
        if summary.changes.len() > MAX_CHANGES_LISTED {
            let _ = writeln!(text, "... e mais {} mudanças", summary.changes.len() - MAX_CHANGES_LISTED);
        }
        text.push('\n');
    }

    match dashboard {
        Some(url) => { let _ = write!(text, "🔗 Dashboard: {url}"); }
        None => text.push_str("🔗 Dashboard em HTML"),
    }
    text
}

/// Sent instead of the alert when the run could not collect data.
pub fn format_failure(reason: &str, now: &Stamp) -> String {
    format!(
        "❌ FALHA: Monitoramento de Produtos\n\nData/Hora: {}\n\nA verificação não foi concluída: {reason}\nO histórico anterior foi mantido sem alterações.",
        now.display_br()
    )
}
