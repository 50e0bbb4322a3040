//! Content record input from flags or a batch file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;

use proofchain::{ContentRecord, Fingerprint};

/// Record source for `submit` and `seal`.
#[derive(Debug, Args)]
pub struct RecordArgs {
    /// JSON file holding an array of {content_id, title, author, body}
    #[arg(long, conflicts_with_all = ["id", "title", "author", "body", "body_file"])]
    pub batch: Option<PathBuf>,

    /// Content identifier
    #[arg(long, requires = "title")]
    pub id: Option<String>,

    /// Content title
    #[arg(long)]
    pub title: Option<String>,

    /// Author label
    #[arg(long, default_value = "anonymous")]
    pub author: String,

    /// Content body text
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// File whose bytes are the content body
    #[arg(long)]
    pub body_file: Option<PathBuf>,
}

/// One entry of a batch file.
#[derive(Debug, Deserialize)]
struct BatchEntry {
    content_id: String,
    title: String,
    #[serde(default = "default_author")]
    author: String,
    body: String,
}

fn default_author() -> String {
    "anonymous".to_string()
}

impl RecordArgs {
    /// Build the records these arguments describe, in submission order.
    pub fn records(&self) -> Result<Vec<ContentRecord>> {
        if let Some(path) = &self.batch {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading batch file {}", path.display()))?;
            let entries: Vec<BatchEntry> = serde_json::from_str(&text)
                .with_context(|| format!("parsing batch file {}", path.display()))?;
            return Ok(entries
                .into_iter()
                .map(|e| ContentRecord::new(e.content_id, e.title, e.author, e.body.as_bytes()))
                .collect());
        }

        let (Some(id), Some(title)) = (&self.id, &self.title) else {
            bail!("either --batch or --id and --title are required");
        };
        let body = read_body(self.body.as_deref(), self.body_file.as_ref())?;
        Ok(vec![ContentRecord::new(
            id.as_str(),
            title.as_str(),
            self.author.as_str(),
            &body,
        )])
    }
}

/// How `locate` identifies content.
#[derive(Debug, Args)]
pub struct FingerprintArgs {
    /// Fingerprint as 64 hex characters
    #[arg(long, conflicts_with_all = ["body", "body_file"])]
    pub fingerprint: Option<String>,

    /// Content body text to fingerprint
    #[arg(long, conflicts_with = "body_file")]
    pub body: Option<String>,

    /// File whose bytes are the content body
    #[arg(long)]
    pub body_file: Option<PathBuf>,
}

impl FingerprintArgs {
    pub fn fingerprint(&self) -> Result<Fingerprint> {
        if let Some(hex) = &self.fingerprint {
            return Fingerprint::from_hex(hex)
                .with_context(|| format!("invalid fingerprint {:?}", hex));
        }
        let body = read_body(self.body.as_deref(), self.body_file.as_ref())?;
        Ok(Fingerprint::of(&body))
    }
}

fn read_body(text: Option<&str>, file: Option<&PathBuf>) -> Result<Vec<u8>> {
    match (text, file) {
        (Some(text), _) => Ok(text.as_bytes().to_vec()),
        (None, Some(path)) => {
            std::fs::read(path).with_context(|| format!("reading body file {}", path.display()))
        }
        (None, None) => bail!("one of --body or --body-file is required"),
    }
}
