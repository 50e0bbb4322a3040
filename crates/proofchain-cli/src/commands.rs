//! Subcommand handlers.
//!
//! Each handler returns a serializable report; `main` prints it.

use anyhow::{Context, Result};
use serde::Serialize;

use proofchain::store::BlockStore;
use proofchain::{
    BlockView, ChainSummary, ContentRecord, ContentStatus, Fingerprint, Ledger, LedgerError,
    SubmitOutcome,
};

/// Result of `init`.
#[derive(Debug, Serialize)]
pub struct InitReport {
    pub created: bool,
    pub genesis: Option<BlockView>,
}

/// Result of `submit` and `seal`.
#[derive(Debug, Default, Serialize)]
pub struct SubmitReport {
    pub submitted: usize,
    /// Blocks sealed while submitting, in order.
    pub sealed: Vec<BlockView>,
    /// Seal failures that left records pending.
    pub deferred: Vec<String>,
}

/// Result of `verify`.
#[derive(Debug, Serialize)]
pub struct VerifyReport {
    pub valid: bool,
    pub blocks: u64,
    pub error: Option<String>,
}

pub async fn init<S: BlockStore + 'static>(ledger: &Ledger<S>) -> Result<InitReport> {
    let created = ledger.initialize().await?;
    let genesis = ledger.get_block(0).await?.map(|b| b.view());
    Ok(InitReport { created, genesis })
}

/// Submit records with threshold batching, then seal whatever is left.
///
/// The pending buffer does not outlive the process, so records below the
/// threshold are sealed into a final smaller block.
pub async fn submit<S: BlockStore + 'static>(
    ledger: &Ledger<S>,
    records: Vec<ContentRecord>,
) -> Result<SubmitReport> {
    let mut report = SubmitReport::default();

    for record in records {
        let id = record.content_id.clone();
        let outcome = ledger
            .submit(record)
            .await
            .with_context(|| format!("submitting {}", id))?;
        report.submitted += 1;

        match outcome {
            SubmitOutcome::Buffered { .. } => {}
            SubmitOutcome::Sealed(block) => report.sealed.push(block.view()),
            SubmitOutcome::SealDeferred { error, .. } => report.deferred.push(error.to_string()),
        }
    }

    let pending = ledger.pending_len().await;
    if pending > 0 {
        tracing::info!(pending, "sealing records below the threshold before exit");
        if let Some(block) = ledger.seal_block().await.context("sealing pending records")? {
            report.sealed.push(block.view());
        }
    }

    Ok(report)
}

/// Blocks in `[from, to]`, or the whole chain.
pub async fn list<S: BlockStore + 'static>(
    ledger: &Ledger<S>,
    from: Option<u64>,
    to: Option<u64>,
) -> Result<Vec<BlockView>> {
    let blocks = match (from, to) {
        (None, None) => ledger.list_blocks().await?,
        (from, to) => {
            ledger
                .store()
                .find_range(from.unwrap_or(0), to.unwrap_or(u64::MAX))
                .await?
        }
    };
    Ok(blocks.iter().map(|b| b.view()).collect())
}

pub async fn verify<S: BlockStore + 'static>(ledger: &Ledger<S>) -> Result<VerifyReport> {
    let blocks = ledger.store().count().await?;
    match ledger.verify().await {
        Ok(()) => Ok(VerifyReport {
            valid: true,
            blocks,
            error: None,
        }),
        Err(LedgerError::Validation(e)) => Ok(VerifyReport {
            valid: false,
            blocks,
            error: Some(e.to_string()),
        }),
        Err(e) => Err(e.into()),
    }
}

pub async fn locate<S: BlockStore + 'static>(
    ledger: &Ledger<S>,
    fingerprint: &Fingerprint,
) -> Result<ContentStatus> {
    Ok(ledger.locate(fingerprint).await?)
}

pub async fn summary<S: BlockStore + 'static>(ledger: &Ledger<S>) -> Result<ChainSummary> {
    Ok(ledger.summary().await?)
}
