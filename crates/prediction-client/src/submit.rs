//! Transaction submitter.

use arch_tx::{Message, Signature, SignedTransaction};
use tracing::info;

use crate::error::ClientError;
use crate::rpc::{LedgerRpc, SubmissionResult};

/// Wrap `message` and its signatures in a version-0 envelope and send it.
///
/// Signatures pair positionally with `message.signers`; a short set fails
/// before anything is sent. Failures are returned as-is, never retried.
pub async fn submit<R>(
    rpc: &R,
    message: Message,
    signatures: Vec<Signature>,
) -> Result<SubmissionResult, ClientError>
where
    R: LedgerRpc + ?Sized,
{
    let tx = SignedTransaction::new(message, signatures)?;
    let result = rpc
        .send_transaction(&tx)
        .await
        .map_err(ClientError::Submission)?;
    info!(txid = %result.txid, signers = tx.message.signers.len(), "transaction submitted");
    Ok(result)
}
