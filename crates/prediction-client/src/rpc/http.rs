//! JSON-RPC 2.0 adapter for an Arch node.
//!
//! ```text
//! read_account_info   params: [u8; 32] identity     result: AccountInfo | null
//! send_transaction    params: SignedTransaction     result: txid string
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use arch_tx::{Identity, SignedTransaction};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;

use super::{AccountInfo, LedgerRpc, SubmissionResult};
use crate::config::ClientConfig;
use crate::error::{ConfigError, RpcError};

const READ_ACCOUNT_INFO: &str = "read_account_info";
const SEND_TRANSACTION: &str = "send_transaction";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct Request<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    result: Option<Json>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// Ledger RPC over HTTP.
pub struct HttpLedgerRpc {
    client: Client,
    url: Url,
    next_id: AtomicU64,
}

impl HttpLedgerRpc {
    /// Fails only if the HTTP client cannot be set up, which is a startup
    /// problem rather than a ledger one.
    pub fn new(url: Url) -> Result<Self, ConfigError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(HttpLedgerRpc {
            client,
            url,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        Self::new(config.rpc_url.clone())
    }

    async fn call<P: Serialize + Send + Sync>(&self, method: &str, params: P) -> Result<Option<Json>, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(method, id, "rpc request");

        let response = self
            .client
            .post(self.url.clone())
            .json(&Request {
                jsonrpc: "2.0",
                id,
                method,
                params,
            })
            .send()
            .await
            .map_err(|e| RpcError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Transport(format!("http status {status}")));
        }

        let body: Response = response
            .json()
            .await
            .map_err(|e| RpcError::InvalidResponse(e.to_string()))?;
        into_result(body)
    }
}

/// Split a JSON-RPC response into its result or a classified error.
fn into_result(response: Response) -> Result<Option<Json>, RpcError> {
    match response.error {
        Some(err) => Err(classify(err.code, err.message)),
        None => Ok(response.result.filter(|v| !v.is_null())),
    }
}

/// Ledger errors mentioning "not found" mean the account is absent.
fn classify(code: i64, message: String) -> RpcError {
    if message.to_ascii_lowercase().contains("not found") {
        RpcError::NotFound(message)
    } else {
        RpcError::Rejected { code, message }
    }
}

fn parse<T: DeserializeOwned>(method: &str, value: Json) -> Result<T, RpcError> {
    serde_json::from_value(value).map_err(|e| RpcError::InvalidResponse(format!("{method}: {e}")))
}

#[async_trait]
impl LedgerRpc for HttpLedgerRpc {
    async fn read_account_info(&self, identity: &Identity) -> Result<AccountInfo, RpcError> {
        match self.call(READ_ACCOUNT_INFO, identity).await? {
            Some(value) => parse(READ_ACCOUNT_INFO, value),
            None => Err(RpcError::NotFound(identity.to_hex())),
        }
    }

    async fn send_transaction(&self, tx: &SignedTransaction) -> Result<SubmissionResult, RpcError> {
        let value = self
            .call(SEND_TRANSACTION, tx)
            .await?
            .ok_or_else(|| RpcError::InvalidResponse(format!("{SEND_TRANSACTION}: empty result")))?;
        Ok(SubmissionResult {
            txid: parse(SEND_TRANSACTION, value)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: Json) -> Response {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn not_found_message_is_case_insensitive() {
        assert!(matches!(
            classify(-32602, "Account Not Found".into()),
            RpcError::NotFound(_)
        ));
        assert!(matches!(
            classify(-32602, "account not found in storage".into()),
            RpcError::NotFound(_)
        ));
    }

    #[test]
    fn other_errors_are_rejections() {
        assert_eq!(
            classify(-32000, "invalid signature".into()),
            RpcError::Rejected {
                code: -32000,
                message: "invalid signature".into()
            }
        );
    }

    #[test]
    fn null_result_is_absent() {
        let r = response(json!({"jsonrpc": "2.0", "id": 1, "result": null}));
        assert_eq!(into_result(r).unwrap(), None);
    }

    #[test]
    fn error_wins_over_result() {
        let r = response(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32001, "message": "node busy"}
        }));
        assert!(matches!(into_result(r), Err(RpcError::Rejected { code: -32001, .. })));
    }

    #[test]
    fn request_shape() {
        let identity = Identity::new([3; 32]);
        let body = serde_json::to_value(Request {
            jsonrpc: "2.0",
            id: 9,
            method: READ_ACCOUNT_INFO,
            params: &identity,
        })
        .unwrap();
        assert_eq!(body["jsonrpc"], "2.0");
        assert_eq!(body["method"], "read_account_info");
        assert_eq!(body["params"].as_array().unwrap().len(), 32);
        assert_eq!(body["params"][0], 3);
    }

    #[test]
    fn txid_parses_from_string() {
        let txid: String = parse(SEND_TRANSACTION, json!("ab12")).unwrap();
        assert_eq!(txid, "ab12");
        assert!(matches!(
            parse::<String>(SEND_TRANSACTION, json!(5)),
            Err(RpcError::InvalidResponse(_))
        ));
    }

    #[test]
    fn builds_from_config() {
        let config = ClientConfig::new(
            "http://127.0.0.1:9002",
            Identity::new([1; 32]),
            Identity::new([2; 32]),
        )
        .unwrap();
        let rpc = HttpLedgerRpc::from_config(&config).unwrap();
        assert_eq!(rpc.url.port(), Some(9002));
    }
}
