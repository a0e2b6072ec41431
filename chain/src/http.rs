//! HTTP chain reader: JSON-RPC node access plus the explorer governance API.

use async_trait::async_trait;
use serde_json::json;

use agora_types::{NetworkId, ProposalId, Tally};

use crate::wire::{ProposalListResponse, WireProposal};
use crate::{ChainError, ChainProposal, ChainReader};

/// Reads governance state over HTTP.
///
/// The JSON-RPC endpoint is used only to verify connectivity and the chain
/// id; the proposal list and tallies come from the explorer API.
pub struct HttpChainReader {
    http: reqwest::Client,
    rpc_url: String,
    explorer_url: String,
}

impl HttpChainReader {
    pub fn new(rpc_url: impl Into<String>, explorer_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            rpc_url: rpc_url.into(),
            explorer_url: explorer_url.into(),
        }
    }

    /// Reader wired to a network's default endpoints.
    pub fn for_network(network: NetworkId) -> Self {
        Self::new(network.default_rpc_url(), network.default_explorer_url())
    }

    /// Ask the node for its chain id and fail if it is not the expected one.
    /// The service calls this at startup so a misconfigured RPC URL aborts
    /// before the first poll writes anything; [`list_proposals`] repeats the
    /// check on every poll in case the endpoint changes behind a proxy.
    ///
    /// [`list_proposals`]: ChainReader::list_proposals
    pub async fn verify_chain_id(&self, expected: u64) -> Result<(), ChainError> {
        let got = self.eth_chain_id().await?;
        if got != expected {
            return Err(ChainError::ChainIdMismatch { expected, got });
        }
        tracing::info!(chain_id = got, "connected to chain");
        Ok(())
    }

    async fn eth_chain_id(&self) -> Result<u64, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_chainId",
            "params": [],
        });
        let response: serde_json::Value = self
            .http
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.get("error") {
            return Err(ChainError::Rpc(error.to_string()));
        }
        let hex = response
            .get("result")
            .and_then(|r| r.as_str())
            .ok_or_else(|| ChainError::Decode("eth_chainId result missing".into()))?;
        u64::from_str_radix(hex.trim_start_matches("0x"), 16)
            .map_err(|_| ChainError::Decode(format!("bad chain id {hex:?}")))
    }

    async fn fetch_proposals(&self) -> Result<Vec<ChainProposal>, ChainError> {
        let url = format!("{}/governance/proposals", self.explorer_url);
        let response: ProposalListResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| ChainError::Decode(e.to_string()))?;

        response
            .items
            .into_iter()
            .map(WireProposal::into_proposal)
            .collect()
    }
}

#[async_trait]
impl ChainReader for HttpChainReader {
    async fn list_proposals(&self, chain_id: u64) -> Result<Vec<ChainProposal>, ChainError> {
        self.verify_chain_id(chain_id).await?;
        let proposals = self.fetch_proposals().await?;
        tracing::debug!(count = proposals.len(), "fetched chain proposals");
        Ok(proposals)
    }

    async fn get_tally(&self, proposal_id: ProposalId) -> Result<Tally, ChainError> {
        let url = format!(
            "{}/governance/proposals/{}",
            self.explorer_url,
            proposal_id.as_u64()
        );
        let wire: WireProposal = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| ChainError::Decode(e.to_string()))?;
        wire.into_proposal().map(|p| p.tally)
    }
}
