//! Wire formats for the explorer governance endpoint.
//!
//! Statuses arrive as lowercase labels and vote weights as decimal strings
//! (chain-native units routinely exceed `u64`).

use serde::Deserialize;

use agora_types::{ProposalId, ProposalStatus, Tally};

use crate::{ChainError, ChainProposal};

#[derive(Debug, Deserialize)]
pub(crate) struct ProposalListResponse {
    pub items: Vec<WireProposal>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireProposal {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: String,
    #[serde(default)]
    pub tally: WireTally,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct WireTally {
    #[serde(default)]
    pub ayes: String,
    #[serde(default)]
    pub nays: String,
    #[serde(default)]
    pub recuse: String,
}

impl WireProposal {
    pub fn into_proposal(self) -> Result<ChainProposal, ChainError> {
        let proposal_id = ProposalId::new(self.id);
        let title = if self.title.is_empty() {
            format!("Proposal {proposal_id}")
        } else {
            self.title
        };
        Ok(ChainProposal {
            proposal_id,
            title,
            description: self.description,
            status: parse_status(&self.status),
            tally: self.tally.into_tally()?,
        })
    }
}

impl WireTally {
    pub fn into_tally(self) -> Result<Tally, ChainError> {
        Ok(Tally::new(
            parse_weight(&self.ayes)?,
            parse_weight(&self.nays)?,
            parse_weight(&self.recuse)?,
        ))
    }
}

/// Unknown labels decode to [`ProposalStatus::Unknown`] rather than failing
/// the whole poll; one odd proposal must not block the rest.
pub(crate) fn parse_status(label: &str) -> ProposalStatus {
    match label {
        "pending" => ProposalStatus::Pending,
        "active" | "ongoing" => ProposalStatus::Active,
        "passed" | "approved" => ProposalStatus::Passed,
        "rejected" => ProposalStatus::Rejected,
        "executed" => ProposalStatus::Executed,
        "no_quorum" | "quorum_failed" => ProposalStatus::NoQuorum,
        other => {
            tracing::debug!(status = other, "unrecognized proposal status label");
            ProposalStatus::Unknown
        }
    }
}

fn parse_weight(s: &str) -> Result<u128, ChainError> {
    if s.is_empty() {
        return Ok(0);
    }
    s.parse::<u128>()
        .map_err(|_| ChainError::Decode(format!("bad vote weight {s:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_full_proposal() {
        let json = r#"{
            "id": 12,
            "title": "Treasury allocation",
            "description": "Fund infrastructure work",
            "status": "active",
            "tally": {"ayes": "100000000000000000000", "nays": "20", "recuse": "0"}
        }"#;
        let wire: WireProposal = serde_json::from_str(json).unwrap();
        let proposal = wire.into_proposal().unwrap();

        assert_eq!(proposal.proposal_id, ProposalId::new(12));
        assert_eq!(proposal.status, ProposalStatus::Active);
        assert_eq!(proposal.tally.aye_weight, 100_000_000_000_000_000_000u128);
        assert_eq!(proposal.tally.nay_weight, 20);
    }

    #[test]
    fn missing_tally_and_title_get_defaults() {
        let json = r#"{"id": 3, "status": "pending"}"#;
        let wire: WireProposal = serde_json::from_str(json).unwrap();
        let proposal = wire.into_proposal().unwrap();

        assert_eq!(proposal.title, "Proposal #3");
        assert_eq!(proposal.tally, Tally::default());
    }

    #[test]
    fn unknown_status_label_maps_to_unknown() {
        assert_eq!(parse_status("tallying"), ProposalStatus::Unknown);
        assert_eq!(parse_status("quorum_failed"), ProposalStatus::NoQuorum);
    }

    #[test]
    fn garbage_weight_is_a_decode_error() {
        let tally = WireTally {
            ayes: "12junk".into(),
            nays: String::new(),
            recuse: String::new(),
        };
        assert!(matches!(tally.into_tally(), Err(ChainError::Decode(_))));
    }
}
