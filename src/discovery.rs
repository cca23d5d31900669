/// Cross-Chain Address Discovery
///
/// The primary address lives on the home chain. Its addresses on the other
/// chains are inferred from its outbound IBC transfers: whoever received
/// funds from it off the home chain is assumed to be the same user. Funds
/// arriving from anywhere else disqualify the wallet.

use serde::Serialize;

use crate::chains::ChainConfig;
use crate::telemetry::truncate_list;
use crate::types::{EventKind, PacketData, TxResponse};

pub const REASON_FOREIGN_HOME_TRANSFER: &str = "Received IBC transfer from another Terra wallet";

pub fn foreign_chain_reason(chain: &str) -> String {
    format!(
        "Received IBC transfer from another wallet than original Terra address on {}",
        chain
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IbcTransfer {
    pub txhash: String,
    pub sender: String,
    pub receiver: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IbcTransfers {
    pub sent: Vec<IbcTransfer>,
    pub received: Vec<IbcTransfer>,
}

impl IbcTransfers {
    /// Inbound packets whose receiver is `account`. Relayer transactions
    /// carry packets for other users too.
    pub fn received_by<'a>(&'a self, account: &'a str) -> impl Iterator<Item = &'a IbcTransfer> + 'a {
        self.received.iter().filter(move |t| t.receiver == account)
    }
}

/// Collect the `packet_data` of every `send_packet` / `recv_packet` event.
///
/// Packet data that is not valid ICS-20 JSON is logged and skipped.
pub fn extract_ibc_transfers(transactions: &[TxResponse]) -> IbcTransfers {
    let mut transfers = IbcTransfers::default();

    for tx in transactions {
        for event in tx.all_events() {
            let kind = event.kind();
            if !matches!(kind, EventKind::SendPacket | EventKind::RecvPacket) {
                continue;
            }

            for raw in event.attribute_values("packet_data") {
                let packet: PacketData = match serde_json::from_str(raw) {
                    Ok(p) => p,
                    Err(e) => {
                        tracing::warn!(txhash = %tx.txhash, error = %e, "Skipping malformed packet_data");
                        continue;
                    }
                };

                let transfer = IbcTransfer {
                    txhash: tx.txhash.clone(),
                    sender: packet.sender,
                    receiver: packet.receiver,
                };
                if kind == EventKind::SendPacket {
                    transfers.sent.push(transfer);
                } else {
                    transfers.received.push(transfer);
                }
            }
        }
    }

    transfers
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Disqualification {
    reasons: Vec<String>,
}

impl Disqualification {
    pub fn is_disqualified(&self) -> bool {
        !self.reasons.is_empty()
    }

    pub fn reasons(&self) -> &[String] {
        &self.reasons
    }

    /// Record `reason`; a reason already recorded is not repeated.
    pub fn flag(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        if !self.reasons.contains(&reason) {
            self.reasons.push(reason);
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddressDiscovery {
    /// First-seen order, no duplicates
    pub secondary_addresses: Vec<String>,
    pub disqualification: Disqualification,
}

/// Infer the primary address's secondary addresses from its home-chain
/// transfers and check every inbound transfer against them.
pub fn discover_secondary_addresses(
    home: &ChainConfig,
    primary: &str,
    transfers: &IbcTransfers,
) -> AddressDiscovery {
    let mut discovery = AddressDiscovery::default();

    for transfer in &transfers.sent {
        if transfer.sender != primary {
            tracing::warn!(txhash = %transfer.txhash, sender = %transfer.sender, wallet = %primary, "Outbound packet sent by another address");
        }
        if !home.owns_address(&transfer.receiver)
            && !discovery.secondary_addresses.contains(&transfer.receiver)
        {
            discovery.secondary_addresses.push(transfer.receiver.clone());
        }
    }

    for transfer in transfers.received_by(primary) {
        if !discovery.secondary_addresses.contains(&transfer.sender) {
            tracing::info!(txhash = %transfer.txhash, sender = %transfer.sender, wallet = %primary, "Inbound transfer from an unknown address");
            discovery.disqualification.flag(REASON_FOREIGN_HOME_TRANSFER);
        }
    }

    tracing::info!(
        wallet = %primary,
        count = discovery.secondary_addresses.len(),
        addresses = %truncate_list(&discovery.secondary_addresses, 5),
        "Discovered secondary addresses"
    );

    discovery
}

/// Flag inbound transfers to `address` on a secondary chain that came from
/// neither the primary address nor one of its discovered secondary addresses.
pub fn check_secondary_inbound(
    chain: &ChainConfig,
    primary: &str,
    address: &str,
    discovery: &mut AddressDiscovery,
    transfers: &IbcTransfers,
) {
    for transfer in transfers.received_by(address) {
        let known = transfer.sender == primary
            || discovery.secondary_addresses.contains(&transfer.sender);
        if !known {
            tracing::info!(chain = %chain.name, txhash = %transfer.txhash, sender = %transfer.sender, "Inbound transfer from an unknown address");
            discovery.disqualification.flag(foreign_chain_reason(&chain.name));
        }
    }
}
