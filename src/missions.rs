/// Game of Alliances mission checklist, evaluated from the activity counters.

use serde::Serialize;
use std::fmt;

use crate::analysis::ActivityStats;

/// IBC transfers and delegations both needed for the cross-chain mission
pub const CROSS_CHAIN_MISSION_THRESHOLD: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MissionStatus {
    Ok,
    /// Passed by a heuristic over counters rather than the exact sequence
    Experimental,
    NotOk,
}

impl MissionStatus {
    pub fn is_passed(&self) -> bool {
        !matches!(self, MissionStatus::NotOk)
    }

    fn from_check(passed: bool) -> Self {
        if passed {
            MissionStatus::Ok
        } else {
            MissionStatus::NotOk
        }
    }
}

impl fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissionStatus::Ok => write!(f, "OK"),
            MissionStatus::Experimental => write!(f, "OK - experimental -"),
            MissionStatus::NotOk => write!(f, "NOT_OK"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mission {
    pub tier: u8,
    pub description: &'static str,
    pub status: MissionStatus,
}

pub fn evaluate_missions(stats: &ActivityStats) -> Vec<Mission> {
    let cross_chain = stats.total_ibc_sent >= CROSS_CHAIN_MISSION_THRESHOLD
        && stats.total_delegations >= CROSS_CHAIN_MISSION_THRESHOLD;

    vec![
        Mission {
            tier: 1,
            description: "Delegate to any validator using the Alliance module",
            status: MissionStatus::from_check(stats.total_delegations > 0),
        },
        Mission {
            tier: 1,
            description: "Redelegate to any validator using the Alliance module",
            status: MissionStatus::from_check(stats.total_redelegations > 0),
        },
        Mission {
            tier: 1,
            description: "Undelegate from any validator using the Alliance module",
            status: MissionStatus::from_check(stats.total_undelegations > 0),
        },
        Mission {
            tier: 1,
            description: "Claim staking rewards from any chain",
            status: MissionStatus::from_check(stats.total_claims > 0),
        },
        Mission {
            tier: 3,
            description: "Undelegate from one chain, send tokens through IBC, and delegate to a different chain at least ten times",
            status: if cross_chain {
                MissionStatus::Experimental
            } else {
                MissionStatus::NotOk
            },
        },
    ]
}
