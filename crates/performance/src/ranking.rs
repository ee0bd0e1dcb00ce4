use crate::fund::ManagerFailure;
use crate::manager::ManagerPerformance;
use serde::{Deserialize, Serialize};

/// The ranked active managers plus every manager whose record could not be computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManagerRankings {
    pub rankings: Vec<ManagerPerformance>,
    pub failures: Vec<ManagerFailure>,
}

/// Ranks active managers by return, best first, with 1-based ranks.
///
/// Inactive managers are left out. Managers with equal returns keep their input order.
pub fn rank_managers(managers: &[ManagerPerformance]) -> Vec<ManagerPerformance> {
    let mut ranked: Vec<ManagerPerformance> = managers.iter().filter(|m| m.active).cloned().collect();
    ranked.sort_by(|a, b| b.return_pct.cmp(&a.return_pct));

    for (index, manager) in ranked.iter_mut().enumerate() {
        manager.rank = Some(index + 1);
    }
    ranked
}
