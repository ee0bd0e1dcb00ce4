//! # Keystone Engine
//!
//! The top-level orchestrator. It owns the validated fund catalog and the configured
//! calculators, and turns one input [`Snapshot`] into the reconciliation dashboard and
//! the performance aggregates.
//!
//! Every entry point is a pure function of the snapshot and an explicit `as_of`.

use analytics::TradeAggregator;
use chrono::{DateTime, Utc};
use commitment::{AccrualCalculator, CommitmentError, ExpectedPerformance};
use configuration::{FundCatalog, Settings};
use performance::{ManagerRankings, PerformanceAnalyzer, PortfolioPerformance};
use rayon::prelude::*;
use reconciler::{GapReconciler, PerformanceGap};

pub mod dashboard;
pub mod error;
pub mod snapshot;

pub use dashboard::{ActionItem, Dashboard, DashboardSummary};
pub use error::EngineError;
pub use snapshot::Snapshot;

pub struct ReconciliationEngine {
    catalog: FundCatalog,
    reconciler: GapReconciler,
    analyzer: PerformanceAnalyzer,
}

impl ReconciliationEngine {
    /// Validates the settings and builds the engine around the resulting catalog.
    pub fn from_settings(settings: &Settings) -> Result<Self, EngineError> {
        let catalog = settings.validate()?;
        tracing::info!(funds = catalog.len(), "Fund catalog loaded.");

        Ok(Self {
            catalog,
            reconciler: GapReconciler::new(settings.reconciliation.clone()),
            analyzer: PerformanceAnalyzer::new(TradeAggregator::new(settings.analytics.window_days)),
        })
    }

    pub fn catalog(&self) -> &FundCatalog {
        &self.catalog
    }

    pub fn calculator(&self) -> AccrualCalculator<'_> {
        AccrualCalculator::new(&self.catalog)
    }

    /// Reconciles every position of the snapshot. Positions run in parallel; the
    /// output keeps the snapshot's order.
    pub fn reconcile_all(&self, snapshot: &Snapshot, as_of: DateTime<Utc>) -> Vec<PerformanceGap> {
        let calculator = self.calculator();
        let accounts = snapshot.accounts_by_position();

        snapshot
            .positions
            .par_iter()
            .map(|position| {
                let linked = accounts
                    .get(position.position_id.as_str())
                    .map(Vec::as_slice)
                    .unwrap_or(&[]);
                self.reconciler.reconcile(&calculator, position, linked, as_of)
            })
            .collect()
    }

    /// Builds the reconciliation dashboard for `as_of`.
    #[tracing::instrument(skip_all, fields(positions = snapshot.positions.len(), as_of = %as_of))]
    pub fn dashboard(&self, snapshot: &Snapshot, as_of: DateTime<Utc>) -> Dashboard {
        let dashboard = Dashboard::assemble(as_of, self.reconcile_all(snapshot, as_of));

        tracing::info!(
            positions = dashboard.summary.positions,
            action_required = dashboard.summary.action_required,
            degraded = dashboard.summary.degraded,
            total_gap = %dashboard.summary.total_gap,
            "Dashboard assembled."
        );
        dashboard
    }

    /// Expected performance of every position, one result per position in snapshot order.
    pub fn expected_performance(
        &self,
        snapshot: &Snapshot,
        as_of: DateTime<Utc>,
    ) -> Vec<Result<ExpectedPerformance, CommitmentError>> {
        let calculator = self.calculator();
        snapshot
            .positions
            .par_iter()
            .map(|position| {
                let result = calculator.expected_performance(position, as_of);
                if let Err(e) = &result {
                    tracing::warn!(position_id = %position.position_id, error = %e, "Expected performance unavailable.");
                }
                result
            })
            .collect()
    }

    pub fn portfolio(&self, snapshot: &Snapshot) -> PortfolioPerformance {
        self.analyzer
            .portfolio_performance(&snapshot.managers, &snapshot.accounts, &snapshot.trades)
    }

    pub fn rankings(&self, snapshot: &Snapshot) -> ManagerRankings {
        self.analyzer
            .rankings(&snapshot.managers, &snapshot.accounts, &snapshot.trades)
    }
}
