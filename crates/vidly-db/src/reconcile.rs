//! # Bulk Customer Reconciliation
//!
//! Applies a batch of gold-status changes and customer removals as a single
//! unit of work. Removing a customer also removes its owning user.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  reconcile(changed, removed)          one unit of work "reconcile"     │
//! │                                                                         │
//! │  1. UpdateCustomers   set is_gold per change    each must match 1 row  │
//! │  2. DeleteCustomers   delete (id, user_id)      total == removed.len() │
//! │  3. DeleteUsers       delete user_id            total == removed.len() │
//! │                                                                         │
//! │  mismatch     → rollback → PartialFailure { phase, expected, actual }  │
//! │  store error  → rollback → TransactionFailed { phase, reason }         │
//! │  begin/commit error      → TransactionFailed { Begin | Commit }        │
//! │  all good     → commit   → ReconcileSummary                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Customers are deleted before users because `customers.user_id`
//! references `users.id` without cascade.

use thiserror::Error;
use tracing::{info, warn};

use crate::error::DbError;
use crate::pool::Database;
use crate::unit_of_work::UnitOfWork;
use vidly_core::{CustomerChange, CustomerRemoval, ReconcilePhase, ReconcileSummary};

/// Why a reconciliation was rolled back. The store is unchanged.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A phase touched a different number of rows than requested.
    #[error("Reconciliation failed during {phase}: expected {expected} rows, got {actual}")]
    PartialFailure {
        phase: ReconcilePhase,
        expected: u64,
        actual: u64,
    },

    /// The store failed while a phase was running.
    #[error("Reconciliation failed during {phase}: {reason}")]
    TransactionFailed { phase: ReconcilePhase, reason: String },
}

impl ReconcileError {
    pub fn phase(&self) -> ReconcilePhase {
        match self {
            ReconcileError::PartialFailure { phase, .. } => *phase,
            ReconcileError::TransactionFailed { phase, .. } => *phase,
        }
    }
}

fn failed(phase: ReconcilePhase) -> impl Fn(DbError) -> ReconcileError {
    move |err| ReconcileError::TransactionFailed {
        phase,
        reason: err.to_string(),
    }
}

/// Runs bulk customer reconciliation.
#[derive(Debug, Clone)]
pub struct CustomerReconciler {
    db: Database,
}

impl CustomerReconciler {
    pub fn new(db: Database) -> Self {
        CustomerReconciler { db }
    }

    /// Applies `changed` then `removed` atomically.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let summary = db.reconciler().reconcile(
    ///     &[CustomerChange { customer_id, is_gold: true }],
    ///     &[CustomerRemoval { customer_id: other, user_id: owner }],
    /// ).await?;
    /// assert_eq!(summary.users_deleted, 1);
    /// ```
    pub async fn reconcile(
        &self,
        changed: &[CustomerChange],
        removed: &[CustomerRemoval],
    ) -> Result<ReconcileSummary, ReconcileError> {
        let mut uow = self
            .db
            .begin("reconcile")
            .await
            .map_err(failed(ReconcilePhase::Begin))?;

        let summary = match Self::apply(&mut uow, changed, removed).await {
            Ok(summary) => summary,
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(error = %rollback_err, "Reconcile rollback failed");
                }
                warn!(phase = %err.phase(), error = %err, "Reconcile rolled back");
                return Err(err);
            }
        };

        uow.commit().await.map_err(failed(ReconcilePhase::Commit))?;

        info!(
            updated = summary.updated,
            customers_deleted = summary.customers_deleted,
            users_deleted = summary.users_deleted,
            "Customers reconciled"
        );
        Ok(summary)
    }

    async fn apply(
        uow: &mut UnitOfWork,
        changed: &[CustomerChange],
        removed: &[CustomerRemoval],
    ) -> Result<ReconcileSummary, ReconcileError> {
        let mut summary = ReconcileSummary::default();

        let phase = ReconcilePhase::UpdateCustomers;
        for change in changed {
            let matched = uow
                .set_customer_gold(&change.customer_id, change.is_gold)
                .await
                .map_err(failed(phase))?;
            if matched != 1 {
                return Err(ReconcileError::PartialFailure {
                    phase,
                    expected: changed.len() as u64,
                    actual: summary.updated,
                });
            }
            summary.updated += 1;
        }

        let phase = ReconcilePhase::DeleteCustomers;
        for removal in removed {
            summary.customers_deleted += uow
                .delete_customer_of_user(&removal.customer_id, &removal.user_id)
                .await
                .map_err(failed(phase))?;
        }
        if summary.customers_deleted != removed.len() as u64 {
            return Err(ReconcileError::PartialFailure {
                phase,
                expected: removed.len() as u64,
                actual: summary.customers_deleted,
            });
        }

        let phase = ReconcilePhase::DeleteUsers;
        for removal in removed {
            summary.users_deleted += uow.delete_user(&removal.user_id).await.map_err(failed(phase))?;
        }
        if summary.users_deleted != removed.len() as u64 {
            return Err(ReconcileError::PartialFailure {
                phase,
                expected: removed.len() as u64,
                actual: summary.users_deleted,
            });
        }

        Ok(summary)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
