use crate::domain::expense::GroupId;
use crate::domain::ledger::Ledger;
use crate::domain::member::MemberId;
use crate::domain::money::{Amount, Money};
use crate::domain::planner::plan_settlements;
use crate::domain::ports::{LedgerStoreBox, ProfileDirectory};
use crate::domain::settlement::{Balances, Settlement};
use crate::domain::summary::{GroupSummary, summarize};
use crate::domain::validation::check_settlements_clear;
use crate::error::Result;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Tunables of the settlement engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Differences at or below this magnitude count as zero.
    pub epsilon: Money,
    /// Reuse results for ledgers whose fingerprint has been settled before.
    pub cache_results: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            epsilon: Money::DEFAULT_EPSILON,
            cache_results: true,
        }
    }
}

/// Balances and settlement plan of one group, as of one ledger fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSettlement {
    pub group: GroupId,
    pub fingerprint: String,
    pub balances: Balances,
    pub settlements: Vec<Settlement>,
}

/// A settlement with display names attached for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledSettlement {
    pub from: MemberId,
    pub from_name: String,
    pub to: MemberId,
    pub to_name: String,
    pub amount: Amount,
}

/// The entry point for settling group ledgers.
///
/// `SettlementEngine` fetches a group's whole ledger from its store in a
/// single read, then hands it to the pure accumulator and planner. The latest
/// result of each group is cached along with its ledger fingerprint and reused
/// while the fingerprint still matches.
pub struct SettlementEngine {
    store: LedgerStoreBox,
    config: EngineConfig,
    cache: Arc<RwLock<HashMap<GroupId, GroupSettlement>>>,
}

impl SettlementEngine {
    /// Creates a new `SettlementEngine` reading ledgers from `store`.
    pub fn new(store: LedgerStoreBox, config: EngineConfig) -> Self {
        Self {
            store,
            config,
            cache: Arc::default(),
        }
    }

    /// Every group known to the store, in id order.
    pub async fn groups(&self) -> Result<Vec<GroupId>> {
        self.store.groups().await
    }

    /// Computes the balances and settlement plan of `group`.
    #[instrument(skip_all, fields(group = %group))]
    pub async fn settle_group(&self, group: &GroupId) -> Result<GroupSettlement> {
        let ledger = self.store.load_ledger(group).await?;
        let fingerprint = ledger.fingerprint();

        if self.config.cache_results {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.get(group) {
                if cached.fingerprint == fingerprint {
                    debug!(%fingerprint, "reusing cached settlement");
                    return Ok(cached.clone());
                }
            }
        }

        let settled = self.settle_ledger(group, &ledger, fingerprint)?;
        info!(
            members = settled.balances.len(),
            transfers = settled.settlements.len(),
            "group settled"
        );

        if self.config.cache_results {
            let mut cache = self.cache.write().await;
            cache.insert(group.clone(), settled.clone());
        }
        Ok(settled)
    }

    fn settle_ledger(
        &self,
        group: &GroupId,
        ledger: &Ledger,
        fingerprint: String,
    ) -> Result<GroupSettlement> {
        let balances = ledger.balances(self.config.epsilon)?;
        let settlements = plan_settlements(&balances, self.config.epsilon)?;
        check_settlements_clear(&balances, &settlements, self.config.epsilon)?;
        Ok(GroupSettlement {
            group: group.clone(),
            fingerprint,
            balances,
            settlements,
        })
    }

    /// Spending totals of `group`.
    pub async fn summarize_group(&self, group: &GroupId) -> Result<GroupSummary> {
        let ledger = self.store.load_ledger(group).await?;
        summarize(&ledger.expenses, &ledger.splits)
    }

    /// Attaches display names to `settlements` with one directory lookup.
    ///
    /// Members the directory does not know are shown by their id.
    pub async fn label_settlements(
        &self,
        settlements: &[Settlement],
        directory: &dyn ProfileDirectory,
    ) -> Result<Vec<LabelledSettlement>> {
        let members: Vec<MemberId> = settlements
            .iter()
            .flat_map(|s| [s.from.clone(), s.to.clone()])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let names = directory.display_names(&members).await?;
        let name_of = |id: &MemberId| {
            names
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.as_str().to_owned())
        };

        Ok(settlements
            .iter()
            .map(|s| LabelledSettlement {
                from: s.from.clone(),
                from_name: name_of(&s.from),
                to: s.to.clone(),
                to_name: name_of(&s.to),
                amount: s.amount,
            })
            .collect())
    }
}
