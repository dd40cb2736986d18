//! Gacha pulls.
//!
//! A pull spends one token up front, waits out the presentation delay, then
//! unlocks a uniformly chosen locked companion. With nothing left to unlock
//! it falls back to bonus evolution progress. Only one pull per user may be
//! in flight; a pull whose future is dropped mid-delay forfeits its token.

use std::collections::HashSet;
use std::sync::MutexGuard;

use rand::rngs::StdRng;
use rand::Rng;
use tracing::{info, warn};

use fundflow_core::action::PullOutcome;
use fundflow_core::error::FundflowError;
use fundflow_core::types::{CompanionId, Timestamp, UserId};

use crate::engine::LifecycleEngine;
use crate::progression::{bonus_targets, CollectionEvent};

/// Clears the user's in-flight flag however the pull ends.
struct PullGuard<'a> {
    engine: &'a LifecycleEngine,
    user: UserId,
}

impl Drop for PullGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.engine.pulls_in_flight.lock() {
            in_flight.remove(&self.user);
        }
    }
}

impl LifecycleEngine {
    /// Spend a token and reveal a companion after `config.gacha_delay`.
    pub async fn pull_gacha(&self, user: &UserId, now: Timestamp) -> Result<PullOutcome, FundflowError> {
        let _guard = self.begin_pull(user, now)?;
        tokio::time::sleep(self.config.gacha_delay).await;
        self.finish_pull(user, now)
    }

    fn in_flight(&self) -> Result<MutexGuard<'_, HashSet<UserId>>, FundflowError> {
        self.pulls_in_flight
            .lock()
            .map_err(|_| FundflowError::Storage("pull registry poisoned".into()))
    }

    fn rng_handle(&self) -> Result<MutexGuard<'_, StdRng>, FundflowError> {
        self.rng
            .lock()
            .map_err(|_| FundflowError::Storage("gacha rng poisoned".into()))
    }

    fn begin_pull(&self, user: &UserId, now: Timestamp) -> Result<PullGuard<'_>, FundflowError> {
        let mut in_flight = self.in_flight()?;
        if in_flight.contains(user) {
            warn!(%user, "gacha pull rejected: another pull in progress");
            return Err(FundflowError::PullInProgress);
        }

        {
            let mut store = self.write()?;
            let mut ledger = store.get_ledger(user)?.clone();
            if let Err(e) = ledger.record(CollectionEvent::TokenSpent { at: now }) {
                warn!(%user, error = %e, "gacha pull rejected");
                return Err(e);
            }
            store.put_ledger(user.clone(), ledger);
        }

        in_flight.insert(user.clone());
        info!(%user, delay_ms = self.config.gacha_delay.as_millis() as u64, "gacha pull started");
        Ok(PullGuard { engine: self, user: user.clone() })
    }

    fn finish_pull(&self, user: &UserId, now: Timestamp) -> Result<PullOutcome, FundflowError> {
        let mut store = self.write()?;
        let mut ledger = store.get_ledger(user)?.clone();

        let locked: Vec<CompanionId> = ledger
            .state()
            .locked_companions()
            .into_iter()
            .map(|c| c.id.clone())
            .collect();

        let outcome = if locked.is_empty() {
            let boosted = bonus_targets(ledger.state());
            ledger.record(CollectionEvent::BonusProgress { companions: boosted.clone() })?;
            info!(%user, boosted = boosted.len(), "gacha bonus progress");
            PullOutcome::Bonus {
                boosted,
                tokens_left: ledger.state().gacha_tokens,
            }
        } else {
            let pick = self.rng_handle()?.gen_range(0..locked.len());
            let id = locked[pick].clone();
            ledger.record(CollectionEvent::Unlocked { companion: id.clone(), at: now })?;
            let companion = ledger
                .state()
                .companion(&id)
                .cloned()
                .ok_or_else(|| FundflowError::UnknownCompanion(id.to_string()))?;
            info!(%user, companion = %id, "gacha unlocked companion");
            PullOutcome::Unlocked {
                companion,
                tokens_left: ledger.state().gacha_tokens,
            }
        };

        store.put_ledger(user.clone(), ledger);
        Ok(outcome)
    }
}
