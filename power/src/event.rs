//! Events emitted by the power ledger.

use givpower_types::{HolderAddress, Round};
use serde::{Deserialize, Serialize};

/// Ledger-level events observers can subscribe to via the [`EventBus`].
///
/// `Transfer` mirrors the ERC-20 event: mints come from the zero address and
/// burns go to it. No other transfers exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum LedgerEvent {
    /// Balance credited to a holder (wrap or lock bonus).
    Staked { holder: HolderAddress, amount: u128 },
    /// Balance debited from a holder (unwrap or released bonus).
    Withdrawn { holder: HolderAddress, amount: u128 },
    Transfer {
        from: HolderAddress,
        to: HolderAddress,
        amount: u128,
    },
    TokenLocked {
        holder: HolderAddress,
        amount: u128,
        rounds: u64,
        until_round: Round,
    },
    TokenUnlocked {
        holder: HolderAddress,
        amount: u128,
        until_round: Round,
    },
    /// A reward period was funded.
    RewardAdded { reward: u128 },
    /// Pending rewards were allocated to a holder.
    RewardPaid { holder: HolderAddress, reward: u128 },
}

impl LedgerEvent {
    pub fn mint(to: HolderAddress, amount: u128) -> Self {
        LedgerEvent::Transfer {
            from: HolderAddress::ZERO,
            to,
            amount,
        }
    }

    pub fn burn(from: HolderAddress, amount: u128) -> Self {
        LedgerEvent::Transfer {
            from,
            to: HolderAddress::ZERO,
            amount,
        }
    }
}

/// Synchronous fan-out event bus.
///
/// Listeners run inline on the mutating call; keep handlers fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LedgerEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LedgerEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LedgerEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));
        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        bus.emit(&LedgerEvent::RewardAdded { reward: 5 });
        assert_eq!(counter.load(Ordering::SeqCst), 11);
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        EventBus::default().emit(&LedgerEvent::mint(HolderAddress::from_low_u64(1), 1));
    }

    #[test]
    fn mint_and_burn_use_zero_address() {
        let h = HolderAddress::from_low_u64(3);
        assert_eq!(
            LedgerEvent::mint(h, 9),
            LedgerEvent::Transfer { from: HolderAddress::ZERO, to: h, amount: 9 }
        );
        assert_eq!(
            LedgerEvent::burn(h, 9),
            LedgerEvent::Transfer { from: h, to: HolderAddress::ZERO, amount: 9 }
        );
    }

    #[test]
    fn events_serialize_with_tag() {
        let event = LedgerEvent::TokenLocked {
            holder: HolderAddress::from_low_u64(1),
            amount: 10,
            rounds: 2,
            until_round: 5,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "TokenLocked");
        assert_eq!(json["until_round"], 5);
        assert_eq!(json["holder"], "0x0000000000000000000000000000000000000001");
    }
}
