//! Client-local cart with remote checkout synchronization.
//!
//! The local cart is the sole source of truth for *content*; the remote
//! checkout is authoritative only for the redirect URL used at checkout.
//! Every mutation pushes the full projection `(variant_id, quantity)` of the
//! local lines, never a delta, so there is no local/remote line-id mapping
//! to maintain and any divergence heals on the next successful push.
//!
//! # Consistency
//!
//! All mutations run under one `tokio::sync::Mutex` that stays held across
//! the remote call. Overlapping mutations are therefore serialized and
//! full-replace responses cannot land out of order.
//!
//! A failed push is logged and marks the state dirty; the local mutation is
//! kept. The next mutation, or an explicit [`CartStore::reconcile`], pushes
//! the full projection again.

pub mod storage;

use std::str::FromStr;
use std::sync::Arc;

use marigold_core::{CurrencyCode, Price};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{instrument, warn};

use crate::shopify::types::{Checkout, CheckoutLineItem};
use crate::shopify::{ShopifyError, StorefrontClient};

use storage::CartStorage;

// =============================================================================
// Cart Lines
// =============================================================================

/// A line in the local cart.
///
/// Unique per `variant_id` while present; `quantity` is always >= 1. A line
/// reaching zero is removed, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Line ID, assigned from the variant id at insertion.
    pub id: String,
    /// Variant this line purchases.
    pub variant_id: String,
    /// Product title, for display.
    pub title: String,
    /// Product handle, for linking back to the product page.
    pub handle: String,
    /// Product image URL, if any.
    pub image_url: Option<String>,
    /// Unit price at the time the line was added.
    pub unit_price: Price,
    /// Positive quantity.
    pub quantity: u32,
}

impl CartLine {
    /// The line total: unit price times quantity.
    #[must_use]
    pub fn line_price(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Input for [`CartStore::add_item`]: a line as composed from a product page.
#[derive(Debug, Clone)]
pub struct NewCartLine {
    pub variant_id: String,
    pub title: String,
    pub handle: String,
    pub image_url: Option<String>,
    pub unit_price: Price,
    pub quantity: u32,
}

/// A consistent read of the cart for views.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    /// Lines in insertion order.
    pub lines: Vec<CartLine>,
    /// Remote checkout, if one has been created this cart lifecycle.
    pub checkout: Option<Checkout>,
    /// Whether the last remote push failed and the remote set may be stale.
    pub dirty: bool,
}

impl CartSnapshot {
    /// Sum of all line quantities. Recomputed, never cached.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        total_quantity(&self.lines)
    }

    /// Sum of all line totals, in the currency of the first line.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        let currency = self
            .lines
            .first()
            .map_or(CurrencyCode::default(), |line| {
                line.unit_price.currency_code
            });
        self.lines
            .iter()
            .fold(Price::zero(currency), |total, line| {
                total.plus(&line.line_price())
            })
    }
}

// =============================================================================
// Pure Mutation Helpers
// =============================================================================

/// Merge a new line into the cart: same variant increments quantity,
/// otherwise the line is appended in insertion order.
fn apply_add(lines: &mut Vec<CartLine>, new: NewCartLine) {
    if let Some(existing) = lines.iter_mut().find(|l| l.variant_id == new.variant_id) {
        existing.quantity += new.quantity;
    } else {
        lines.push(CartLine {
            id: new.variant_id.clone(),
            variant_id: new.variant_id,
            title: new.title,
            handle: new.handle,
            image_url: new.image_url,
            unit_price: new.unit_price,
            quantity: new.quantity,
        });
    }
}

/// Set a line's quantity; zero drops the line entirely.
fn apply_quantity(lines: &mut Vec<CartLine>, line_id: &str, quantity: u32) {
    if quantity == 0 {
        lines.retain(|l| l.id != line_id);
    } else if let Some(line) = lines.iter_mut().find(|l| l.id == line_id) {
        line.quantity = quantity;
    }
}

/// The projection `(variant_id, quantity)` pushed to the remote checkout.
fn projection(lines: &[CartLine]) -> Vec<CheckoutLineItem> {
    lines
        .iter()
        .map(|line| CheckoutLineItem {
            variant_id: line.variant_id.clone(),
            quantity: i64::from(line.quantity),
        })
        .collect()
}

fn total_quantity(lines: &[CartLine]) -> u32 {
    lines.iter().map(|line| line.quantity).sum()
}

// =============================================================================
// CartStore
// =============================================================================

struct CartState {
    lines: Vec<CartLine>,
    checkout: Option<Checkout>,
    dirty: bool,
}

impl CartState {
    fn snapshot(&self) -> CartSnapshot {
        CartSnapshot {
            lines: self.lines.clone(),
            checkout: self.checkout.clone(),
            dirty: self.dirty,
        }
    }
}

/// Process-wide cart store.
///
/// Owned by `AppState` for the process lifetime; hydrated once at startup
/// from durable storage. Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    state: Mutex<CartState>,
    client: StorefrontClient,
    storage: CartStorage,
}

impl CartStore {
    /// Create a store, hydrating from durable storage.
    ///
    /// Missing or corrupt state hydrates as an empty cart; the storage is a
    /// durability cache, not a source of truth.
    #[must_use]
    pub fn hydrate(client: StorefrontClient, storage: CartStorage) -> Self {
        let persisted = storage.load();

        Self {
            inner: Arc::new(CartStoreInner {
                state: Mutex::new(CartState {
                    lines: persisted.lines,
                    checkout: persisted.checkout,
                    dirty: false,
                }),
                client,
                storage,
            }),
        }
    }

    /// Add a line to the cart, merging by variant id, then push the full
    /// projection to the remote checkout (creating one if none exists).
    ///
    /// A failed push keeps the local addition and marks the cart dirty.
    #[instrument(skip(self, new), fields(variant_id = %new.variant_id, quantity = new.quantity))]
    pub async fn add_item(&self, new: NewCartLine) -> CartSnapshot {
        let mut state = self.inner.state.lock().await;
        apply_add(&mut state.lines, new);
        self.sync_remote(&mut state).await;
        self.persist(&state);
        state.snapshot()
    }

    /// Set a line's quantity; zero removes the line. Pushes the full
    /// projection if a checkout exists.
    #[instrument(skip(self), fields(line_id = %line_id, quantity = quantity))]
    pub async fn update_quantity(&self, line_id: &str, quantity: u32) -> CartSnapshot {
        let mut state = self.inner.state.lock().await;
        apply_quantity(&mut state.lines, line_id, quantity);
        if state.checkout.is_some() {
            self.sync_remote(&mut state).await;
        }
        self.persist(&state);
        state.snapshot()
    }

    /// Remove a line. Sugar for `update_quantity(line_id, 0)`.
    pub async fn remove_item(&self, line_id: &str) -> CartSnapshot {
        self.update_quantity(line_id, 0).await
    }

    /// Empty the cart and discard the checkout, in memory and in durable
    /// storage. The remote side is not notified; the next `add_item` creates
    /// a fresh checkout.
    #[instrument(skip(self))]
    pub async fn clear(&self) {
        let mut state = self.inner.state.lock().await;
        state.lines.clear();
        state.checkout = None;
        state.dirty = false;
        if let Err(e) = self.inner.storage.clear() {
            warn!("Failed to clear cart storage: {e}");
        }
    }

    /// Retry the remote push if the last one failed.
    ///
    /// Invoked opportunistically when the cart page renders. Returns whether
    /// the cart is clean afterwards.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> bool {
        let mut state = self.inner.state.lock().await;
        if state.dirty {
            self.sync_remote(&mut state).await;
            self.persist(&state);
        }
        !state.dirty
    }

    /// A consistent read of the cart.
    pub async fn snapshot(&self) -> CartSnapshot {
        self.inner.state.lock().await.snapshot()
    }

    /// Sum of all line quantities. Recomputed, never cached.
    pub async fn total_quantity(&self) -> u32 {
        total_quantity(&self.inner.state.lock().await.lines)
    }

    /// Push the full projection of the local lines to the remote checkout,
    /// creating one if none exists. Called with the state lock held, which
    /// serializes overlapping mutations.
    async fn sync_remote(&self, state: &mut CartState) {
        let items = projection(&state.lines);

        let result = match &state.checkout {
            None => {
                if items.is_empty() {
                    // Nothing to create a checkout for
                    state.dirty = false;
                    return;
                }
                self.inner.client.create_checkout(items).await
            }
            Some(checkout) => {
                self.inner
                    .client
                    .replace_checkout_line_items(&checkout.id, items)
                    .await
            }
        };

        match result {
            Ok(checkout) => {
                state.checkout = Some(checkout);
                state.dirty = false;
            }
            Err(e) => {
                // Local mutation is kept; the remote set is stale until the
                // next successful full-replace push.
                warn!("Failed to sync cart to remote checkout: {e}");
                record_sync_failure(&e);
                state.dirty = true;
            }
        }
    }

    fn persist(&self, state: &CartState) {
        if let Err(e) = self
            .inner
            .storage
            .save(&state.lines, state.checkout.as_ref())
        {
            warn!("Failed to persist cart state: {e}");
        }
    }
}

/// Report a sync failure to Sentry without surfacing it to the user.
fn record_sync_failure(error: &ShopifyError) {
    sentry::capture_error(error);
}
