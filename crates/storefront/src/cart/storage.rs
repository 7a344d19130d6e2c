//! Durable cart storage.
//!
//! Three string keys mapped to three files in the state directory: the
//! serialized line list (`cart.json`), the checkout id (`checkout_id`) and
//! the checkout URL (`checkout_url`). Read once at startup, written after
//! every cart mutation, removed together on clear.
//!
//! This is a durability cache, not a source of truth: anything unreadable
//! hydrates as an empty cart with a warning.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::shopify::types::Checkout;

use super::CartLine;

const CART_FILE: &str = "cart.json";
const CHECKOUT_ID_FILE: &str = "checkout_id";
const CHECKOUT_URL_FILE: &str = "checkout_url";

/// File-backed storage for the cart state directory.
pub struct CartStorage {
    dir: PathBuf,
}

/// State as loaded from disk at startup.
#[derive(Debug, Default)]
pub struct PersistedCart {
    pub lines: Vec<CartLine>,
    pub checkout: Option<Checkout>,
}

impl CartStorage {
    /// Create storage rooted at `dir`. The directory is created on first
    /// write, not here.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load persisted state. Missing files mean an empty cart; corrupt
    /// content is discarded with a warning.
    #[must_use]
    pub fn load(&self) -> PersistedCart {
        let lines = match fs::read_to_string(self.dir.join(CART_FILE)) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(lines) => lines,
                Err(e) => {
                    warn!("Discarding unreadable cart state: {e}");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        // A checkout is only meaningful with both its id and URL present
        let checkout = match (
            read_key(&self.dir.join(CHECKOUT_ID_FILE)),
            read_key(&self.dir.join(CHECKOUT_URL_FILE)),
        ) {
            (Some(id), Some(web_url)) => Some(Checkout { id, web_url }),
            _ => None,
        };

        PersistedCart { lines, checkout }
    }

    /// Write the full state. Called after every cart mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the state directory cannot be created or a file
    /// cannot be written.
    pub fn save(&self, lines: &[CartLine], checkout: Option<&Checkout>) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;

        let serialized = serde_json::to_string_pretty(lines)?;
        fs::write(self.dir.join(CART_FILE), serialized)?;

        match checkout {
            Some(checkout) => {
                fs::write(self.dir.join(CHECKOUT_ID_FILE), &checkout.id)?;
                fs::write(self.dir.join(CHECKOUT_URL_FILE), &checkout.web_url)?;
            }
            None => {
                remove_if_present(&self.dir.join(CHECKOUT_ID_FILE))?;
                remove_if_present(&self.dir.join(CHECKOUT_URL_FILE))?;
            }
        }

        Ok(())
    }

    /// Remove all three keys together.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be removed.
    pub fn clear(&self) -> io::Result<()> {
        remove_if_present(&self.dir.join(CART_FILE))?;
        remove_if_present(&self.dir.join(CHECKOUT_ID_FILE))?;
        remove_if_present(&self.dir.join(CHECKOUT_URL_FILE))?;
        Ok(())
    }
}

fn read_key(path: &Path) -> Option<String> {
    fs::read_to_string(path)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}
