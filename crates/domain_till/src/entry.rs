//! Ledger entries - the sole persisted unit of the till
//!
//! Every movement of physical cash is an immutable, append-only
//! [`LedgerEntry`]. Balance and open/closed state are derived from the entry
//! history; corrections are new entries, never edits.
//!
//! Sign convention: `Out` entries store a negative amount, every other kind
//! stores a non-negative amount, so the sum of all entries for a drawer *is*
//! its balance. The factories below are the only way to build entries, which
//! keeps the convention out of call sites.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use core_kernel::{ActorId, Cash, DrawerId, EntryId};

/// Default description for `Start` entries.
pub const DEFAULT_OPEN_DESCRIPTION: &str = "Apertura de caja";
/// Default description for `Close` entries.
pub const DEFAULT_CLOSE_DESCRIPTION: &str = "Corte de caja";
/// Default description for `Sale` entries.
pub const DEFAULT_SALE_DESCRIPTION: &str = "Venta";
/// Default description for `Return` entries.
pub const DEFAULT_RETURN_DESCRIPTION: &str = "Devolución";

/// The closed set of entry kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// Opening float; starts a drawer session.
    Start,
    /// Manual cash deposit.
    In,
    /// Manual cash withdrawal (stored negative).
    Out,
    /// Cash flow from a completed sale.
    Sale,
    /// Cash flow from a return.
    Return,
    /// Counted amount at end of session; closes the drawer.
    Close,
}

impl EntryKind {
    /// Stable lowercase label, used for storage and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Start => "start",
            EntryKind::In => "in",
            EntryKind::Out => "out",
            EntryKind::Sale => "sale",
            EntryKind::Return => "return",
            EntryKind::Close => "close",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(EntryKind::Start),
            "in" => Ok(EntryKind::In),
            "out" => Ok(EntryKind::Out),
            "sale" => Ok(EntryKind::Sale),
            "return" => Ok(EntryKind::Return),
            "close" => Ok(EntryKind::Close),
            other => Err(format!("unknown entry kind: {}", other)),
        }
    }
}

/// An immutable movement of cash in a drawer
///
/// `id` is assigned by the entry store on append and is absent until then.
/// `drawer_id` of `None` designates the single default drawer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Option<EntryId>,
    pub drawer_id: Option<DrawerId>,
    pub timestamp: DateTime<Utc>,
    pub kind: EntryKind,
    /// Signed, quantized amount. Negative only for `Out`.
    pub amount: Cash,
    pub description: String,
    pub actor_id: ActorId,
}

impl LedgerEntry {
    fn record(kind: EntryKind, amount: Cash, description: String, actor: ActorId) -> Self {
        Self {
            id: None,
            drawer_id: None,
            timestamp: Utc::now(),
            kind,
            amount,
            description,
            actor_id: actor,
        }
    }

    /// Opening float entry.
    pub fn start(amount: Decimal, description: impl Into<String>, actor: ActorId) -> Self {
        Self::record(EntryKind::Start, Cash::new(amount), description.into(), actor)
    }

    /// Manual deposit entry.
    pub fn cash_in(amount: Decimal, description: impl Into<String>, actor: ActorId) -> Self {
        Self::record(EntryKind::In, Cash::new(amount), description.into(), actor)
    }

    /// Manual withdrawal entry. Quantizes first, then negates, so the stored
    /// magnitude is exact.
    pub fn cash_out(amount: Decimal, description: impl Into<String>, actor: ActorId) -> Self {
        Self::record(EntryKind::Out, -Cash::new(amount), description.into(), actor)
    }

    /// Sale cash-flow entry.
    pub fn sale(amount: Decimal, description: impl Into<String>, actor: ActorId) -> Self {
        Self::record(EntryKind::Sale, Cash::new(amount), description.into(), actor)
    }

    /// Return cash-flow entry.
    pub fn sale_return(amount: Decimal, description: impl Into<String>, actor: ActorId) -> Self {
        Self::record(EntryKind::Return, Cash::new(amount), description.into(), actor)
    }

    /// Closing entry carrying the counted amount (not a difference).
    pub fn close(amount: Decimal, description: impl Into<String>, actor: ActorId) -> Self {
        Self::record(EntryKind::Close, Cash::new(amount), description.into(), actor)
    }

    /// Targets a specific drawer instead of the default one.
    pub fn with_drawer(mut self, drawer: DrawerId) -> Self {
        self.drawer_id = Some(drawer);
        self
    }

    /// Overrides the recording timestamp (pre-persist only; entries are
    /// immutable once appended).
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = at;
        self
    }
}
