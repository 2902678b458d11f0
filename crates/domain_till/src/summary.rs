//! Same-day drawer summary read model

use chrono::{DateTime, Utc};
use serde::Serialize;

use core_kernel::{ActorId, Cash};

use crate::entry::LedgerEntry;

/// Snapshot of a drawer's state and same-day activity
///
/// "For day" fields cover every entry whose timestamp falls on the same
/// local calendar day as the summary's `as_of` instant. `total_out_for_day`
/// is a positive magnitude; the stored negative sign is undone for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawerSummary {
    pub is_open: bool,
    pub current_balance: Cash,
    pub entries_for_day: Vec<LedgerEntry>,
    /// Amount of the day's first `Start` entry, zero if the drawer was not
    /// opened today.
    pub initial_amount_for_day: Cash,
    pub total_in_for_day: Cash,
    pub total_out_for_day: Cash,
    /// When the current session was opened; `None` while closed.
    pub opened_at: Option<DateTime<Utc>>,
    /// Who opened the current session; `None` while closed.
    pub opened_by: Option<ActorId>,
}
