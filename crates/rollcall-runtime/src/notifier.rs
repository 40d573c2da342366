//! Report formatting and delivery to conversation administrators.

use std::collections::BTreeSet;
use std::sync::Arc;

use rollcall_core::ConversationId;
use tracing::{debug, warn};

use crate::errors::Result;
use crate::traits::ChatTransport;

/// Line introducing the list of denied members.
pub const REPORT_INTRO: &str = "Please, check this users for access:";

/// Build the report sent to one administrator.
///
/// Handles are numbered from 1 in sorted order.
#[must_use]
pub fn format_report(admin_name: &str, denied: &BTreeSet<String>) -> String {
    let mut text = format!("Hello, {admin_name}. {REPORT_INTRO}");
    for (i, handle) in denied.iter().enumerate() {
        text.push_str(&format!("\n{}. {handle}", i + 1));
    }
    text
}

/// Per-report delivery counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliverySummary {
    /// Administrators that received the report.
    pub delivered: usize,
    /// Administrators whose delivery failed.
    pub failed: usize,
    /// Bot administrators skipped.
    pub skipped_bots: usize,
}

/// Delivers denied-member reports to every human administrator.
pub struct NotificationDispatcher {
    transport: Arc<dyn ChatTransport>,
}

impl NotificationDispatcher {
    /// Create a dispatcher sending through `transport`.
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        Self { transport }
    }

    /// Send one report per non-bot administrator of `id`.
    ///
    /// Failing to list administrators is an error. A failed delivery to one
    /// administrator is logged and counted; the others still receive theirs.
    pub async fn notify(
        &self,
        id: ConversationId,
        denied: &BTreeSet<String>,
    ) -> Result<DeliverySummary> {
        let admins = self.transport.list_administrators(id).await?;
        let mut summary = DeliverySummary::default();

        for admin in admins {
            if admin.is_bot {
                summary.skipped_bots += 1;
                continue;
            }
            let text = format_report(admin.display_name(), denied);
            match self.transport.send_direct_message(admin.user_id, &text).await {
                Ok(()) => {
                    debug!(chat_id = id.get(), admin_id = admin.user_id.get(), "report delivered");
                    summary.delivered += 1;
                }
                Err(e) => {
                    warn!(
                        chat_id = id.get(),
                        admin_id = admin.user_id.get(),
                        error = %e,
                        "report delivery failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        Ok(summary)
    }
}
