//! Notification fan-out and outbound email
//!
//! Both collaborators here are best-effort by contract: they return errors,
//! and the workflow layers log and ignore them. A failed email or
//! notification row never fails or retries a committed status transition.

mod email;
pub mod templates;

pub use email::{EmailError, EmailMessage, EmailSender, HttpEmailSender};

use sqlx::PgPool;
use sqlx::types::chrono::Utc;
use uuid::Uuid;

/// Writes one notification row per recipient.
///
/// Delivery and read tracking belong to the portal UI; this side only
/// produces rows.
#[derive(Clone)]
pub struct Notifier {
    db_pool: PgPool,
}

impl Notifier {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Insert a notification for a single recipient.
    pub async fn notify(
        &self,
        recipient_id: Uuid,
        title: &str,
        body: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_id, title, body, read, created_at)
            VALUES ($1, $2, $3, $4, FALSE, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recipient_id)
        .bind(title)
        .bind(body)
        .bind(Utc::now())
        .execute(&self.db_pool)
        .await?;

        Ok(())
    }

    /// Fan a notification out to several recipients, one row each.
    ///
    /// Rows are independent writes; a failure for one recipient is logged and
    /// does not stop the rest.
    pub async fn notify_all(&self, recipient_ids: &[Uuid], title: &str, body: &str) {
        for recipient_id in recipient_ids {
            if let Err(e) = self.notify(*recipient_id, title, body).await {
                tracing::warn!(
                    recipient = %recipient_id,
                    error = %e,
                    "Failed to write notification row"
                );
            }
        }
    }

    /// All admin member ids, for admin-facing fan-outs.
    pub async fn admin_recipients(&self) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM members WHERE role = 'admin'")
            .fetch_all(&self.db_pool)
            .await?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
