//! Action Dispatchers
//!
//! Mutating operations. Destructive ones ask [`Confirm`] first and send
//! nothing when declined. Every dispatch issues exactly one request; on
//! success the affected section is reloaded.

use std::future::Future;

use super::{Dashboard, Outcome, SERVER_ERROR};
use crate::api::dto::{id_text, BroadcastRequest, Envelope, NewAdmin, SettingsUpdate};
use crate::api::{ClientError, ClientResult};
use crate::render::widgets;
use crate::state::Modal;

pub const APPROVE_PROMPT: &str = "Startapni tasdiqlaysizmi?";
pub const APPROVE_SUCCESS: &str = "Startap tasdiqlandi";
pub const APPROVE_FAILED: &str = "Tasdiqlash xatosi";

pub const REJECT_PROMPT: &str = "Startapni rad etasizmi?";
pub const REJECT_SUCCESS: &str = "Startap rad etildi";
pub const REJECT_FAILED: &str = "Rad etish xatosi";

pub const DELETE_ADMIN_PROMPT: &str = "Adminni o'chirasizmi?";
pub const DELETE_ADMIN_SUCCESS: &str = "Admin o'chirildi";
pub const DELETE_ADMIN_FAILED: &str = "Adminni o'chirish xatosi";
pub const DELETE_SELF_REFUSED: &str = "O'zingizni o'chira olmaysiz";

pub const ADD_ADMIN_SUCCESS: &str = "Admin qo'shildi";
pub const ADD_ADMIN_FAILED: &str = "Admin qo'shish xatosi";
pub const FIELDS_REQUIRED: &str = "Barcha maydonlarni to'ldiring";

pub const BACKUP_PROMPT: &str = "Backup yaratilsinmi?";
pub const BACKUP_SUCCESS: &str = "Backup muvaffaqiyatli yaratildi";
pub const BACKUP_FAILED: &str = "Backup yaratish xatosi";
pub const DELETE_BACKUP_PROMPT: &str = "Backupni o'chirasizmi?";
pub const DELETE_BACKUP_SUCCESS: &str = "Backup o'chirildi";
pub const DELETE_BACKUP_FAILED: &str = "Backupni o'chirish xatosi";
pub const DOWNLOAD_BACKUP_FAILED: &str = "Backupni yuklab olish xatosi";

pub const SETTINGS_SUCCESS: &str = "Sozlamalar saqlandi";
pub const SETTINGS_FAILED: &str = "Sozlamalarni saqlash xatosi";

pub const BROADCAST_SUCCESS: &str = "Xabar yuborildi";
pub const BROADCAST_FAILED: &str = "Xabar yuborish xatosi";
pub const BROADCAST_EMPTY: &str = "Xabar matnini kiriting";

/// Yes/no confirmation dialog
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything (`--yes`, headless use)
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

impl Dashboard {
    /// Ask for confirmation, send one request and toast the result
    async fn dispatch<T>(
        &self,
        prompt: Option<&str>,
        success: &str,
        failure: &str,
        request: impl Future<Output = ClientResult<Envelope<T>>>,
    ) -> Result<Envelope<T>, Outcome> {
        if let Some(prompt) = prompt {
            if !self.confirm.confirm(prompt) {
                tracing::debug!(prompt, "action declined");
                return Err(Outcome::Declined);
            }
        }

        match request.await {
            Ok(envelope) if envelope.success => {
                self.notifications.success(success);
                Ok(envelope)
            }
            Ok(envelope) => {
                let message = envelope.error_or(failure).to_string();
                self.notifications.error(message.clone());
                Err(Outcome::Rejected(message))
            }
            Err(e) => {
                tracing::error!("{}: {}", failure, e);
                self.notifications.error(SERVER_ERROR);
                Err(Outcome::Unreachable)
            }
        }
    }

    // ---- startups -----------------------------------------------------------

    pub async fn approve_startup(&self, id: &str) -> Outcome {
        let sent = self
            .dispatch(
                Some(APPROVE_PROMPT),
                APPROVE_SUCCESS,
                APPROVE_FAILED,
                self.api.approve_startup(id),
            )
            .await;
        self.after_review(sent).await
    }

    pub async fn reject_startup(&self, id: &str) -> Outcome {
        let sent = self
            .dispatch(
                Some(REJECT_PROMPT),
                REJECT_SUCCESS,
                REJECT_FAILED,
                self.api.reject_startup(id),
            )
            .await;
        self.after_review(sent).await
    }

    async fn after_review<T>(&self, sent: Result<Envelope<T>, Outcome>) -> Outcome {
        match sent {
            Ok(_) => {
                let page = self.startups_page();
                self.load_startups(page).await;
                Outcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    // ---- admins -------------------------------------------------------------

    pub fn open_add_admin_modal(&self) {
        self.lock().set_modal(Some(Modal::AddAdmin));
    }

    pub async fn add_admin(&self, admin: &NewAdmin) -> Outcome {
        if admin.username.trim().is_empty() || admin.password.is_empty() {
            self.notifications.warning(FIELDS_REQUIRED);
            return Outcome::Refused;
        }

        let sent = self
            .dispatch(
                None,
                ADD_ADMIN_SUCCESS,
                ADD_ADMIN_FAILED,
                self.api.create_admin(admin),
            )
            .await;
        match sent {
            Ok(_) => {
                self.close_modal();
                self.load_admins().await;
                Outcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    /// Delete an admin account. The signed-in admin's own row is refused
    /// without contacting the backend.
    pub async fn delete_admin(&self, id: &str) -> Outcome {
        let is_self = {
            let state = self.lock();
            let own = state.session().map(|identity| identity.username.as_str());
            state
                .admins()
                .iter()
                .any(|admin| id_text(&admin.id) == id && Some(admin.username.as_str()) == own)
        };
        if is_self {
            self.notifications.warning(DELETE_SELF_REFUSED);
            return Outcome::Refused;
        }

        let sent = self
            .dispatch(
                Some(DELETE_ADMIN_PROMPT),
                DELETE_ADMIN_SUCCESS,
                DELETE_ADMIN_FAILED,
                self.api.delete_admin(id),
            )
            .await;
        match sent {
            Ok(_) => {
                self.load_admins().await;
                Outcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    // ---- backups ------------------------------------------------------------

    pub async fn create_backup(&self) -> Outcome {
        let sent = self
            .dispatch(
                Some(BACKUP_PROMPT),
                BACKUP_SUCCESS,
                BACKUP_FAILED,
                self.api.create_backup(),
            )
            .await;
        match sent {
            Ok(_) => {
                self.load_backups().await;
                Outcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    pub async fn delete_backup(&self, id: &str) -> Outcome {
        let sent = self
            .dispatch(
                Some(DELETE_BACKUP_PROMPT),
                DELETE_BACKUP_SUCCESS,
                DELETE_BACKUP_FAILED,
                self.api.delete_backup(id),
            )
            .await;
        match sent {
            Ok(_) => {
                self.load_backups().await;
                Outcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    /// Backup file contents, or `None` after an error toast
    pub async fn download_backup(&self, filename: &str) -> Option<Vec<u8>> {
        match self.api.download_backup(filename).await {
            Ok(bytes) => {
                tracing::info!(filename, bytes = bytes.len(), "backup downloaded");
                Some(bytes)
            }
            Err(ClientError::Status { status, message }) => {
                tracing::warn!(filename, status, "backup download refused: {}", message);
                let message = if message.is_empty() {
                    DOWNLOAD_BACKUP_FAILED.to_string()
                } else {
                    message
                };
                self.notifications.error(message);
                None
            }
            Err(e) => {
                tracing::error!("{}: {}", DOWNLOAD_BACKUP_FAILED, e);
                self.notifications.error(SERVER_ERROR);
                None
            }
        }
    }

    // ---- settings and broadcast ---------------------------------------------

    pub async fn save_settings(&self, settings: &SettingsUpdate) -> Outcome {
        let sent = self
            .dispatch(
                None,
                SETTINGS_SUCCESS,
                SETTINGS_FAILED,
                self.api.save_settings(settings),
            )
            .await;
        match sent {
            Ok(_) => Outcome::Applied,
            Err(outcome) => outcome,
        }
    }

    /// Send a message to bot users; the returned record heads the history
    pub async fn broadcast(&self, message: &str, recipient_type: &str) -> Outcome {
        if message.trim().is_empty() {
            self.notifications.warning(BROADCAST_EMPTY);
            return Outcome::Refused;
        }

        let request = BroadcastRequest {
            message: message.to_string(),
            recipient_type: recipient_type.to_string(),
        };
        let sent = self
            .dispatch(
                None,
                BROADCAST_SUCCESS,
                BROADCAST_FAILED,
                self.api.broadcast(&request),
            )
            .await;

        match sent {
            Ok(envelope) => {
                if let Some(record) = envelope.data {
                    self.lock().push_broadcast(record);
                }
                Outcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    pub fn broadcast_history_markup(&self) -> String {
        let state = self.lock();
        widgets::broadcast_history(state.broadcasts())
    }
}
