//! Table Renderers
//!
//! Users, startups, admins and backups. Each renderer maps the latest
//! fetched collection to the full table body; an empty collection renders
//! an explicit placeholder row.

use std::fmt::Write;

use super::format::{escape, format_date};
use crate::api::dto::{
    id_text, AdminRecord, BackupRecord, StartupRecord, StartupStatus, UserRecord, UserStatus,
};

const TABLE_COLUMNS: usize = 7;

fn empty_row(icon: &str, text: &str) -> String {
    format!(
        "<tr class=\"empty-row\"><td colspan=\"{TABLE_COLUMNS}\">\
         <div class=\"empty-state\"><i class=\"fas {icon}\"></i><p>{text}</p></div>\
         </td></tr>",
        text = escape(text),
    )
}

fn action_button(action: &str, id: &str, icon: &str, class: &str, title: &str) -> String {
    format!(
        "<button class=\"action-btn {class}\" data-action=\"{action}\" data-id=\"{id}\" title=\"{title}\">\
         <i class=\"fas {icon}\"></i></button>",
        id = escape(id),
        title = escape(title),
    )
}

/// Users table body
pub fn users_table(users: &[UserRecord]) -> String {
    if users.is_empty() {
        return empty_row("fa-users", "Foydalanuvchilar topilmadi");
    }

    let mut html = String::new();
    for user in users {
        let (status_class, status_label) = match user.status {
            UserStatus::Active => ("active", "Faol"),
            UserStatus::Inactive => ("inactive", "Faol emas"),
        };

        let _ = write!(
            html,
            "<tr><td>{id}</td><td>{first}</td><td>{last}</td><td>{phone}</td><td>{joined}</td>\
             <td><span class=\"status-badge {status_class}\">{status_label}</span></td>\
             <td><div class=\"table-actions\">{view}{edit}{delete}</div></td></tr>",
            id = escape(&user.id),
            first = escape(&user.first_name),
            last = escape(&user.last_name),
            phone = escape(&user.phone),
            joined = format_date(user.joined_at.as_deref()),
            view = action_button("view-user", &user.id, "fa-eye", "view-btn", "Ko'rish"),
            edit = action_button("edit-user", &user.id, "fa-edit", "edit-btn", "Tahrirlash"),
            delete = action_button("delete-user", &user.id, "fa-trash", "delete-btn", "O'chirish"),
        );
    }
    html
}

/// First 8 characters of a startup id, ellipsised
pub fn short_id(id: &str) -> String {
    let short: String = id.chars().take(8).collect();
    format!("{short}...")
}

/// Startups table body; approve/reject only on pending rows
pub fn startups_table(startups: &[StartupRecord]) -> String {
    if startups.is_empty() {
        return empty_row("fa-rocket", "Startaplar topilmadi");
    }

    let mut html = String::new();
    for startup in startups {
        let review = if startup.status == StartupStatus::Pending {
            format!(
                "{}{}",
                action_button("approve-startup", &startup.id, "fa-check", "edit-btn", "Tasdiqlash"),
                action_button("reject-startup", &startup.id, "fa-times", "delete-btn", "Rad etish"),
            )
        } else {
            String::new()
        };

        let _ = write!(
            html,
            "<tr><td>{short}</td><td><strong>{name}</strong></td><td>{owner}</td>\
             <td><span class=\"status-badge {status}\">{status_text}</span></td>\
             <td>{created}</td><td>{members}</td>\
             <td><div class=\"table-actions\">{view}{review}</div></td></tr>",
            short = escape(&short_id(&startup.id)),
            name = escape(&startup.name),
            owner = escape(&startup.owner_name),
            status = startup.status.as_str(),
            status_text = escape(&startup.status_text),
            created = format_date(startup.created_at.as_deref()),
            members = startup.member_count,
            view = action_button("view-startup", &startup.id, "fa-eye", "view-btn", "Ko'rish"),
        );
    }
    html
}

/// Admins table body; no delete affordance on the signed-in admin's row
pub fn admins_table(admins: &[AdminRecord], current_handle: Option<&str>) -> String {
    if admins.is_empty() {
        return empty_row("fa-user-shield", "Adminlar topilmadi");
    }

    let mut html = String::new();
    for admin in admins {
        let id = id_text(&admin.id);
        let delete = if Some(admin.username.as_str()) == current_handle {
            String::new()
        } else {
            action_button("delete-admin", &id, "fa-trash", "delete-btn", "O'chirish")
        };

        let _ = write!(
            html,
            "<tr><td>{id}</td><td><strong>{username}</strong></td><td>{full_name}</td>\
             <td>{email}</td><td><span class=\"status-badge {role}\">{role}</span></td>\
             <td>{last_login}</td><td><div class=\"table-actions\">{delete}</div></td></tr>",
            id = escape(&id),
            username = escape(&admin.username),
            full_name = escape(&admin.full_name),
            email = escape(&admin.email),
            role = escape(&admin.role),
            last_login = format_date(admin.last_login.as_deref()),
        );
    }
    html
}

/// Backup history list
pub fn backups_list(backups: &[BackupRecord]) -> String {
    let mut html = String::from("<h3>Backup tarixi</h3>");
    if backups.is_empty() {
        html.push_str(
            "<div class=\"empty-state\"><i class=\"fas fa-database\"></i><p>Backuplar yo'q</p></div>",
        );
        return html;
    }

    for backup in backups {
        let id = id_text(&backup.id);
        let _ = write!(
            html,
            "<div class=\"backup-item\"><div class=\"backup-info\"><strong>{filename}</strong>\
             <span>{size} • {created}</span></div><div class=\"backup-actions\">{download}{delete}</div></div>",
            filename = escape(&backup.filename),
            size = escape(&backup.size),
            created = format_date(backup.created_at.as_deref()),
            download = action_button("download-backup", &backup.filename, "fa-download", "", "Yuklab olish"),
            delete = action_button("delete-backup", &id, "fa-trash", "delete-btn", "O'chirish"),
        );
    }
    html
}
