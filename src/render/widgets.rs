//! Dashboard widgets: statistic cards, activity feed, startup detail modal,
//! distribution legend, broadcast history, pagination bar, header and toasts.

use std::fmt::Write;

use super::format::{escape, format_date, format_number, format_percent};
use crate::api::dto::{
    ActivityEntry, BroadcastRecord, ChartData, Settings, StartupDetail, Statistics,
};
use crate::dashboard::pagination::PageWindow;
use crate::notify::Toast;

/// Statistic cards on the dashboard
pub fn stats_cards(stats: &Statistics) -> String {
    let mut html = String::from("<div class=\"stats-grid\">");

    let cards = [
        ("totalUsers", "fa-users", "Foydalanuvchilar", format_number(stats.total_users)),
        ("totalStartups", "fa-rocket", "Startaplar", format_number(stats.total_startups)),
        ("activeStartups", "fa-play", "Faol startaplar", format_number(stats.active_startups)),
        ("newToday", "fa-user-plus", "Bugun yangi", format_number(stats.new_today)),
    ];
    for (id, icon, title, value) in cards {
        let _ = write!(
            html,
            "<div class=\"stat-card\"><div class=\"stat-icon\"><i class=\"fas {icon}\"></i></div>\
             <div class=\"stat-info\"><h3 id=\"{id}\">{value}</h3><p>{title}</p></div></div>"
        );
    }

    let rate = format_percent(stats.activity_rate);
    let width = stats.activity_rate.clamp(0.0, 100.0);
    let _ = write!(
        html,
        "<div class=\"stat-card\"><div class=\"stat-info\"><h3 id=\"activityRate\">{rate}</h3>\
         <p>Faollik darajasi</p></div><div class=\"progress-bar\">\
         <div id=\"activityProgress\" class=\"progress-fill\" style=\"width: {width}%\"></div></div></div>"
    );

    if let Some(trends) = &stats.trends {
        let _ = write!(
            html,
            "<div class=\"stat-trends\"><span id=\"startupTrend\"><i class=\"fas fa-arrow-up\"></i>\
             <span>{startups}</span></span><span id=\"activeStartupCount\">{active} ta</span>\
             <span id=\"newUsersToday\">{today} user</span></div>",
            startups = escape(&trends.startups),
            active = stats.active_startups,
            today = stats.new_today,
        );
    }

    html.push_str("</div>");
    html
}

/// Per-status counts for the statistics page
pub fn status_breakdown(stats: &Statistics) -> String {
    let rows = [
        ("active", "Faol", stats.active_startups),
        ("pending", "Kutilayotgan", stats.pending_startups),
        ("completed", "Yakunlangan", stats.completed_startups),
        ("rejected", "Rad etilgan", stats.rejected_startups),
    ];

    let mut html = String::from("<div class=\"status-breakdown\">");
    for (class, label, count) in rows {
        let _ = write!(
            html,
            "<div class=\"breakdown-item\"><span class=\"status-badge {class}\">{label}</span>\
             <strong>{}</strong></div>",
            format_number(count)
        );
    }
    html.push_str("</div>");
    html
}

/// Activity categories the feed can be narrowed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityFilter {
    #[default]
    All,
    User,
    Startup,
    Message,
    System,
}

impl ActivityFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityFilter::All => "all",
            ActivityFilter::User => "user",
            ActivityFilter::Startup => "startup",
            ActivityFilter::Message => "message",
            ActivityFilter::System => "system",
        }
    }

    pub fn matches(&self, entry: &ActivityEntry) -> bool {
        match self {
            ActivityFilter::All => true,
            other => entry.kind == other.as_str(),
        }
    }
}

impl std::str::FromStr for ActivityFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(ActivityFilter::All),
            "user" => Ok(ActivityFilter::User),
            "startup" => Ok(ActivityFilter::Startup),
            "message" => Ok(ActivityFilter::Message),
            "system" => Ok(ActivityFilter::System),
            other => Err(format!("unknown activity filter: {other}")),
        }
    }
}

/// Font Awesome class for an activity icon tag
pub fn activity_icon(tag: &str) -> &'static str {
    match tag {
        "user" => "fa-user",
        "startup" => "fa-rocket",
        "message" => "fa-envelope",
        "system" => "fa-cog",
        _ => "fa-circle",
    }
}

/// Recent activity list, narrowed by `filter`
pub fn activity_feed(entries: &[ActivityEntry], filter: ActivityFilter) -> String {
    let mut html = String::new();
    for entry in entries.iter().filter(|e| filter.matches(e)) {
        let tag = if entry.icon.is_empty() {
            &entry.kind
        } else {
            &entry.icon
        };
        let _ = write!(
            html,
            "<div class=\"activity-item\"><div class=\"activity-icon\"><i class=\"fas {icon}\"></i></div>\
             <div class=\"activity-content\"><div class=\"activity-text\">{text}</div>\
             <div class=\"activity-time\">{time}</div></div></div>",
            icon = activity_icon(tag),
            text = escape(&entry.description),
            time = escape(&entry.time_ago),
        );
    }

    if html.is_empty() {
        html.push_str(
            "<div class=\"empty-state\"><i class=\"fas fa-history\"></i><p>Faollik yo&#39;q</p></div>",
        );
    }
    html
}

/// Filter buttons above the activity feed
pub fn activity_filter_bar(active: ActivityFilter) -> String {
    let filters = [
        (ActivityFilter::All, "Hammasi"),
        (ActivityFilter::User, "Foydalanuvchilar"),
        (ActivityFilter::Startup, "Startaplar"),
        (ActivityFilter::Message, "Xabarlar"),
        (ActivityFilter::System, "Tizim"),
    ];

    let mut html = String::from("<div class=\"activity-filters\">");
    for (filter, label) in filters {
        let class = if filter == active { " active" } else { "" };
        let _ = write!(
            html,
            "<button class=\"activity-filter-btn{class}\" data-filter=\"{}\">{label}</button>",
            filter.as_str()
        );
    }
    html.push_str("</div>");
    html
}

fn optional_text(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .map(escape)
        .unwrap_or_else(|| "Mavjud emas".to_string())
}

/// Body of the startup detail modal
pub fn startup_detail(startup: &StartupDetail) -> String {
    let mut html = String::from("<div class=\"startup-details\">");
    let _ = write!(
        html,
        "<h4>{name}</h4>\
         <p><strong>Holati:</strong> <span class=\"status-badge {status}\">{status_text}</span></p>\
         <p><strong>Yaratilgan sana:</strong> {created}</p>\
         <p><strong>Boshlangan sana:</strong> {started}</p>\
         <p><strong>Yakunlangan sana:</strong> {ended}</p>",
        name = escape(&startup.name),
        status = startup.status.as_str(),
        status_text = escape(&startup.status_text),
        created = format_date(startup.created_at.as_deref()),
        started = format_date(startup.started_at.as_deref()),
        ended = format_date(startup.ended_at.as_deref()),
    );

    match startup.group_link.as_deref().filter(|l| !l.is_empty()) {
        Some(link) => {
            let link = escape(link);
            let _ = write!(
                html,
                "<p><strong>Guruh havolasi:</strong> <a href=\"{link}\" target=\"_blank\">{link}</a></p>"
            );
        }
        None => html.push_str("<p><strong>Guruh havolasi:</strong> Mavjud emas</p>"),
    }

    let _ = write!(
        html,
        "<div class=\"description-section\"><h5>Tavsif:</h5><p>{}</p></div>",
        escape(&startup.description)
    );

    if let Some(results) = startup.results.as_deref().filter(|r| !r.is_empty()) {
        let _ = write!(
            html,
            "<div class=\"results-section\"><h5>Natijalar:</h5><p>{}</p></div>",
            escape(results)
        );
    }

    if let Some(owner) = &startup.owner {
        let _ = write!(
            html,
            "<div class=\"owner-section\"><h5>Muallif:</h5>\
             <p><strong>Ism:</strong> {first} {last}</p>\
             <p><strong>Telefon:</strong> {phone}</p>\
             <p><strong>Bio:</strong> {bio}</p></div>",
            first = escape(&owner.first_name),
            last = escape(&owner.last_name),
            phone = escape(&owner.phone),
            bio = optional_text(owner.bio.as_deref()),
        );
    }

    html.push_str("</div>");
    html
}

/// Legend next to the distribution doughnut; one row per label
pub fn distribution_legend(data: &ChartData) -> String {
    let Some(dataset) = data.datasets.first() else {
        return String::new();
    };

    let mut html = String::new();
    for (index, label) in data.labels.iter().enumerate() {
        let value = dataset.data.get(index).copied().unwrap_or_default();
        let color = dataset.color_at(index).unwrap_or("#cccccc");
        let _ = write!(
            html,
            "<div class=\"legend-item\"><div class=\"legend-color\" style=\"background-color: {color}\"></div>\
             <div class=\"legend-text\">{label}</div><div class=\"legend-value\">{value}</div></div>",
            color = escape(color),
            label = escape(label),
        );
    }
    html
}

/// General settings form, prefilled; bot fields are read-only
pub fn settings_form(settings: &Settings) -> String {
    format!(
        "<form id=\"generalSettingsForm\">\
         <label for=\"siteName\">Sayt nomi</label>\
         <input id=\"siteName\" name=\"site_name\" value=\"{site_name}\">\
         <label for=\"settingsEmail\">Admin email</label>\
         <input id=\"settingsEmail\" name=\"admin_email\" value=\"{admin_email}\">\
         <label for=\"timezone\">Vaqt zonasi</label>\
         <input id=\"timezone\" name=\"timezone\" value=\"{timezone}\">\
         </form><div class=\"bot-settings\">\
         <p><strong>Bot token:</strong> <span id=\"botToken\">{bot_token}</span></p>\
         <p><strong>Kanal:</strong> <span id=\"channelUsername\">{channel}</span></p>\
         <p><strong>Bot holati:</strong> <span id=\"botStatus\">{bot_status}</span></p></div>",
        site_name = escape(&settings.site_name),
        admin_email = escape(&settings.admin_email),
        timezone = escape(&settings.timezone),
        bot_token = optional_text(settings.bot_token.as_deref()),
        channel = optional_text(settings.channel_username.as_deref()),
        bot_status = optional_text(settings.bot_status.as_deref()),
    )
}

fn recipient_label(recipient_type: &str) -> &str {
    if recipient_type == "all" {
        "Barcha"
    } else {
        recipient_type
    }
}

/// Sent broadcasts, newest first
pub fn broadcast_history<'a>(history: impl IntoIterator<Item = &'a BroadcastRecord>) -> String {
    let mut html = String::new();
    for record in history {
        let _ = write!(
            html,
            "<div class=\"history-item\"><div class=\"history-message\">{message}</div>\
             <div class=\"history-meta\"><span>{sent_at}</span><span>•</span><span>{recipients}</span>\
             <span>•</span><span>{sent_by}</span></div></div>",
            message = escape(&record.message),
            sent_at = format_date(record.sent_at.as_deref()),
            recipients = escape(recipient_label(&record.recipient_type)),
            sent_by = escape(record.sent_by.as_deref().unwrap_or_default()),
        );
    }
    html
}

/// Prev, numbered window, next
pub fn pagination_bar(window: &PageWindow) -> String {
    let disabled = |d: bool| if d { " disabled" } else { "" };

    let mut html = format!(
        "<button class=\"pagination-btn\" data-page=\"{prev}\"{attr}><i class=\"fas fa-chevron-left\"></i></button>\
         <div class=\"page-numbers\">",
        prev = window.page.saturating_sub(1),
        attr = disabled(window.prev_disabled()),
    );
    for page in window.pages() {
        let active = if page == window.page { " active" } else { "" };
        let _ = write!(
            html,
            "<button class=\"pagination-btn{active}\" data-page=\"{page}\">{page}</button>"
        );
    }
    let _ = write!(
        html,
        "</div><button class=\"pagination-btn\" data-page=\"{next}\"{attr}><i class=\"fas fa-chevron-right\"></i></button>",
        next = window.page + 1,
        attr = disabled(window.next_disabled()),
    );
    html
}

/// Header block: name, e-mail and avatar
pub fn user_info(name: &str, email: &str, avatar_url: &str) -> String {
    format!(
        "<div class=\"admin-info\"><img id=\"adminAvatar\" src=\"{avatar}\" alt=\"{name}\">\
         <div><div id=\"adminName\">{name}</div><div id=\"adminEmail\">{email}</div></div></div>",
        avatar = escape(avatar_url),
        name = escape(name),
        email = escape(email),
    )
}

/// Visible toasts, newest on top
pub fn toast_stack(toasts: &[Toast]) -> String {
    let mut html = String::from("<div class=\"toast-container\">");
    for toast in toasts {
        let _ = write!(
            html,
            "<div class=\"toast toast-{kind}\" data-toast-id=\"{id}\" style=\"background-color: {color}\">\
             <span class=\"toast-icon\">{icon}</span><span class=\"toast-message\">{message}</span></div>",
            kind = toast.kind.as_str(),
            id = toast.id,
            color = toast.kind.color(),
            icon = toast.kind.icon(),
            message = escape(&toast.message),
        );
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::dto::{Dataset, StartupOwner, StartupStatus, Trends};
    use crate::notify::{NotificationCenter, ToastConfig};
    use serde_json::json;

    fn activity(kind: &str, icon: &str, description: &str) -> ActivityEntry {
        ActivityEntry {
            id: json!(1),
            kind: kind.to_string(),
            action: "created".to_string(),
            description: description.to_string(),
            time_ago: "5 daqiqa oldin".to_string(),
            icon: icon.to_string(),
        }
    }

    #[test]
    fn test_stats_cards() {
        let stats = Statistics {
            total_users: 1250,
            total_startups: 45,
            active_startups: 18,
            new_today: 12,
            activity_rate: 75.0,
            trends: Some(Trends {
                users: "+12%".to_string(),
                startups: "+5%".to_string(),
                active: "+8%".to_string(),
            }),
            ..Default::default()
        };

        let html = stats_cards(&stats);
        assert!(html.contains("<h3 id=\"totalUsers\">1,250</h3>"));
        assert!(html.contains("<h3 id=\"activityRate\">75%</h3>"));
        assert!(html.contains("width: 75%"));
        assert!(html.contains("<span>+5%</span>"));
        assert!(html.contains("18 ta"));
    }

    #[test]
    fn test_activity_icons_and_filter() {
        let entries = vec![
            activity("user", "user", "Yangi foydalanuvchi"),
            activity("startup", "startup", "Yangi startap"),
            activity("system", "unknown", "Backup"),
        ];

        let all = activity_feed(&entries, ActivityFilter::All);
        assert_eq!(all.matches("activity-item").count(), 3);
        assert!(all.contains("fa-user"));
        assert!(all.contains("fa-rocket"));
        assert!(all.contains("fa-circle"));

        let startups = activity_feed(&entries, ActivityFilter::Startup);
        assert_eq!(startups.matches("activity-item").count(), 1);
        assert!(startups.contains("Yangi startap"));

        let messages = activity_feed(&entries, ActivityFilter::Message);
        assert!(messages.contains("Faollik yo&#39;q"));
    }

    #[test]
    fn test_activity_filter_bar_marks_active() {
        let html = activity_filter_bar(ActivityFilter::Message);
        assert!(html.contains("activity-filter-btn active\" data-filter=\"message\""));
        assert_eq!(html.matches(" active\"").count(), 1);
        assert_eq!("system".parse::<ActivityFilter>(), Ok(ActivityFilter::System));
    }

    #[test]
    fn test_startup_detail() {
        let detail = StartupDetail {
            id: "abc".to_string(),
            name: "Food Delivery App".to_string(),
            description: "Oziq-ovqat yetkazib berish".to_string(),
            status: StartupStatus::Active,
            status_text: "Faol".to_string(),
            created_at: Some("2024-01-10T08:00:00".to_string()),
            started_at: None,
            ended_at: None,
            results: None,
            group_link: Some("https://t.me/food".to_string()),
            owner: Some(StartupOwner {
                first_name: "Ali".to_string(),
                last_name: "Valiyev".to_string(),
                phone: "+998901234567".to_string(),
                username: "ali".to_string(),
                bio: None,
            }),
        };

        let html = startup_detail(&detail);
        assert!(html.contains("<h4>Food Delivery App</h4>"));
        assert!(html.contains("10/01/2024, 08:00"));
        assert!(html.contains("<strong>Boshlangan sana:</strong> Noma'lum"));
        assert!(html.contains("href=\"https://t.me/food\""));
        assert!(html.contains("<strong>Bio:</strong> Mavjud emas"));
        assert!(!html.contains("Natijalar"));
    }

    #[test]
    fn test_distribution_legend() {
        let data = ChartData {
            labels: vec!["Faol".to_string(), "Kutilayotgan".to_string()],
            datasets: vec![Dataset {
                data: vec![18.0, 8.0],
                background_color: json!(["#000000", "#666666"]),
                ..Default::default()
            }],
        };

        let html = distribution_legend(&data);
        assert_eq!(html.matches("legend-item").count(), 2);
        assert!(html.contains("background-color: #666666"));
        assert!(html.contains("<div class=\"legend-value\">8</div>"));
        assert!(distribution_legend(&ChartData::default()).is_empty());
    }

    #[test]
    fn test_broadcast_history() {
        let record = BroadcastRecord {
            id: "1".to_string(),
            message: "Salom".to_string(),
            recipient_type: "all".to_string(),
            sent_at: Some("2024-01-15T10:00:00".to_string()),
            sent_by: Some("admin".to_string()),
            sent_count: 1250,
        };

        let html = broadcast_history([&record]);
        assert!(html.contains("<span>Barcha</span>"));
        assert!(html.contains("15/01/2024, 10:00"));
    }

    #[test]
    fn test_pagination_bar() {
        let html = pagination_bar(&PageWindow::new(1, 3));
        assert!(html.starts_with("<button class=\"pagination-btn\" data-page=\"0\" disabled>"));
        assert!(html.contains("pagination-btn active\" data-page=\"1\""));
        assert_eq!(html.matches("disabled").count(), 1);

        let empty = pagination_bar(&PageWindow::new(1, 0));
        assert_eq!(empty.matches("disabled").count(), 2);
    }

    #[test]
    fn test_settings_form() {
        let html = settings_form(&Settings {
            site_name: "GarajHub".to_string(),
            admin_email: "admin@garajhub.uz".to_string(),
            timezone: "Asia/Tashkent".to_string(),
            bot_token: Some("12345:ABC".to_string()),
            channel_username: None,
            bot_status: Some("active".to_string()),
        });
        assert!(html.contains("name=\"site_name\" value=\"GarajHub\""));
        assert!(html.contains("<span id=\"channelUsername\">Mavjud emas</span>"));
    }

    #[test]
    fn test_toast_stack_escapes_and_colors() {
        let center = NotificationCenter::new(ToastConfig::default());
        center.error("<b>Server xatosi</b>");

        let html = toast_stack(&center.active());
        assert!(html.contains("background-color: #ff4444"));
        assert!(html.contains("&lt;b&gt;"));
    }
}
