use chrono::Utc;

use super::super::{PageContext, checked, datetime_input_value, e, format_time, layout, selected};
use super::post_button;
use crate::services::{Dashboard, DomainOption, UrlRow};
use crate::utils::TimeParser;

fn domain_select(domains: &[DomainOption], current: i32) -> String {
    let options: String = domains
        .iter()
        .map(|d| {
            format!(
                r#"<option value="{}"{}>{}</option>"#,
                d.id,
                selected(d.id == current),
                e(&d.name)
            )
        })
        .collect();
    format!(r#"<select name="domain_id">{}</select>"#, options)
}

fn quota_line(dashboard: &Dashboard) -> String {
    if dashboard.is_superadmin || dashboard.quota == 0 {
        format!("{} short URLs (unlimited)", dashboard.url_count)
    } else {
        format!("{} / {} short URLs used", dashboard.url_count, dashboard.quota)
    }
}

fn expiry_cell(row: &UrlRow) -> String {
    match row.url.expiry_date {
        None => "Never".to_string(),
        Some(expiry) => {
            let now = Utc::now();
            let status = if expiry <= now {
                r#"<span class="badge badge-expired">expired</span>"#.to_string()
            } else {
                format!(
                    r#"<span class="muted">in {}</span>"#,
                    TimeParser::format_duration_human(now, expiry)
                )
            };
            let auto = if row.url.auto_delete {
                r#" <span class="badge">auto-delete</span>"#
            } else {
                ""
            };
            format!("{}<br>{}{}", format_time(&expiry), status, auto)
        }
    }
}

/// 编辑时保留链接当前所在的域名，即使该域名已不再分配给用户
fn edit_domains(row: &UrlRow, domains: &[DomainOption]) -> Vec<DomainOption> {
    let mut options = domains.to_vec();
    if !options.iter().any(|d| d.id == row.url.domain_id) {
        options.insert(
            0,
            DomainOption {
                id: row.url.domain_id,
                name: row.domain_name.clone(),
            },
        );
    }
    options
}

fn url_form(action: &str, row: Option<&UrlRow>, domains: &[DomainOption]) -> String {
    let (id_field, original, code, passcode, expiry, domain_id, auto_delete, submit) = match row {
        Some(row) => (
            format!(r#"<input type="hidden" name="id" value="{}">"#, row.url.id),
            e(&row.url.original_url),
            e(&row.url.short_code),
            e(row.url.passcode.as_deref().unwrap_or_default()),
            datetime_input_value(row.url.expiry_date.as_ref()),
            row.url.domain_id,
            row.url.auto_delete,
            "Save",
        ),
        None => (
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            domains.first().map(|d| d.id).unwrap_or_default(),
            false,
            "Create",
        ),
    };

    format!(
        r#"<form method="post" action="{action}" class="url-form">{id_field}
<label>Original URL<input type="url" name="original_url" value="{original}" placeholder="https://example.com/long/path" required></label>
<label>Domain{domain_select}</label>
<label>Short code<input type="text" name="short_code" value="{code}" placeholder="random if empty" pattern="[A-Za-z0-9_-]+"></label>
<label>Passcode<input type="text" name="passcode" value="{passcode}" placeholder="optional" autocomplete="off"></label>
<label>Expires<input type="datetime-local" name="expiry_date" value="{expiry}"></label>
<label class="checkbox"><input type="checkbox" name="auto_delete"{auto_delete}> Delete when expired</label>
<button type="submit">{submit}</button>
</form>"#,
        action = action,
        id_field = id_field,
        original = original,
        domain_select = domain_select(domains, domain_id),
        code = code,
        passcode = passcode,
        expiry = expiry,
        auto_delete = checked(auto_delete),
        submit = submit,
    )
}

fn url_row(row: &UrlRow, dashboard: &Dashboard) -> String {
    let owner = if dashboard.is_superadmin {
        format!("<td>{}</td>", e(&row.owner))
    } else {
        String::new()
    };
    let lock = if row.url.has_passcode() {
        r#" <span class="badge" title="Passcode protected">passcode</span>"#
    } else {
        ""
    };
    format!(
        r#"<tr>
<td><a href="{link}" target="_blank" rel="noopener">{link}</a>{lock}</td>
<td class="truncate"><a href="{original}" target="_blank" rel="noopener noreferrer">{original}</a></td>
{owner}<td>{clicks}</td>
<td>{created}</td>
<td>{expiry}</td>
<td class="actions"><details><summary>Edit</summary>{edit_form}</details>{delete}</td>
</tr>"#,
        link = e(&row.short_link),
        lock = lock,
        original = e(&row.url.original_url),
        owner = owner,
        clicks = row.url.clicks,
        created = format_time(&row.url.created_at),
        expiry = expiry_cell(row),
        edit_form = url_form(
            "/admin/urls/edit",
            Some(row),
            &edit_domains(row, &dashboard.domains)
        ),
        delete = post_button(
            "/admin/urls/delete",
            row.url.id,
            "Delete",
            "Delete this short URL?",
            "danger"
        ),
    )
}

fn profile_form(ctx: &PageContext<'_>) -> String {
    let username = ctx.user.map(|u| e(&u.username)).unwrap_or_default();
    format!(
        r#"<section class="card">
<details><summary>Profile</summary>
<form method="post" action="/admin/profile/update">
<label>Username<input type="text" name="username" value="{username}"></label>
<label>New password<input type="password" name="newPassword" autocomplete="new-password" placeholder="leave empty to keep"></label>
<label>Confirm new password<input type="password" name="confirmPassword" autocomplete="new-password"></label>
<label>Current password<input type="password" name="currentPassword" autocomplete="current-password" required></label>
<button type="submit">Update profile</button>
</form>
</details>
</section>"#,
        username = username,
    )
}

pub fn render(ctx: &PageContext<'_>, dashboard: &Dashboard) -> String {
    let owner_header = if dashboard.is_superadmin { "<th>Owner</th>" } else { "" };
    let rows: String = if dashboard.urls.is_empty() {
        let cols = if dashboard.is_superadmin { 7 } else { 6 };
        format!(r#"<tr><td colspan="{}" class="muted">No short URLs yet.</td></tr>"#, cols)
    } else {
        dashboard.urls.iter().map(|r| url_row(r, dashboard)).collect()
    };

    layout(
        ctx,
        &format!(
            r#"<h1>Dashboard</h1>
<p class="muted">{quota}</p>
<section class="card">
<h2>New short URL</h2>
{add_form}
</section>
<section class="card">
<h2>Short URLs</h2>
<table>
<thead><tr><th>Short link</th><th>Original URL</th>{owner_header}<th>Clicks</th><th>Created</th><th>Expires</th><th></th></tr></thead>
<tbody>
{rows}
</tbody>
</table>
</section>
{profile}"#,
            quota = quota_line(dashboard),
            add_form = url_form("/admin/urls/add", None, &dashboard.domains),
            owner_header = owner_header,
            rows = rows,
            profile = profile_form(ctx),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::CurrentUser;
    use crate::storage::{Role, ShortUrl};
    use chrono::Duration;

    fn row(owner: &str, expired: bool) -> UrlRow {
        let now = Utc::now();
        UrlRow {
            url: ShortUrl {
                id: 7,
                original_url: "https://example.com/?a=1&b=2".into(),
                short_code: "abc".into(),
                passcode: Some("pw".into()),
                clicks: 3,
                created_at: now,
                expiry_date: Some(if expired { now - Duration::hours(1) } else { now + Duration::days(2) }),
                user_id: 1,
                domain_id: 0,
                auto_delete: true,
            },
            owner: owner.into(),
            domain_name: "localhost".into(),
            short_link: "http://localhost:3000/abc".into(),
        }
    }

    fn dashboard(is_superadmin: bool, urls: Vec<UrlRow>) -> Dashboard {
        Dashboard {
            urls,
            domains: vec![
                DomainOption { id: 0, name: "localhost".into() },
                DomainOption { id: 3, name: "go.example.com".into() },
            ],
            quota: 5,
            url_count: 1,
            is_superadmin,
        }
    }

    fn render_for(role: Role, data: &Dashboard) -> String {
        let user = CurrentUser { id: 1, username: "alice".into(), role };
        render(
            &PageContext { site_name: "Links", title: "Dashboard", user: Some(&user), flashes: &[] },
            data,
        )
    }

    #[test]
    fn test_user_dashboard_shows_quota_without_owner_column() {
        let data = dashboard(false, vec![row("alice", false)]);
        let html = render_for(Role::User, &data);
        assert!(html.contains("1 / 5 short URLs used"));
        assert!(!html.contains("<th>Owner</th>"));
        assert!(html.contains("https://example.com/?a=1&amp;b=2"));
        assert!(html.contains("go.example.com"));
        assert!(html.contains("passcode"));
    }

    #[test]
    fn test_superadmin_dashboard_lists_owners() {
        let data = dashboard(true, vec![row("bob", true)]);
        let html = render_for(Role::SuperAdmin, &data);
        assert!(html.contains("<th>Owner</th>"));
        assert!(html.contains("<td>bob</td>"));
        assert!(html.contains("unlimited"));
        assert!(html.contains("badge-expired"));
    }

    #[test]
    fn test_edit_form_keeps_unassigned_current_domain() {
        let mut url = row("alice", false);
        url.url.domain_id = 9;
        url.domain_name = "old.example.com".into();
        let data = dashboard(false, vec![url]);
        let html = render_for(Role::User, &data);
        assert!(html.contains(r#"<option value="9" selected>old.example.com</option>"#));
        // 新建表单不提供未分配的域名
        assert_eq!(html.matches("old.example.com").count(), 1);
    }

    #[test]
    fn test_empty_dashboard() {
        let html = render_for(Role::User, &dashboard(false, Vec::new()));
        assert!(html.contains("No short URLs yet."));
    }
}
