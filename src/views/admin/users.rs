use super::super::{PageContext, checked, e, format_time, layout, selected};
use super::post_button;
use crate::services::{UserManagement, UserRow};
use crate::storage::{AccountStatus, Domain, Role};

fn domain_checkboxes(domains: &[Domain], assigned: &[i32]) -> String {
    if domains.is_empty() {
        return r#"<span class="muted">No custom domains</span>"#.to_string();
    }
    domains
        .iter()
        .map(|d| {
            format!(
                r#"<label class="checkbox"><input type="checkbox" name="domains" value="{}"{}> {}</label>"#,
                d.id,
                checked(assigned.contains(&d.id)),
                e(&d.domain_name)
            )
        })
        .collect()
}

fn role_select(current: Role) -> String {
    format!(
        r#"<select name="role"><option value="user"{}>user</option><option value="superadmin"{}>superadmin</option></select>"#,
        selected(current == Role::User),
        selected(current == Role::SuperAdmin),
    )
}

fn user_form(action: &str, row: Option<&UserRow>, domains: &[Domain]) -> String {
    let (id_field, username, quota, role, assigned, password_hint, submit) = match row {
        Some(r) => (
            format!(r#"<input type="hidden" name="id" value="{}">"#, r.user.id),
            e(&r.user.username),
            r.user.quota.to_string(),
            r.user.role,
            r.domain_ids.as_slice(),
            "leave empty to keep",
            "Save",
        ),
        None => (
            String::new(),
            String::new(),
            "0".to_string(),
            Role::User,
            &[][..],
            "required",
            "Add user",
        ),
    };
    let required = if row.is_none() { " required" } else { "" };

    format!(
        r#"<form method="post" action="{action}" class="user-form">{id_field}
<label>Username<input type="text" name="username" value="{username}" required></label>
<label>Password<input type="password" name="password" placeholder="{password_hint}" autocomplete="new-password"{required}></label>
<label>Quota<input type="number" name="quota" value="{quota}" min="0" title="0 = unlimited"></label>
<label>Role{role}</label>
<fieldset><legend>Domains</legend>{domains}</fieldset>
<button type="submit">{submit}</button>
</form>"#,
        action = action,
        id_field = id_field,
        username = username,
        password_hint = password_hint,
        required = required,
        quota = quota,
        role = role_select(role),
        domains = domain_checkboxes(domains, assigned),
        submit = submit,
    )
}

fn user_row(ctx: &PageContext<'_>, row: &UserRow, domains: &[Domain]) -> String {
    let is_self = ctx.user.map(|u| u.id) == Some(row.user.id);
    let assigned: Vec<String> = domains
        .iter()
        .filter(|d| row.domain_ids.contains(&d.id))
        .map(|d| e(&d.domain_name))
        .collect();
    let quota = if row.user.quota == 0 {
        "unlimited".to_string()
    } else {
        row.user.quota.to_string()
    };
    let status_class = match row.user.status {
        AccountStatus::Active => "badge",
        AccountStatus::Disabled => "badge badge-expired",
    };

    let mut actions = format!(
        r#"<details><summary>Edit</summary>{}</details>"#,
        user_form("/admin/users/edit", Some(row), domains)
    );
    if !is_self {
        let toggle_label = match row.user.status {
            AccountStatus::Active => "Disable",
            AccountStatus::Disabled => "Enable",
        };
        actions.push_str(&format!(
            r#"<form method="post" action="/admin/users/toggle-status" class="inline"><input type="hidden" name="id" value="{}"><button type="submit">{}</button></form>"#,
            row.user.id, toggle_label
        ));
        actions.push_str(&post_button(
            "/admin/users/delete",
            row.user.id,
            "Delete",
            "Delete this user and all of their short URLs?",
            "danger",
        ));
    }

    format!(
        r#"<tr><td>{username}</td><td>{role}</td><td><span class="{status_class}">{status}</span></td><td>{count} / {quota}</td><td>{domains}</td><td>{created}</td><td class="actions">{actions}</td></tr>"#,
        username = e(&row.user.username),
        role = row.user.role,
        status_class = status_class,
        status = row.user.status,
        count = row.url_count,
        quota = quota,
        domains = assigned.join(", "),
        created = format_time(&row.user.created_at),
        actions = actions,
    )
}

pub fn render(ctx: &PageContext<'_>, data: &UserManagement) -> String {
    let rows: String = data
        .users
        .iter()
        .map(|r| user_row(ctx, r, &data.domains))
        .collect();

    layout(
        ctx,
        &format!(
            r#"<h1>Users</h1>
<section class="card">
<h2>Add user</h2>
{add_form}
</section>
<section class="card">
<table>
<thead><tr><th>Username</th><th>Role</th><th>Status</th><th>URLs / quota</th><th>Domains</th><th>Created</th><th></th></tr></thead>
<tbody>
{rows}
</tbody>
</table>
</section>"#,
            add_form = user_form("/admin/users/add", None, &data.domains),
            rows = rows,
        ),
    )
}
