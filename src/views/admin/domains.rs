use super::super::{PageContext, e, format_time, layout};
use super::post_button;
use crate::storage::Domain;

pub fn render(ctx: &PageContext<'_>, base_host: &str, domains: &[Domain]) -> String {
    let rows: String = if domains.is_empty() {
        r#"<tr><td colspan="3" class="muted">No custom domains yet.</td></tr>"#.to_string()
    } else {
        domains
            .iter()
            .map(|d| {
                format!(
                    r#"<tr><td>{}</td><td>{}</td><td class="actions">{}</td></tr>"#,
                    e(&d.domain_name),
                    format_time(&d.created_at),
                    post_button(
                        "/admin/domains/delete",
                        d.id,
                        "Delete",
                        "Delete this domain?",
                        "danger"
                    )
                )
            })
            .collect()
    };

    layout(
        ctx,
        &format!(
            r#"<h1>Domains</h1>
<p class="muted">The base domain <strong>{base}</strong> is always available.</p>
<section class="card">
<form method="post" action="/admin/domains/add" class="inline-form">
<input type="text" name="domain_name" placeholder="go.example.com" required>
<button type="submit">Add domain</button>
</form>
</section>
<section class="card">
<table>
<thead><tr><th>Domain</th><th>Added</th><th></th></tr></thead>
<tbody>
{rows}
</tbody>
</table>
</section>"#,
            base = e(base_host),
            rows = rows,
        ),
    )
}
