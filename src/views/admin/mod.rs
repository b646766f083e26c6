//! Admin console pages

pub mod dashboard;
pub mod domains;
pub mod settings;
pub mod users;

/// 删除类表单：单独的 POST 表单，带确认
pub(crate) fn post_button(action: &str, id: i32, label: &str, confirm: &str, class: &str) -> String {
    format!(
        r#"<form method="post" action="{action}" class="inline" onsubmit="return confirm('{confirm}')"><input type="hidden" name="id" value="{id}"><button type="submit" class="{class}">{label}</button></form>"#,
        action = action,
        id = id,
        confirm = super::e(confirm),
        class = class,
        label = label,
    )
}
