//! SVG 验证码生成
//!
//! 每个字符单独旋转、偏移并着色，再叠加干扰曲线。答案比较不区分大小写。

use std::fmt::Write;

use crate::config::CaptchaKind;

const ALPHANUMERIC: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZabcdefghjkmnpqrstuvwxyz23456789";
const NUMERIC: &[u8] = b"0123456789";

const WIDTH: u32 = 150;
const HEIGHT: u32 = 50;
const NOISE_LINES: usize = 2;

/// 生成的验证码：答案文本 + SVG 图像
#[derive(Debug, Clone)]
pub struct Captcha {
    pub text: String,
    pub svg: String,
}

impl Captcha {
    pub fn generate(kind: CaptchaKind, length: usize) -> Self {
        let text = random_text(kind, length.max(1));
        let svg = render_svg(&text);
        Self { text, svg }
    }
}

fn random_text(kind: CaptchaKind, length: usize) -> String {
    let chars = match kind {
        CaptchaKind::Alphanumeric => ALPHANUMERIC,
        CaptchaKind::Numeric => NUMERIC,
    };
    std::iter::repeat_with(|| chars[rand::random_range(0..chars.len())] as char)
        .take(length)
        .collect()
}

fn random_color() -> String {
    // 偏暗的颜色，保证在浅色背景上可读
    format!(
        "#{:02x}{:02x}{:02x}",
        rand::random_range(20..150u8),
        rand::random_range(20..150u8),
        rand::random_range(20..150u8)
    )
}

fn render_svg(text: &str) -> String {
    let mut svg = String::with_capacity(1024);
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = write!(
        svg,
        r##"<rect width="100%" height="100%" fill="#f4f4f4"/>"##
    );

    for _ in 0..NOISE_LINES {
        let _ = write!(
            svg,
            r#"<path d="M{} {} C{} {},{} {},{} {}" stroke="{}" stroke-width="2" fill="none"/>"#,
            rand::random_range(0..20u32),
            rand::random_range(5..HEIGHT - 5),
            rand::random_range(30..70u32),
            rand::random_range(0..HEIGHT),
            rand::random_range(80..120u32),
            rand::random_range(0..HEIGHT),
            rand::random_range(WIDTH - 20..WIDTH),
            rand::random_range(5..HEIGHT - 5),
            random_color()
        );
    }

    let count = text.chars().count().max(1) as u32;
    let step = (WIDTH - 20) / count;
    for (i, c) in text.chars().enumerate() {
        let x = 10 + step * i as u32 + step / 4;
        let y = rand::random_range(30..42u32);
        let rotate = rand::random_range(-25..=25i32);
        let size = rand::random_range(24..32u32);
        let _ = write!(
            svg,
            r#"<text x="{x}" y="{y}" font-family="monospace" font-size="{size}" font-weight="bold" fill="{color}" transform="rotate({rotate} {x} {y})">{c}</text>"#,
            color = random_color()
        );
    }

    svg.push_str("</svg>");
    svg
}

/// 校验用户输入，不区分大小写；没有待验证的答案时一律失败
pub fn verify_answer(expected: Option<&str>, submitted: Option<&str>) -> bool {
    match (expected, submitted.map(str::trim)) {
        (Some(expected), Some(submitted)) if !expected.is_empty() && !submitted.is_empty() => {
            expected.eq_ignore_ascii_case(submitted)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_alphanumeric() {
        let captcha = Captcha::generate(CaptchaKind::Alphanumeric, 5);
        assert_eq!(captcha.text.len(), 5);
        assert!(captcha.text.bytes().all(|b| ALPHANUMERIC.contains(&b)));
        assert!(captcha.svg.starts_with("<svg"));
        assert!(captcha.svg.ends_with("</svg>"));
        assert_eq!(captcha.svg.matches("<text").count(), 5);
    }

    #[test]
    fn test_generate_numeric() {
        let captcha = Captcha::generate(CaptchaKind::Numeric, 4);
        assert!(captcha.text.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_zero_length_is_clamped() {
        assert_eq!(Captcha::generate(CaptchaKind::Numeric, 0).text.len(), 1);
    }

    #[test]
    fn test_verify_answer() {
        assert!(verify_answer(Some("aBc4"), Some("ABC4")));
        assert!(verify_answer(Some("aBc4"), Some(" abc4 ")));
        assert!(!verify_answer(Some("aBc4"), Some("abc5")));
        assert!(!verify_answer(None, Some("abc4")));
        assert!(!verify_answer(Some("abc4"), None));
        assert!(!verify_answer(Some(""), Some("")));
    }
}
