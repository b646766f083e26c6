//! 工具函数性能基准测试

use chrono::{Duration, Utc};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use linkhub::config::CaptchaKind;
use linkhub::utils::captcha::Captcha;
use linkhub::utils::url_validator::{normalize_domain_name, validate_url};
use linkhub::utils::{TimeParser, escape_html, generate_random_code, is_valid_short_code};

// ============== is_valid_short_code 基准测试 ==============

fn bench_is_valid_short_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/is_valid_short_code");

    group.bench_function("valid_simple", |b| {
        b.iter(|| {
            assert!(is_valid_short_code("abc123"));
        });
    });

    group.bench_function("valid_with_separators", |b| {
        b.iter(|| {
            assert!(is_valid_short_code("spring-sale_2025"));
        });
    });

    group.bench_function("invalid_special_chars", |b| {
        b.iter(|| {
            assert!(!is_valid_short_code("'; DROP TABLE--"));
        });
    });

    let max_len_code = "a".repeat(64);
    group.bench_function("valid_max_length", |b| {
        b.iter(|| {
            assert!(is_valid_short_code(&max_len_code));
        });
    });

    group.finish();
}

// ============== generate_random_code 基准测试 ==============

fn bench_generate_random_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/generate_random_code");

    for length in [6, 8, 12] {
        group.bench_with_input(BenchmarkId::new("length", length), &length, |b, &length| {
            b.iter(|| {
                let code = generate_random_code(length);
                assert_eq!(code.len(), length);
            });
        });
    }

    group.finish();
}

// ============== validate_url / normalize_domain_name 基准测试 ==============

fn bench_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/validation");

    group.bench_function("url_valid_https", |b| {
        b.iter(|| {
            assert!(validate_url("https://example.com/path?query=1").is_ok());
        });
    });

    group.bench_function("url_dangerous_protocol", |b| {
        b.iter(|| {
            assert!(validate_url("javascript:alert(1)").is_err());
        });
    });

    group.bench_function("domain_name", |b| {
        b.iter(|| {
            assert!(normalize_domain_name("Go.Example.COM:8080").is_some());
        });
    });

    group.finish();
}

// ============== TimeParser 基准测试 ==============

fn bench_time_parser(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/time_parser");

    for input in ["2030-01-02T03:04", "2030-01-02T03:04:05Z", "1d12h"] {
        group.bench_with_input(BenchmarkId::new("parse", input), &input, |b, input| {
            b.iter(|| {
                assert!(TimeParser::parse_expire_time(input).is_ok());
            });
        });
    }

    let now = Utc::now();
    let later = now + Duration::hours(50);
    group.bench_function("format_duration_human", |b| {
        b.iter(|| TimeParser::format_duration_human(now, later));
    });

    group.finish();
}

// ============== escape_html / Captcha 基准测试 ==============

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("utils/rendering");

    let text = "<a href=\"https://example.com/?a=1&b=2\">Tom's link</a>".repeat(20);
    group.bench_function("escape_html", |b| {
        b.iter(|| escape_html(&text));
    });

    for length in [4, 8] {
        group.bench_with_input(BenchmarkId::new("captcha", length), &length, |b, &length| {
            b.iter(|| {
                let captcha = Captcha::generate(CaptchaKind::Alphanumeric, length);
                assert_eq!(captcha.text.len(), length);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_is_valid_short_code,
    bench_generate_random_code,
    bench_validation,
    bench_time_parser,
    bench_rendering,
);
criterion_main!(benches);
