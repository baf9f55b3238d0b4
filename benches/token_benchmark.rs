use criterion::{black_box, criterion_group, criterion_main, Criterion};
use grindup_checkin::services::kiosk::should_accept;
use grindup_checkin::services::parse_scan_token;
use std::time::{Duration, Instant};

fn benchmark_parse_scan_token(c: &mut Criterion) {
    let domains = vec!["grindupfitness.com".to_string()];

    let mut group = c.benchmark_group("parse_scan_token");

    group.bench_function("profile_url", |b| {
        b.iter(|| {
            parse_scan_token(
                black_box("https://www.grindupfitness.com/member/abcXYZ123"),
                &domains,
            )
        })
    });

    group.bench_function("foreign_url_query", |b| {
        b.iter(|| {
            parse_scan_token(
                black_box("https://example.org/checkin?ref=kiosk&uid=Zx9kQ2mN4pR7sT1vW3yB"),
                &domains,
            )
        })
    });

    group.bench_function("json_payload", |b| {
        b.iter(|| {
            parse_scan_token(
                black_box(r#"{"gym":"downtown","memberId":"u_789"}"#),
                &domains,
            )
        })
    });

    group.bench_function("plain_code", |b| {
        b.iter(|| parse_scan_token(black_box("MBR-0042"), &domains))
    });

    group.finish();
}

fn benchmark_debounce(c: &mut Criterion) {
    let last = Instant::now();
    let now = last + Duration::from_millis(300);
    let cooldown = Duration::from_millis(1200);

    c.bench_function("should_accept_repeat", |b| {
        b.iter(|| {
            should_accept(
                black_box(now),
                black_box("MBR-0042"),
                Some(last),
                Some("MBR-0042"),
                cooldown,
            )
        })
    });
}

criterion_group!(benches, benchmark_parse_scan_token, benchmark_debounce);
criterion_main!(benches);
