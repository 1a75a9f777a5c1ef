use criterion::{black_box, criterion_group, criterion_main, Criterion};
use factcheck_bot::config::DEFAULT_TRIGGER_KEYWORDS;
use factcheck_bot::factcheck::{clean_claim, parse_fact_check};
use factcheck_bot::triggers::TriggerScanner;

fn scanner_benchmark(c: &mut Criterion) {
    let keywords: Vec<String> = DEFAULT_TRIGGER_KEYWORDS
        .iter()
        .map(|s| s.to_string())
        .collect();
    let scanner = TriggerScanner::new(&keywords, 20, 10_000);
    let text = "Totally ordinary chat message about weekend plans and groceries ".repeat(16);

    c.bench_function("scanner_benign_long_message", |b| {
        b.iter(|| black_box(scanner.should_check(black_box(text.as_str()))));
    });

    let hot = "Breaking exclusive report: studies show 97% of doctors agree with this claim";
    c.bench_function("scanner_triggering_message", |b| {
        b.iter(|| black_box(scanner.should_check(black_box(hot))));
    });
}

fn clean_claim_benchmark(c: &mut Criterion) {
    let text = "**Bold claim** with <@12345> mentions, <#678> channels, `inline code`, \
        ```\nblock code\n``` and ~~corrections~~ _emphasis_ everywhere "
        .repeat(8);

    c.bench_function("clean_claim_markdown_heavy", |b| {
        b.iter(|| {
            let cleaned = clean_claim(black_box(text.as_str()));
            black_box(cleaned.len());
        });
    });
}

fn parse_benchmark(c: &mut Criterion) {
    let response = "\
ACCURACY: Mostly False\n\n\
CONFIDENCE: 85%\n\n\
EXPLANATION: The claim cherry-picks a single study and ignores the wider body of \
evidence collected over two decades of research across multiple countries.\n\n\
SOURCES:\n\
- Systematic review of the field\n\
- National statistics office data\n\
- University replication study\n";

    c.bench_function("parse_fact_check_structured", |b| {
        b.iter(|| {
            let result = parse_fact_check(black_box(response));
            black_box((result.confidence, result.sources.len()));
        });
    });
}

criterion_group!(
    text_processing,
    scanner_benchmark,
    clean_claim_benchmark,
    parse_benchmark
);
criterion_main!(text_processing);
