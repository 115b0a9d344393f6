//! Performance benchmarks for dtext
//!
//! Run with: cargo bench

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use dtext::{ParseOptions, parse};

/// Sample DText documents of various sizes
mod samples {
    pub const TINY: &str = "Hello, [b]world[/b]!";

    pub const SMALL: &str = r#"h2. Heading

This is a paragraph with [i]emphasis[/i] and [b]strong[/b] text.

* Item 1
* Item 2
** Nested item

See post #1234 and [[touhou]] for more.
"#;

    pub const MEDIUM: &str = r#"h1. Tag Guidelines

[quote]
@moderator wrote:
Please read [[howto:tag|the tagging guide]] before editing.
[/quote]

h2#examples. Examples

* "A named link":https://example.com/page
* [url=https://example.com]bbcode link[/url]
* {{rating:s solo}} and thumb #42
** topic #12/p3, pool #7, commit #1a2b3c4d

[section=Spoilers]
[spoiler]The ending is a twist.[/spoiler]
[/section]

[table]
[thead][tr][th]Tag[/th][th]Count[/th][/tr][/thead]
[tbody][tr][td]cat[/td][td align=right]1200[/td][/tr][/tbody]
[/table]

[code=rust]
fn main() { println!("[b]not bold[/b]"); }
[/code]
"#;

    /// Generate a large document by repeating a comment-like section
    pub fn large() -> String {
        let section = r#"
[quote]
"user":/users/1 said:
I think [[hatsune_miku]] fits here, see https://example.com/a_(b).
[/quote]

Agreed, tagging as {{vocaloid}}. Thanks @some_user! post #123 has it too.

* first point with [b]bold[/b]
* second point with [s]strike[/s]

"#;
        section.repeat(50)
    }

    /// Many unclosed openers, each needing a closer search
    pub fn pathological_unclosed() -> String {
        "[b][i][url=https://a.com]x ".repeat(2000)
    }

    /// Deeply nested containers
    pub fn pathological_nested() -> String {
        "[quote]".repeat(200) + "deep"
    }

    /// Many quote characters that never form links
    pub fn pathological_quotes() -> String {
        "\"a\" ".repeat(3000)
    }
}

fn html(input: &str) -> String {
    dtext::to_html(input).unwrap_or_default()
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    group.throughput(Throughput::Bytes(samples::TINY.len() as u64));
    group.bench_function("tiny", |b| b.iter(|| html(black_box(samples::TINY))));

    group.throughput(Throughput::Bytes(samples::SMALL.len() as u64));
    group.bench_function("small", |b| b.iter(|| html(black_box(samples::SMALL))));

    group.throughput(Throughput::Bytes(samples::MEDIUM.len() as u64));
    group.bench_function("medium", |b| b.iter(|| html(black_box(samples::MEDIUM))));

    let large = samples::large();
    group.throughput(Throughput::Bytes(large.len() as u64));
    group.bench_function("large", |b| b.iter(|| html(black_box(&large))));

    group.finish();
}

fn bench_options(c: &mut Criterion) {
    let mut group = c.benchmark_group("options");
    let large = samples::large();
    group.throughput(Throughput::Bytes(large.len() as u64));

    let mut options = ParseOptions::default();
    options.domain = Some("e621.net".into());
    options.qtags = true;
    options.allow_color = true;
    options.max_thumbs = Some(10);
    group.bench_function("all_features", |b| {
        b.iter(|| parse(Some(black_box(&large)), &options))
    });

    options.disable_mentions = true;
    options.qtags = false;
    group.bench_function("no_mentions", |b| {
        b.iter(|| parse(Some(black_box(&large)), &options))
    });

    group.finish();
}

fn bench_escaping(c: &mut Criterion) {
    let mut group = c.benchmark_group("escaping");

    let plain = "Hello, this is plain text without any special characters. ".repeat(100);
    group.throughput(Throughput::Bytes(plain.len() as u64));
    group.bench_function("plain_text", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(plain.len());
            dtext::escape::escape_text_into(&mut out, black_box(plain.as_bytes()));
            out
        })
    });

    let html_heavy = "<script>alert('xss')</script> & more <tags> here! ".repeat(100);
    group.throughput(Throughput::Bytes(html_heavy.len() as u64));
    group.bench_function("html_heavy", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(html_heavy.len() * 2);
            dtext::escape::escape_text_into(&mut out, black_box(html_heavy.as_bytes()));
            out
        })
    });

    group.finish();
}

fn bench_pathological(c: &mut Criterion) {
    let mut group = c.benchmark_group("pathological");
    group.sample_size(20);

    let unclosed = samples::pathological_unclosed();
    group.throughput(Throughput::Bytes(unclosed.len() as u64));
    group.bench_function("unclosed_tags", |b| b.iter(|| html(black_box(&unclosed))));

    let nested = samples::pathological_nested();
    group.throughput(Throughput::Bytes(nested.len() as u64));
    group.bench_function("deep_nesting", |b| b.iter(|| html(black_box(&nested))));

    let quotes = samples::pathological_quotes();
    group.throughput(Throughput::Bytes(quotes.len() as u64));
    group.bench_function("quote_runs", |b| b.iter(|| html(black_box(&quotes))));

    group.finish();
}

criterion_group!(
    benches,
    bench_parsing,
    bench_options,
    bench_escaping,
    bench_pathological
);
criterion_main!(benches);
