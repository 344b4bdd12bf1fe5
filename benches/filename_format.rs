//! Benchmarks for filename formatting
//!
//! Measures token substitution and sanitizing for typical rename patterns.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use reelname::format::{format, sanitize, TokenValues};
use reelname_common::{EpisodeRecord, MetadataRecord, MovieRecord, ProviderKind};

/// Default movie pattern
const PATTERN_MOVIE: &str = "{title} ({year})";

/// Default episode pattern
const PATTERN_TV: &str = "{title} - {S}{E} - {episodeTitle}";

/// Every token, twice
const PATTERN_ALL_TOKENS: &str = "{title} {year} {season} {episode} {episodeTitle} {S} {E} \
    {title} {year} {season} {episode} {episodeTitle} {S} {E}";

/// No tokens (baseline)
const PATTERN_NO_TOKENS: &str = "Some Static Name";

fn episode() -> MetadataRecord {
    let mut record = EpisodeRecord::new(ProviderKind::Tvdb, "The Mandalorian", 1, 2);
    record.show_year = Some(2019);
    record.episode_title = Some("Chapter 2: The Child".to_string());
    record.into()
}

fn movie() -> MetadataRecord {
    MovieRecord::new(ProviderKind::Tmdb, "Mission: Impossible - Fallout", Some(2018)).into()
}

fn bench_format(c: &mut Criterion) {
    let mut group = c.benchmark_group("format");
    let episode = episode();
    let movie = movie();

    for (name, record, pattern) in [
        ("no_tokens", &episode, PATTERN_NO_TOKENS),
        ("movie", &movie, PATTERN_MOVIE),
        ("tv", &episode, PATTERN_TV),
        ("all_tokens", &episode, PATTERN_ALL_TOKENS),
    ] {
        group.throughput(Throughput::Bytes(pattern.len() as u64));
        group.bench_with_input(BenchmarkId::new("pattern", name), &pattern, |b, pattern| {
            b.iter(|| format(black_box(record), black_box(pattern)));
        });
    }

    group.finish();
}

fn bench_substitute_only(c: &mut Criterion) {
    let values = TokenValues::from_record(&episode());

    c.bench_function("substitute_tv_pattern", |b| {
        b.iter(|| values.substitute(black_box(PATTERN_TV)));
    });
}

fn bench_sanitize(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize");

    let clean = "The Mandalorian - S01E02 - Chapter 2 The Child";
    let dirty = "  The  Mandalorian -\tS01E02 - Chapter 2: <The> \"Child\"?  ";

    group.bench_function("clean", |b| b.iter(|| sanitize(black_box(clean))));
    group.bench_function("dirty", |b| b.iter(|| sanitize(black_box(dirty))));

    group.finish();
}

criterion_group!(benches, bench_format, bench_substitute_only, bench_sanitize);
criterion_main!(benches);
