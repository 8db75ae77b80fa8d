//! Catalogue-wide checks run against an API that serves nothing.

use forti_core::TargetMetadata;
use forti_probe::probes::catalogue;
use forti_probe::StaticFetcher;

#[test]
fn names_are_sorted_and_unique() {
    let names: Vec<&str> = catalogue().iter().map(|p| p.name).collect();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(names, sorted);
}

#[test]
fn missing_endpoints_never_produce_samples() {
    for version in [TargetMetadata::new(6, 2), TargetMetadata::new(7, 4), TargetMetadata::new(7, 6)] {
        for probe in catalogue() {
            let fetcher = StaticFetcher::new();
            let outcome = probe.invoke(&fetcher, &version);
            assert!(
                outcome.samples.is_empty(),
                "{} produced samples from an empty API",
                probe.name
            );
        }
    }
}

#[test]
fn probes_only_call_the_monitor_api() {
    let meta = TargetMetadata::new(7, 4);
    for probe in catalogue() {
        let fetcher = StaticFetcher::new();
        probe.invoke(&fetcher, &meta);
        for (path, _) in fetcher.calls() {
            assert!(path.starts_with("api/v2/monitor/"), "{}: {path}", probe.name);
        }
    }
}
