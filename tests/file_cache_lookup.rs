//! Lookups sharing a file cache across service instances (one per CLI run)

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use tempfile::TempDir;
use ufrate::services::{
    FileCache, HttpClient, HttpResponse, LookupSettings, ManualClock, RateCache,
};
use ufrate::sources::{MindicadorSource, SantaSource, SourceRegistry};
use ufrate::{RateLookupService, Result, UfError};

const SANTA: &str = "http://santa.test/uf";
const MINDICADOR: &str = "http://mindicador.test/api/uf";

/// Santa is down; mindicador answers with a fixed value
struct FlakyUpstream {
    calls: AtomicUsize,
}

impl HttpClient for FlakyUpstream {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match url {
            SANTA => Ok(HttpResponse::new(503, "Service Unavailable")),
            MINDICADOR => Ok(HttpResponse::new(
                200,
                r#"{"serie": [{"fecha": "2024-05-01T04:00:00.000Z", "valor": 39500.12}]}"#,
            )),
            _ => Err(UfError::Transport(format!("unexpected url {}", url))),
        }
    }
}

fn build_service(
    upstream: Arc<FlakyUpstream>,
    cache: Arc<FileCache>,
    clock: Arc<ManualClock>,
) -> RateLookupService {
    let registry = SourceRegistry::new(vec![
        Box::new(SantaSource::with_url(SANTA)),
        Box::new(MindicadorSource::with_url(MINDICADOR)),
    ]);
    RateLookupService::new(upstream, cache, registry, clock, LookupSettings::default())
}

#[test]
fn second_run_is_served_from_file_cache() {
    let temp = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    ));
    let upstream = Arc::new(FlakyUpstream {
        calls: AtomicUsize::new(0),
    });

    let cache = Arc::new(FileCache::with_cache_dir_and_clock(
        temp.path().to_path_buf(),
        clock.clone(),
    ));
    let first = build_service(upstream.clone(), cache, clock.clone()).get_value();
    assert_eq!(first.value.as_deref(), Some("39.500,12"));
    assert_eq!(first.source, "mindicador.cl");
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 2);

    // New process, same cache directory
    let cache = Arc::new(FileCache::with_cache_dir_and_clock(
        temp.path().to_path_buf(),
        clock.clone(),
    ));
    clock.advance(chrono::Duration::minutes(30));
    let second = build_service(upstream.clone(), cache.clone(), clock.clone()).get_value();

    assert_eq!(second, first);
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 2);
    assert!(cache.get("uf_value").is_some());
}

#[test]
fn conversion_uses_cached_rate() {
    let temp = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    ));
    let upstream = Arc::new(FlakyUpstream {
        calls: AtomicUsize::new(0),
    });
    let cache = Arc::new(FileCache::with_cache_dir_and_clock(
        temp.path().to_path_buf(),
        clock.clone(),
    ));
    let service = build_service(upstream.clone(), cache, clock);

    let conversion = service.convert_amount(39500.12 * 10.0).unwrap();

    assert_eq!(conversion.amount_uf, 10.0);
    assert_eq!(conversion.amount_uf_formatted, "10,00");
    assert!(!conversion.simulated);
    assert_eq!(upstream.calls.load(Ordering::SeqCst), 2);
}
