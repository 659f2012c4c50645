//! DatabaseManager refresh semantics and snapshot atomicity.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ipgeo::geo::{
    ContentDigest, DatabaseManager, DatasetLoader, DatasetSources, LookupResult, RefreshOutcome,
    RefreshTask,
};
use ipgeo::source::{HttpSettings, Source, create_source};

use common::{DatasetBuilder, MemorySource, france_dataset};

fn generation(key: u32, code: &str, name: &str) -> Vec<u8> {
    DatasetBuilder::new()
        .ipv4("1.2.3.0/24", key)
        .ipv4("10.0.0.0/8", key)
        .location(key, ("EU", "Europe"), (code, name))
        .build()
}

async fn manager(
    update: Arc<MemorySource>,
    hash_check: Option<Arc<MemorySource>>,
) -> Arc<DatabaseManager> {
    let sources = DatasetSources {
        update: update.clone(),
        hash_check: hash_check.map(|s| s as Arc<dyn Source>),
    };
    Arc::new(
        DatabaseManager::initialize(update, sources, DatasetLoader::default())
            .await
            .unwrap(),
    )
}

fn country_code(result: LookupResult) -> String {
    match result {
        LookupResult::Found(rec) => rec.country.unwrap().code,
        other => panic!("expected a match, got {:?}", other),
    }
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let manager = manager(Arc::new(MemorySource::with(france_dataset())), None).await;

    match manager.lookup("1.2.3.42") {
        LookupResult::Found(rec) => {
            let country = rec.country.unwrap();
            let continent = rec.continent.unwrap();
            assert_eq!((country.code.as_str(), country.name.as_str()), ("FR", "France"));
            assert_eq!((continent.code.as_str(), continent.name.as_str()), ("EU", "Europe"));
            assert!(rec.city.is_none());
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(manager.lookup("8.8.8.8"), LookupResult::NotFound);
    assert_eq!(manager.lookup("not-an-ip"), LookupResult::InvalidAddress);
}

#[tokio::test]
async fn test_identical_bytes_keep_snapshot_identity() {
    let update = Arc::new(MemorySource::with(france_dataset()));
    let manager = manager(update.clone(), None).await;

    let before = manager.snapshot();
    // 重新设置同样的字节
    update.set(france_dataset());
    assert_eq!(
        manager.refresh_now().await.unwrap(),
        RefreshOutcome::UnchangedByContent
    );
    assert!(Arc::ptr_eq(&before, &manager.snapshot()));
}

#[tokio::test]
async fn test_hash_check_avoids_full_download() {
    let body = france_dataset();
    let update = Arc::new(MemorySource::with(body.clone()));
    let hash = Arc::new(MemorySource::with(ContentDigest::of(&body).to_hex().to_uppercase()));
    let manager = manager(update.clone(), Some(hash.clone())).await;

    let reads = update.reads();
    assert_eq!(
        manager.refresh_now().await.unwrap(),
        RefreshOutcome::UnchangedByHashCheck
    );
    assert_eq!(update.reads(), reads);

    // 校验值变化后才下载
    let next = generation(7, "NL", "Netherlands");
    update.set(next.clone());
    hash.set(ContentDigest::of(&next).to_hex());
    assert!(manager.refresh_now().await.unwrap().is_updated());
    assert_eq!(update.reads(), reads + 1);
    assert_eq!(country_code(manager.lookup("10.1.2.3")), "NL");

    assert_eq!(
        manager.refresh_now().await.unwrap(),
        RefreshOutcome::UnchangedByHashCheck
    );
}

#[tokio::test]
async fn test_failures_keep_previous_snapshot() {
    let update = Arc::new(MemorySource::with(france_dataset()));
    let manager = manager(update.clone(), None).await;
    let before = manager.snapshot();

    update.fail();
    let err = manager.refresh_now().await.unwrap_err();
    assert!(err.is_source_error());

    // 缺少位置表成员
    update.set(common::zip_members(&[
        (common::IPV4_MEMBER, "network,geoname_id\n1.2.3.0/24,1\n"),
        (common::IPV6_MEMBER, "network,geoname_id\n"),
    ]));
    let err = manager.refresh_now().await.unwrap_err();
    assert!(err.is_format_error());

    // 非法 CIDR
    update.set(common::zip_members(&[
        (common::IPV4_MEMBER, "network,geoname_id\n1.2.3.0/40,1\n"),
        (common::IPV6_MEMBER, "network,geoname_id\n"),
        (
            common::LOCATIONS_MEMBER,
            "geoname_id,locale_code,continent_code,continent_name,country_iso_code,country_name\n",
        ),
    ]));
    let err = manager.refresh_now().await.unwrap_err();
    assert!(err.is_format_error());

    assert!(Arc::ptr_eq(&before, &manager.snapshot()));
    assert_eq!(country_code(manager.lookup("1.2.3.4")), "FR");
}

#[tokio::test]
async fn test_nested_archive_members_are_found() {
    let dataset = DatasetBuilder::new()
        .ipv4("1.2.3.0/24", 100)
        .location(100, ("EU", "Europe"), ("FR", "France"))
        .in_directory("GeoLite2-Country-CSV_20260101")
        .build();
    let manager = manager(Arc::new(MemorySource::with(dataset)), None).await;
    assert_eq!(country_code(manager.lookup("1.2.3.4")), "FR");
}

#[tokio::test]
async fn test_initialize_from_file_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("GeoLite2-Country-CSV.zip");
    std::fs::write(&path, france_dataset()).unwrap();

    let uri = url::Url::from_file_path(&path).unwrap().to_string();
    let source = create_source(&uri, &HttpSettings::default()).unwrap();
    let sources = DatasetSources {
        update: source.clone(),
        hash_check: None,
    };
    let manager = DatabaseManager::initialize(source, sources, DatasetLoader::default())
        .await
        .unwrap();
    assert_eq!(country_code(manager.lookup("1.2.3.200")), "FR");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_lookups_never_see_torn_snapshot() {
    let alpha = generation(100, "AA", "Alpha");
    let bravo = generation(200, "BB", "Bravo");

    let update = Arc::new(MemorySource::with(alpha.clone()));
    let manager = manager(update.clone(), None).await;
    let stop = Arc::new(AtomicBool::new(false));

    let mut readers = Vec::new();
    for _ in 0..4 {
        let manager = manager.clone();
        let stop = stop.clone();
        readers.push(tokio::spawn(async move {
            let mut observed = 0u64;
            while !stop.load(Ordering::Relaxed) {
                // 单次查询：索引与位置表必须来自同一份快照
                match manager.lookup("1.2.3.42") {
                    LookupResult::Found(rec) => {
                        let country = rec.country.unwrap();
                        let pair = (country.code.as_str(), country.name.as_str());
                        assert!(
                            pair == ("AA", "Alpha") || pair == ("BB", "Bravo"),
                            "torn record {:?}",
                            pair
                        );
                    }
                    other => panic!("lookup observed {:?} during refresh", other),
                }

                // 同一快照上的两次查询结果一致
                let snapshot = manager.snapshot();
                let a = snapshot.lookup("1.2.3.42").cloned();
                let b = snapshot.lookup("10.9.9.9").cloned();
                assert_eq!(a, b);

                observed += 1;
                tokio::task::yield_now().await;
            }
            observed
        }));
    }

    for round in 0..20 {
        let next = if round % 2 == 0 { &bravo } else { &alpha };
        update.set(next.clone());
        assert!(manager.refresh_now().await.unwrap().is_updated());
        tokio::time::sleep(Duration::from_millis(2)).await;
    }

    stop.store(true, Ordering::Relaxed);
    for reader in readers {
        assert!(reader.await.unwrap() > 0);
    }
}

#[tokio::test]
async fn test_refresh_task_publishes_and_stops() {
    let update = Arc::new(MemorySource::with(generation(1, "AA", "Alpha")));
    let manager = manager(update.clone(), None).await;

    let handle = RefreshTask::spawn(manager.clone(), Duration::from_millis(20));
    update.set(generation(2, "BB", "Bravo"));

    let mut refreshed = false;
    for _ in 0..100 {
        if country_code(manager.lookup("1.2.3.4")) == "BB" {
            refreshed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(refreshed, "refresh task never published the new dataset");

    // 失败的刷新不会终止任务
    update.fail();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(!handle.is_finished());
    assert_eq!(country_code(manager.lookup("1.2.3.4")), "BB");

    handle.shutdown().await;
}
