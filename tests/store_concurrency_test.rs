/// 参考点存储与扫描缓存的并发测试
///
/// - 多个训练会话同时批量写入，编号不能重复
/// - 写入期间的读取只能看到完整的批次
/// - 扫描缓存在生产者/消费者并发下保持一致

use navinside::fingerprint::{Coordinate, ReferencePoint, SignalRecord};
use navinside::scanner::ScanCache;
use navinside::store::{JsonLinesStore, MemoryStore, SharedStore};
use std::collections::HashSet;
use std::time::Duration;
use tokio::task;
use tokio::time::sleep;

fn batch(first_uid: u32, len: u32, tag: &str) -> Vec<ReferencePoint> {
    (0..len)
        .map(|i| {
            ReferencePoint::new(
                first_uid + i,
                Coordinate::new(i as f64, 0.0),
                &[SignalRecord::new(tag, -40 - i as i32)],
            )
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_get_unique_uids() {
    println!("\n========== 并发会话写入测试 ==========\n");

    let shared = SharedStore::new(MemoryStore::new());
    let mut handles = Vec::new();

    for session_id in 0..8u32 {
        let store = shared.clone();
        handles.push(task::spawn(async move {
            let tag = format!("SESSION_{}", session_id);
            store
                .insert_batch(|first_uid| Ok(batch(first_uid, 5, &tag)))
                .await
        }));
    }

    for handle in handles {
        let inserted = handle.await.unwrap().unwrap();
        println!(
            "  会话写入编号 {}..{}",
            inserted[0].uid,
            inserted[inserted.len() - 1].uid
        );
    }

    let points = shared.snapshot().await.unwrap();
    let uids: HashSet<u32> = points.iter().map(|p| p.uid).collect();
    assert_eq!(points.len(), 40);
    assert_eq!(uids.len(), 40, "参考点编号出现重复");
    assert_eq!(uids, (0..40).collect::<HashSet<u32>>());

    // 每个批次的编号连续且来自同一个会话
    for chunk in points.chunks(5) {
        let tag = &chunk[0].signals[0].identifier;
        assert!(chunk.iter().all(|p| &p.signals[0].identifier == tag));
        assert!(chunk.windows(2).all(|w| w[1].uid == w[0].uid + 1));
    }

    println!("\n✓ {} 个参考点，编号无重复", points.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_see_whole_batches() {
    let shared = SharedStore::new(MemoryStore::new());

    let writer = {
        let store = shared.clone();
        task::spawn(async move {
            for round in 0..20u32 {
                let tag = format!("ROUND_{}", round);
                store
                    .insert_batch(|first_uid| Ok(batch(first_uid, 3, &tag)))
                    .await
                    .unwrap();
                task::yield_now().await;
            }
        })
    };

    let reader = {
        let store = shared.clone();
        task::spawn(async move {
            for _ in 0..50 {
                let snapshot = store.snapshot().await.unwrap();
                assert_eq!(snapshot.len() % 3, 0, "读取到写了一半的批次");
                task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
    assert_eq!(shared.count().await.unwrap(), 60);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sessions_on_json_lines_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("points.jsonl");
    let shared = SharedStore::new(JsonLinesStore::open(&path).unwrap());

    let mut handles = Vec::new();
    for session_id in 0..4u32 {
        let store = shared.clone();
        handles.push(task::spawn(async move {
            let tag = format!("AP_{}", session_id);
            store
                .insert_batch(|first_uid| Ok(batch(first_uid, 3, &tag)))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    // 重新打开文件，持久化的编号同样无重复
    let reopened = SharedStore::new(JsonLinesStore::open(&path).unwrap());
    let points = reopened.snapshot().await.unwrap();
    let uids: HashSet<u32> = points.iter().map(|p| p.uid).collect();
    assert_eq!(points.len(), 12);
    assert_eq!(uids.len(), 12);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_scan_cache_producer_consumer() {
    println!("\n========== 扫描缓存并发测试 ==========\n");

    let cache = ScanCache::new(15);

    // 生产者：模拟扫描线程不断更新观测
    let producer = {
        let cache = cache.clone();
        task::spawn(async move {
            for round in 0..10 {
                for ap in 0..5 {
                    cache
                        .insert(SignalRecord::new(format!("AP_{}", ap), -40 - ap * 10 - round))
                        .await;
                }
                sleep(Duration::from_millis(5)).await;
            }
        })
    };

    // 消费者：读取排序后的观测
    let consumer = {
        let cache = cache.clone();
        task::spawn(async move {
            for _ in 0..10 {
                let ranked = cache.ranked().await;
                assert!(ranked.windows(2).all(|w| w[0].strength >= w[1].strength));
                sleep(Duration::from_millis(5)).await;
            }
        })
    };

    producer.await.unwrap();
    consumer.await.unwrap();

    let ranked = cache.ranked().await;
    for record in &ranked {
        println!("  {} {} dBm", record.identifier, record.strength);
    }
    assert_eq!(ranked.len(), 5);
    assert_eq!(ranked[0].identifier, "AP_0");
    assert_eq!(ranked[0].strength, -49);
}
