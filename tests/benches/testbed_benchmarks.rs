//! # Kad-Testbed Benchmarks
//!
//! | Target | Input |
//! |--------|-------|
//! | kt-01 `fleet_edges` | fleets of 100 to 2000 records, two modes |
//! | kt-03 `HopTable::apply` | chained lookup walks of 100 to 10000 events |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use uuid::Uuid;

use kt_01_bootstrap_sequencer::{fleet_edges, BootstrapMode};
use kt_03_hop_counter::HopTable;
use shared_types::{
    ClusterId, ContentKey, LookupEvent, LookupResponse, ParticipantRecord, PeerHandle, PeerId,
};

fn peer(i: u64) -> PeerId {
    let mut id = [0u8; 32];
    id[..8].copy_from_slice(&i.to_be_bytes());
    PeerId(id)
}

fn fleet(size: u64, clusters: u64) -> Vec<ParticipantRecord> {
    (1..=size)
        .map(|seq| {
            ParticipantRecord::new(
                PeerHandle::new(peer(seq), vec![]),
                ClusterId::new(format!("cluster-{}", seq % clusters)),
                seq,
            )
        })
        .collect()
}

/// Walk where peer `i` reports peers `i+1` and `i+2`; the last one answers.
fn walk(key: ContentKey, length: u64) -> Vec<LookupEvent> {
    let query = Uuid::new_v4();
    (0..length)
        .map(|i| {
            let heard = if i + 1 == length {
                vec![]
            } else {
                vec![peer(i + 1), peer(i + 2)]
            };
            LookupEvent::new(
                query,
                key,
                Some(LookupResponse {
                    source: peer(i),
                    cause: peer(i),
                    heard,
                    queried: vec![peer(i)],
                }),
            )
        })
        .collect()
}

fn bench_fleet_edges(c: &mut Criterion) {
    let mut group = c.benchmark_group("kt-01-fleet-edges");
    for size in [100u64, 500, 2000] {
        let records = fleet(size, 8);
        group.throughput(Throughput::Elements(size));
        for mode in [BootstrapMode::SingleRoot, BootstrapMode::MultiCluster] {
            group.bench_with_input(
                BenchmarkId::new(mode.to_string(), size),
                &records,
                |b, records| b.iter(|| black_box(fleet_edges(mode, records))),
            );
        }
    }
    group.finish();
}

fn bench_hop_table_replay(c: &mut Criterion) {
    let mut group = c.benchmark_group("kt-03-hop-table");
    let key = ContentKey::from_payload(b"bench");
    for length in [100u64, 1000, 10_000] {
        let events = walk(key, length);
        group.throughput(Throughput::Elements(length));
        group.bench_with_input(BenchmarkId::new("replay", length), &events, |b, events| {
            b.iter(|| {
                let mut table = HopTable::new();
                table.begin_query(&key);
                for event in events {
                    table.apply(event);
                }
                black_box(table.provider_hops(&key))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_fleet_edges, bench_hop_table_replay);
criterion_main!(benches);
