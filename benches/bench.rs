// Criterion benchmarks for Relief Match

use chrono::{Duration, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use relief_match::core::{planner::AllocationPlanner, proximity::proximity_score, MatchOrchestrator};
use relief_match::models::{Donation, DonationStatus, NewDonation, NewRequest, Request, RequestId, RequestStatus};
use relief_match::services::InMemoryStore;

const AREAS: &[&str] = &["Kothrud, Pune", "Baner-Pune", "Pune Camp", "Navi Mumbai", "Shivaji Nagar", "Delhi"];

fn create_candidate(id: usize) -> Donation {
    Donation {
        id: id as i64,
        donor_id: id as i64,
        item_name: "rice".to_string(),
        category: "food".to_string(),
        location: Some(AREAS[id % AREAS.len()].to_string()),
        quantity: 1 + (id % 7) as i64,
        quantity_remaining: Some(1 + (id % 7) as i64),
        status: DonationStatus::Available,
        created_at: Some(Utc::now() - Duration::minutes(id as i64)),
    }
}

fn create_request(quantity: i64) -> Request {
    Request {
        id: RequestId::new(1).unwrap(),
        recipient_id: 1,
        item_name: "rice".to_string(),
        category: "food".to_string(),
        location: Some("Pune".to_string()),
        quantity: Some(quantity),
        quantity_remaining: Some(quantity),
        status: RequestStatus::Open,
        created_at: None,
    }
}

fn bench_proximity_score(c: &mut Criterion) {
    c.bench_function("proximity_score", |b| {
        b.iter(|| proximity_score(black_box(Some("Kothrud, Pune")), black_box(Some("Pune Camp"))));
    });
}

fn bench_plan(c: &mut Criterion) {
    let planner = AllocationPlanner::new();
    let mut group = c.benchmark_group("allocation_plan");

    for size in [10usize, 100, 1000] {
        let candidates: Vec<Donation> = (0..size).map(create_candidate).collect();
        let request = create_request(size as i64 * 2);
        group.bench_with_input(BenchmarkId::from_parameter(size), &candidates, |b, candidates| {
            b.iter(|| planner.plan(black_box(&request), candidates.clone()));
        });
    }

    group.finish();
}

fn bench_run_in_memory(c: &mut Criterion) {
    c.bench_function("orchestrator_run_in_memory_100", |b| {
        b.iter(|| {
            tokio_test::block_on(async {
                let store = InMemoryStore::new();
                for id in 0..100 {
                    let d = create_candidate(id);
                    store
                        .add_donation(NewDonation {
                            donor_id: d.donor_id,
                            item_name: d.item_name,
                            category: d.category,
                            location: d.location,
                            quantity: d.quantity,
                        })
                        .await;
                }
                let request = store
                    .add_request(NewRequest {
                        recipient_id: 1,
                        item_name: "rice".to_string(),
                        category: "food".to_string(),
                        location: Some("Pune".to_string()),
                        quantity: 150,
                    })
                    .await;
                MatchOrchestrator::new(store).run(request.id).await
            })
        });
    });
}

criterion_group!(benches, bench_proximity_score, bench_plan, bench_run_in_memory);
criterion_main!(benches);
