//! Placements racing for the same stock row.

mod common;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use common::Fixture;
use stockflow_core::{AggregateRoot, Money};
use stockflow_infra::PlacementError;

#[test]
fn concurrent_placements_conserve_stock() {
    let fx = Arc::new(Fixture::with_lock_timeout(Duration::from_secs(10)));
    let initial = 100;
    let product = fx.add_product("Widget", "W-1", 250, initial);

    let threads = 8;
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|t| {
            let (fx, barrier) = (fx.clone(), barrier.clone());
            thread::spawn(move || {
                barrier.wait();
                let mut sold = 0i64;
                for i in 0..10u32 {
                    let quantity = 1 + (t as u32 + i) % 3;
                    match fx.coordinator.place_order(fx.request(product, quantity)) {
                        Ok(_) => sold += i64::from(quantity),
                        Err(PlacementError::InsufficientStock { .. }) => {}
                        Err(other) => panic!("unexpected failure: {other:?}"),
                    }
                }
                sold
            })
        })
        .collect();

    let sold: i64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    let remaining = fx.stock(product);

    assert!(remaining >= 0);
    assert_eq!(remaining, initial - sold);

    let (orders, payments, _) = fx.counts();
    assert_eq!(orders, payments);
    // One version bump per committed decrement.
    let version = fx.store.product(product).unwrap().unwrap().version();
    assert_eq!(version as usize, orders);
}

#[test]
fn racing_requests_beyond_stock_leave_one_loser() {
    let fx = Arc::new(Fixture::with_lock_timeout(Duration::from_secs(10)));
    let product = fx.add_product("Widget", "W-1", 250, 10);
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let (fx, barrier) = (fx.clone(), barrier.clone());
            thread::spawn(move || {
                barrier.wait();
                fx.coordinator.place_order(fx.request(product, 6))
            })
        })
        .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(results.iter().any(|r| matches!(
        r,
        Err(PlacementError::InsufficientStock {
            requested: 6,
            available: 4
        })
    )));
    assert_eq!(fx.stock(product), 4);
    assert_eq!(fx.counts().0, 1);
}

#[test]
fn every_committed_order_has_exactly_one_matching_payment() {
    let fx = Arc::new(Fixture::with_lock_timeout(Duration::from_secs(10)));
    let product = fx.add_product("Widget", "W-1", 1_999, 30);
    let barrier = Arc::new(Barrier::new(6));

    let handles: Vec<_> = (0..6u32)
        .map(|t| {
            let (fx, barrier) = (fx.clone(), barrier.clone());
            thread::spawn(move || {
                barrier.wait();
                (0..4)
                    .filter_map(|_| fx.coordinator.place_order(fx.request(product, 1 + t % 2)).ok())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    for placed in handles.into_iter().flat_map(|h| h.join().unwrap()) {
        let lines = fx.store.order_lines(placed.order_id).unwrap();
        let payments = fx.store.payments_for_order(placed.order_id).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(payments.len(), 1);

        let expected = lines[0].unit_price.checked_mul(lines[0].quantity).unwrap();
        assert_eq!(payments[0].amount, expected);
        assert_eq!(placed.total, expected);
    }
}

#[test]
fn a_held_product_does_not_block_other_products() {
    let fx = Fixture::with_lock_timeout(Duration::from_secs(5));
    let hot = fx.add_product("Widget", "W-1", 250, 10);
    let cold = fx.add_product("Gadget", "G-1", 900, 10);

    let mut holder = fx.store.begin();
    holder.lock_product(hot).unwrap();

    let started = Instant::now();
    let placed = fx.coordinator.place_order(fx.request(cold, 2)).unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(placed.total, Money::from_cents(1_800));
    drop(holder);
}

#[test]
fn waiter_succeeds_once_the_holder_commits() {
    let fx = Arc::new(Fixture::with_lock_timeout(Duration::from_secs(5)));
    let product = fx.add_product("Widget", "W-1", 250, 10);

    let started = Arc::new(Barrier::new(2));
    let holder = {
        let (fx, started) = (fx.clone(), started.clone());
        thread::spawn(move || {
            let mut uow = fx.store.begin();
            uow.lock_product(product).unwrap();
            started.wait();
            thread::sleep(Duration::from_millis(50));
            uow.rollback();
        })
    };

    started.wait();
    let placed = fx.coordinator.place_order(fx.request(product, 3)).unwrap();
    holder.join().unwrap();

    assert_eq!(placed.remaining_stock, 7);
}

mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: sequential placements sell exactly what they report, and
        /// the only rejection for a positive quantity is insufficient stock.
        #[test]
        fn placements_account_for_every_unit(
            initial in 0i64..60,
            requests in prop::collection::vec(1u32..15, 1..20)
        ) {
            let fx = Fixture::new();
            let product = fx.add_product("Widget", "W-1", 250, initial);
            let mut sold = 0i64;

            for quantity in requests {
                match fx.coordinator.place_order(fx.request(product, quantity)) {
                    Ok(placed) => {
                        sold += i64::from(quantity);
                        prop_assert_eq!(placed.remaining_stock, initial - sold);
                    }
                    Err(PlacementError::InsufficientStock { requested, available }) => {
                        prop_assert_eq!(requested, quantity);
                        prop_assert_eq!(available, initial - sold);
                    }
                    Err(other) => prop_assert!(false, "unexpected failure: {:?}", other),
                }
            }

            prop_assert_eq!(fx.stock(product), initial - sold);
            let (orders, payments, _) = fx.counts();
            prop_assert_eq!(orders, payments);
        }
    }
}
