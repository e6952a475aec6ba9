/*
 * Copyright © 2025, United States Government, as represented by the Administrator of 
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License"); 
 * you may not use this file except in compliance with the License. You may obtain a copy 
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

use std::time::Duration;
use futures::{channel::mpsc, stream};
use odin_groundops::{EntityKind, EpochMillis, GeoPos, LiveEvent, LiveFeedAdapter};

// run with "cargo test --test test_live -- --nocapture"

fn payload (id: &str, t: i64, lon: f64)->String {
    let e = LiveEvent::new( id, EntityKind::Vehicle, GeoPos::from_lon_lat_degrees( lon, 22.6), "enroute", EpochMillis::new(t));
    serde_json::to_string( &e).unwrap()
}

fn ok (s: String)->Result<String,String> { Ok(s) }

async fn wait_for<F> (mut cond: F) where F: FnMut()->bool {
    for _ in 0..200 {
        if cond() { return }
        tokio::time::sleep( Duration::from_millis(10)).await;
    }
    panic!("condition not met within 2sec");
}

#[tokio::test]
async fn test_out_of_order_dropped () {
    let mut live = LiveFeedAdapter::new();
    live.bind( stream::iter( vec![ ok(payload("V1", 5, 1.0)), ok(payload("V1", 3, 2.0)) ]));
    wait_for( || !live.is_consuming()).await;

    let e = live.snapshot_of("V1").unwrap();
    println!("retained: {e}");
    assert_eq!( e.timestamp, EpochMillis::new(5));
    assert_eq!( e.position.lon, 1.0);
}

#[tokio::test]
async fn test_malformed_events_do_not_halt () {
    let mut live = LiveFeedAdapter::new();
    live.bind( stream::iter( vec![
        ok(payload("V1", 1, 1.0)),
        ok("{ not an event".to_string()),
        ok(r#"{"id":"V2","type":"submarine","position":{"lon":1,"lat":2},"timestamp":3}"#.to_string()),
        ok(payload("V2", 2, 2.0)),
    ]));
    wait_for( || !live.is_consuming()).await;

    assert_eq!( live.len(), 2);
    assert_eq!( live.snapshot_of("V2").unwrap().position.lon, 2.0);
}

#[tokio::test]
async fn test_stream_error_freezes_state () {
    let mut live = LiveFeedAdapter::new();
    live.bind( stream::iter( vec![
        ok(payload("V1", 1, 1.0)),
        Err("connection reset".to_string()),
        ok(payload("V2", 2, 2.0)),
    ]));
    wait_for( || !live.is_consuming()).await;

    assert!( live.is_bound());
    assert!( live.snapshot_of("V1").is_some());
    assert!( live.snapshot_of("V2").is_none());
}

#[tokio::test]
async fn test_signal_and_unbind () {
    let mut live = LiveFeedAdapter::new();
    let mut signal = live.subscribe();
    let (tx,rx) = mpsc::unbounded::<Result<String,String>>();
    live.bind( rx);

    tx.unbounded_send( ok(payload("V1", 10, 1.0))).unwrap();
    tokio::time::timeout( Duration::from_secs(2), signal.changed()).await.expect("no signal").unwrap();
    assert_eq!( live.snapshot_of("V1").unwrap().timestamp, EpochMillis::new(10));

    // stale push is not admitted and not signaled
    tx.unbounded_send( ok(payload("V1", 4, 9.0))).unwrap();
    tx.unbounded_send( ok(payload("V1", 11, 2.0))).unwrap();
    wait_for( || live.snapshot_of("V1").map( |e| e.timestamp == EpochMillis::new(11)).unwrap_or(false)).await;
    assert_eq!( live.snapshot_of("V1").unwrap().position.lon, 2.0);

    live.unbind();
    assert!( live.is_empty());
    assert!( !live.is_bound());

    // the consumer drops its end of the sequence
    wait_for( || tx.is_closed()).await;
    assert!( tx.unbounded_send( ok(payload("V1", 20, 3.0))).is_err());
    assert!( live.is_empty());
}

#[tokio::test]
async fn test_rebind_clears_state () {
    let mut live = LiveFeedAdapter::new();
    live.bind( stream::iter( vec![ ok(payload("V1", 1, 1.0)) ]));
    wait_for( || !live.is_consuming()).await;
    assert_eq!( live.len(), 1);

    live.bind( stream::iter( vec![ ok(payload("V2", 1, 1.0)) ]));
    wait_for( || !live.is_consuming()).await;
    assert!( live.snapshot_of("V1").is_none());
    assert!( live.snapshot_of("V2").is_some());
}

#[tokio::test(flavor="multi_thread", worker_threads=4)]
async fn test_unbind_while_consuming () {
    let mut live = LiveFeedAdapter::new();
    let mut signal = live.subscribe();
    let mut leaked = 0;

    for round in 0..500 {
        // never pending, the consumer is always busy admitting when we unbind
        let mut t = 0;
        live.bind( stream::repeat_with( move || { t += 1; ok( payload("V1", t, 1.0)) }));
        tokio::time::sleep( Duration::from_micros(50)).await;

        live.unbind();
        let _ = signal.borrow_and_update();
        tokio::time::sleep( Duration::from_millis(1)).await;

        if !live.is_empty() || signal.has_changed().unwrap() {
            println!("round {round}: {} entities, changed: {}", live.len(), signal.has_changed().unwrap());
            leaked += 1;
        }
    }
    assert_eq!( leaked, 0);
}
