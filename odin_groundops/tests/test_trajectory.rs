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

use odin_groundops::{
    EpochMillis, Flight, GeoPos, OdinGroundOpsError, ParkingSpot, Session, Task, TimeWindow, TrajectorySample, TrajectoryStore
};

// run with "cargo test --test test_trajectory -- --nocapture"

fn sample (t: i64, lon: f64, lat: f64, status: &str)->TrajectorySample {
    TrajectorySample{ timestamp: EpochMillis::new(t), position: GeoPos::from_lon_lat_degrees( lon, lat), status: status.into() }
}

fn task (id: &str, vehicle: &str, samples: Vec<TrajectorySample>)->Task {
    Task{ id: id.into(), vehicle_id: vehicle.into(), driver_id: Some("D1".into()), flight_id: None, samples }
}

fn session (tasks: Vec<Task>, flights: Vec<Flight>)->Session {
    Session {
        airport: "TEST".into(),
        window: TimeWindow::new( EpochMillis::new(0), EpochMillis::new(100_000)).unwrap(),
        tasks,
        flights,
        parking_spots: vec![ ParkingSpot{ id: "P1".into(), position: GeoPos::from_lon_lat_degrees( 10.0, 50.0), approach_heading: 0.0, departure_heading: None } ],
    }
}

#[test]
fn test_last_known_value () {
    let store = TrajectoryStore::from_session( session( vec![
        task( "T1", "V1", vec![ sample( 0, 1.0, 1.0, "A"), sample( 10, 2.0, 2.0, "B") ])
    ], vec![]));

    let s = store.sample_task( "T1", EpochMillis::new(5)).unwrap().unwrap();
    println!("sample at 5: {:?}", s);
    assert_eq!( s.position, GeoPos::from_lon_lat_degrees( 1.0, 1.0)); // held, not interpolated
    assert_eq!( s.status, "A");

    let s = store.sample_task( "T1", EpochMillis::new(10)).unwrap().unwrap();
    assert_eq!( s.status, "B");

    // we keep the last position after the last sample
    let s = store.sample_task( "T1", EpochMillis::new(99_000)).unwrap().unwrap();
    assert_eq!( s.status, "B");

    assert!( store.sample_task( "T1", EpochMillis::new(-1)).unwrap().is_none());
}

#[test]
fn test_missing_data () {
    let store = TrajectoryStore::from_session( session( vec![ task( "T-EMPTY", "V1", vec![]) ], vec![]));

    match store.sample_task( "T-NONE", EpochMillis::new(5)) {
        Err(OdinGroundOpsError::EntityNotFound(id)) => assert_eq!( id, "T-NONE"),
        other => panic!("expected EntityNotFound, got {other:?}")
    }

    for t in [0, 50_000, 100_000] {
        assert!( store.sample_task( "T-EMPTY", EpochMillis::new(t)).unwrap().is_none());
    }
}

#[test]
fn test_repaired_records () {
    let flights = vec![
        Flight{ id: "F1".into(), flight_number: "X1".into(), parking_spot_id: "P1".into(), arrival_time: EpochMillis::new(50), departure_time: EpochMillis::new(10) },
        Flight{ id: "F2".into(), flight_number: "X2".into(), parking_spot_id: "P-UNKNOWN".into(), arrival_time: EpochMillis::new(0), departure_time: EpochMillis::new(10) },
    ];
    let tasks = vec![
        task( "T1", "V1", vec![ sample( 0, 1.0, 1.0, "A"), sample( 20, 2.0, 2.0, "B"), sample( 10, 3.0, 3.0, "C"), sample( 30, 4.0, 4.0, "D") ])
    ];
    let store = TrajectoryStore::from_session( session( tasks, flights));

    let f1 = store.flight("F1").unwrap();
    assert_eq!( f1.departure_time, f1.arrival_time);
    assert!( store.flight("F2").is_none());

    let statuses: Vec<&str> = store.task("T1").unwrap().samples.iter().map( |s| s.status.as_str()).collect();
    assert_eq!( statuses, vec!["A", "B", "D"]);
    assert_eq!( store.sample_task( "T1", EpochMillis::new(25)).unwrap().unwrap().status, "B");
}

#[test]
fn test_active_task_of_vehicle () {
    let store = TrajectoryStore::from_session( session( vec![
        task( "T1", "V1", vec![ sample( 0, 1.0, 1.0, "A") ]),
        task( "T2", "V1", vec![ sample( 50, 2.0, 2.0, "B") ]),
        task( "T3", "V2", vec![ sample( 0, 3.0, 3.0, "C") ]),
    ], vec![]));

    assert_eq!( store.active_task_of_vehicle( "V1", EpochMillis::new(10)).unwrap().id, "T1");
    assert_eq!( store.active_task_of_vehicle( "V1", EpochMillis::new(60)).unwrap().id, "T2");
    assert!( store.active_task_of_vehicle( "V3", EpochMillis::new(60)).is_none());
}

#[test]
fn test_load_session_file () {
    let path = concat!( env!("CARGO_MANIFEST_DIR"), "/resources/session_demo.json");
    let session = Session::from_path( path).unwrap();
    let store = TrajectoryStore::from_session( session);

    println!("loaded {} tasks and {} flights for {} {}", store.tasks().count(), store.flights().count(), store.airport(), store.window());
    assert_eq!( store.airport(), "ZGSZ");
    assert_eq!( store.tasks().count(), 3);
    assert_eq!( store.flights().count(), 2);
    assert!( store.parking_spot("P14").is_some());
}

#[test]
fn test_invalid_window_rejected () {
    let json = r#"{ "airport": "X", "window": { "start": 100, "end": 100 } }"#;
    assert!( Session::from_json_str( json).is_err());
}
