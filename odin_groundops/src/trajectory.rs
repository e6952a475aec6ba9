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

use std::collections::{BTreeMap,HashMap};
use tracing::{debug,warn};

use crate::datetime::{EpochMillis,TimeWindow};
use crate::errors::{OdinGroundOpsError,Result};
use crate::model::{Flight,ParkingSpot,Session,Task,TrajectorySample};

/// the immutable record set of a session: recorded task trajectories, flights and parking spots.
/// Records that violate our invariants are repaired or dropped (and logged) when the store is built,
/// lookups never fail because of bad data
#[derive(Debug,Clone)]
pub struct TrajectoryStore {
    airport: String,
    window: TimeWindow,
    tasks: BTreeMap<String,Task>,
    flights: BTreeMap<String,Flight>,
    spots: HashMap<String,ParkingSpot>,
}

impl TrajectoryStore {
    pub fn from_session (session: Session)->Self {
        let Session { airport, window, tasks, flights, parking_spots } = session;

        let spots: HashMap<String,ParkingSpot> = parking_spots.into_iter().map( |s| (s.id.clone(), s)).collect();

        let mut task_map = BTreeMap::new();
        for mut task in tasks {
            let n_dropped = sanitize_samples( &mut task.samples);
            if n_dropped > 0 {
                warn!("dropped {} out of order or invalid samples of task {}", n_dropped, task.id);
            }
            if task.samples.is_empty() {
                debug!("task {} has no trajectory samples", task.id);
            }
            if let Some(prev) = task_map.insert( task.id.clone(), task) {
                warn!("duplicate task {} replaced", prev.id);
            }
        }

        let mut flight_map = BTreeMap::new();
        for mut flight in flights {
            if !spots.contains_key( &flight.parking_spot_id) {
                warn!("ignoring flight {} with unknown parking spot {}", flight.id, flight.parking_spot_id);
                continue;
            }
            if flight.departure_time < flight.arrival_time {
                warn!("departure before arrival for {}, clamped to arrival", flight);
                flight.departure_time = flight.arrival_time;
            }
            if let Some(prev) = flight_map.insert( flight.id.clone(), flight) {
                warn!("duplicate flight {} replaced", prev.id);
            }
        }

        TrajectoryStore { airport, window, tasks: task_map, flights: flight_map, spots }
    }

    pub fn airport (&self)->&str { self.airport.as_str() }
    pub fn window (&self)->&TimeWindow { &self.window }

    pub fn tasks (&self)->impl Iterator<Item=&Task> { self.tasks.values() }
    pub fn task (&self, task_id: &str)->Option<&Task> { self.tasks.get( task_id) }

    pub fn flights (&self)->impl Iterator<Item=&Flight> { self.flights.values() }
    pub fn flight (&self, flight_id: &str)->Option<&Flight> { self.flights.get( flight_id) }

    pub fn parking_spot (&self, spot_id: &str)->Option<&ParkingSpot> { self.spots.get( spot_id) }

    /// the last recorded sample at or before `at`. This is last-known-value sampling, entities hold
    /// their recorded position until the next sample time is reached (we never interpolate).
    /// Returns `Ok(None)` if `at` precedes the first sample or the trajectory is empty
    pub fn sample_task (&self, task_id: &str, at: EpochMillis)->Result<Option<&TrajectorySample>> {
        let task = self.tasks.get( task_id).ok_or_else( || OdinGroundOpsError::EntityNotFound( task_id.to_string()))?;
        Ok( last_sample_at( &task.samples, at) )
    }

    /// the task that is active for a vehicle at the given time (the one with the most recent sample)
    pub fn active_task_of_vehicle (&self, vehicle_id: &str, at: EpochMillis)->Option<&Task> {
        self.tasks.values()
            .filter( |t| t.vehicle_id == vehicle_id)
            .filter_map( |t| last_sample_at( &t.samples, at).map( |s| (t, s.timestamp)))
            .max_by_key( |(_,ts)| *ts)
            .map( |(t,_)| t)
    }
}

fn last_sample_at (samples: &[TrajectorySample], at: EpochMillis)->Option<&TrajectorySample> {
    // samples are sorted, so this is the number of samples with timestamp <= at
    let n = samples.partition_point( |s| s.timestamp <= at);
    if n > 0 { samples.get( n-1) } else { None }
}

/// remove samples that are not in non-decreasing timestamp order or have invalid positions.
/// Returns the number of removed samples
fn sanitize_samples (samples: &mut Vec<TrajectorySample>)->usize {
    let len = samples.len();
    let mut last: Option<EpochMillis> = None;

    samples.retain( |s| {
        let keep = s.position.is_valid() && last.map( |t| s.timestamp >= t).unwrap_or(true);
        if keep { last = Some(s.timestamp) }
        keep
    });

    len - samples.len()
}
