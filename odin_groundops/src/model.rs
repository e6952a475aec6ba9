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

/// the session records the engine is handed (tasks with recorded trajectories, flights and
/// parking spots) and the types that cross the engine's input and output boundaries

use std::{fmt, fs, path::Path};
use serde::{Serialize,Deserialize};

use crate::datetime::{EpochMillis,TimeWindow};
use crate::geo::GeoPos;
use crate::phase::Phase;
use crate::errors::Result;

/* #region session records ****************************************************************************/

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct TrajectorySample {
    pub timestamp: EpochMillis,
    pub position: GeoPos,
    #[serde(default)]
    pub status: String,
}

/// a ground operations task executed by one vehicle/driver. Samples have to be in non-decreasing
/// timestamp order, out of order samples are dropped when the TrajectoryStore is built
#[derive(Serialize,Deserialize,Debug,Clone)]
#[serde(rename_all="camelCase")]
pub struct Task {
    pub id: String,
    pub vehicle_id: String,
    #[serde(default)]
    pub driver_id: Option<String>,
    #[serde(default)]
    pub flight_id: Option<String>,
    #[serde(default)]
    pub samples: Vec<TrajectorySample>,
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct Flight {
    pub id: String,
    pub flight_number: String,
    pub parking_spot_id: String,
    pub arrival_time: EpochMillis,
    pub departure_time: EpochMillis,
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "Flight( id: {}, no: {}, spot: {}, arr: {}, dep: {})", 
                self.id, self.flight_number, self.parking_spot_id, self.arrival_time, self.departure_time)
    }
}

#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct ParkingSpot {
    pub id: String,
    pub position: GeoPos,
    /// heading (degrees from north) of aircraft taxiing into the spot
    #[serde(default)]
    pub approach_heading: f64,
    /// heading of aircraft leaving the spot, defaults to the approach heading
    #[serde(default)]
    pub departure_heading: Option<f64>,
}

impl ParkingSpot {
    pub fn departure_heading (&self)->f64 { self.departure_heading.unwrap_or( self.approach_heading) }
}

/// everything that is loaded when the operator selects an airport and time range.
/// This is immutable for the lifetime of a session
#[derive(Serialize,Deserialize,Debug,Clone)]
#[serde(rename_all="camelCase")]
pub struct Session {
    #[serde(default)]
    pub airport: String,
    pub window: TimeWindow,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub flights: Vec<Flight>,
    #[serde(default)]
    pub parking_spots: Vec<ParkingSpot>,
}

impl Session {
    pub fn from_json_str (s: &str)->Result<Self> {
        Ok( serde_json::from_str(s)? )
    }

    pub fn from_path (path: impl AsRef<Path>)->Result<Self> {
        let data = fs::read( path.as_ref())?;
        Ok( serde_json::from_slice( data.as_slice())? )
    }
}

/* #endregion session records */

/* #region engine boundary types *********************************************************************/

/// note that live payloads for tasks are reported as the vehicle executing the task
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
#[serde(rename_all="lowercase")]
pub enum EntityKind {
    #[serde(alias="task")]
    Vehicle,
    Flight,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Vehicle => write!(f, "vehicle"),
            EntityKind::Flight => write!(f, "flight"),
        }
    }
}

/// the fully resolved visual state of one entity at one instant. This is the only type
/// we hand out to renderers. `scale` already includes the display magnification
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct EntitySnapshot {
    pub entity_id: String,
    pub kind: EntityKind,
    pub position: GeoPos,
    pub rotation: f64,
    pub scale: f64,
    pub opacity: f64,
    pub status: String,
    pub source_timestamp: EpochMillis,
    /// the task a vehicle executes, if known. Vehicles are identified by vehicle id in both replay and
    /// live frames so that renderers can track them across source switches
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub task_id: Option<String>,
}

impl fmt::Display for EntitySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "{}( {}, pos: {}, rot: {:.1}, scale: {:.3}, opacity: {:.3}, status: \"{}\", time: {})",
                self.kind, self.entity_id, self.position, self.rotation, self.scale, self.opacity, self.status, self.source_timestamp)
    }
}

/// a state update pushed by the live server connection
#[derive(Serialize,Deserialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct LiveEvent {
    #[serde(alias="id")]
    pub entity_id: String,
    #[serde(alias="type")]
    pub kind: EntityKind,
    pub position: GeoPos,
    #[serde(default)]
    pub status: String,
    pub timestamp: EpochMillis,

    // optional visual lifecycle information
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub phase: Option<Phase>,
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub progress: Option<f64>,

    // optional task metadata (used for filtering)
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub vehicle_id: Option<String>,
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub driver_id: Option<String>,
    #[serde(default, skip_serializing_if="Option::is_none")]
    pub task_id: Option<String>,
}

impl LiveEvent {
    pub fn new (entity_id: impl ToString, kind: EntityKind, position: GeoPos, status: impl ToString, timestamp: EpochMillis)->Self {
        LiveEvent {
            entity_id: entity_id.to_string(),
            kind,
            position,
            status: status.to_string(),
            timestamp,
            phase: None,
            progress: None,
            vehicle_id: None,
            driver_id: None,
            task_id: None
        }
    }

    /// vehicle events without explicit vehicle id are reported under the vehicle id
    pub fn vehicle_id (&self)->Option<&str> {
        match (&self.vehicle_id, self.kind) {
            (Some(id), _) => Some(id.as_str()),
            (None, EntityKind::Vehicle) => Some(self.entity_id.as_str()),
            (None, EntityKind::Flight) => None,
        }
    }
}

impl fmt::Display for LiveEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "LiveEvent( {} {}, pos: {}, status: \"{}\", time: {}", self.kind, self.entity_id, self.position, self.status, self.timestamp)?;
        if let Some(phase) = &self.phase { write!( f, ", phase: {phase}")?; }
        write!( f, ")")
    }
}

/* #endregion engine boundary types */
