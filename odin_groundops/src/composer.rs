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

use std::collections::BTreeMap;
use serde::Serialize;
use tracing::warn;

use crate::clock::TimelineClock;
use crate::datetime::EpochMillis;
use crate::filter::{EntityTags,FilterSet};
use crate::live::LiveFeedAdapter;
use crate::model::{EntityKind,EntitySnapshot,Flight,LiveEvent};
use crate::phase::{PhaseResolver,PhaseVisual};
use crate::trajectory::TrajectoryStore;

/// where the entity states of a frame come from
#[derive(Debug,Clone,Copy,PartialEq)]
pub enum ComposeMode {
    /// deterministic reconstruction from recorded trajectories and flight phases
    Replay(EpochMillis),
    /// last-known states of the live feed
    Live,
}

#[derive(Serialize,Debug,Clone,Copy,PartialEq,Eq)]
#[serde(rename_all="lowercase")]
pub enum FrameSource {
    Replay,
    Live,
}

/// what we send to renderers for each composed frame
#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct Frame {
    pub source: FrameSource,
    pub time: EpochMillis,
    pub elapsed: i64, // milliseconds since window start
    pub playing: bool,
    pub entities: Vec<EntitySnapshot>,
}

/// turns the session records or the live state into ordered lists of EntitySnapshots.
/// Output is ordered by kind (vehicles first) and entity id. The composer only reads its inputs
#[derive(Debug,Clone,Default)]
pub struct SnapshotComposer {
    resolver: PhaseResolver,
}

impl SnapshotComposer {
    pub fn new (resolver: PhaseResolver)->Self { SnapshotComposer{ resolver } }

    pub fn resolver (&self)->&PhaseResolver { &self.resolver }

    /// live state supersedes recorded trajectories only while the clock is playing and we actually
    /// have live state. Paused or scrubbed clocks always use deterministic replay
    pub fn select_mode (clock: &TimelineClock, live: &LiveFeedAdapter)->ComposeMode {
        if clock.is_playing() && !live.is_empty() {
            ComposeMode::Live
        } else {
            ComposeMode::Replay( clock.current_time())
        }
    }

    pub fn compose (&self, mode: ComposeMode, store: &TrajectoryStore, live: &LiveFeedAdapter, filter: &FilterSet)->Vec<EntitySnapshot> {
        match mode {
            ComposeMode::Replay(at) => self.compose_replay( at, store, filter),
            ComposeMode::Live => self.compose_live( live.entries(), store, filter)
        }
    }

    /// compose a complete frame for the current clock state
    pub fn compose_frame (&self, clock: &TimelineClock, store: &TrajectoryStore, live: &LiveFeedAdapter, filter: &FilterSet)->Frame {
        let mode = Self::select_mode( clock, live);
        let source = match mode {
            ComposeMode::Replay(_) => FrameSource::Replay,
            ComposeMode::Live => FrameSource::Live
        };

        Frame {
            source,
            time: clock.current_time(),
            elapsed: clock.elapsed_millis(),
            playing: clock.is_playing(),
            entities: self.compose( mode, store, live, filter)
        }
    }

    /// vehicles are keyed by vehicle id. If several tasks of the same vehicle have samples at `at`
    /// we use the most recent one since that is where the vehicle was last seen
    fn compose_replay (&self, at: EpochMillis, store: &TrajectoryStore, filter: &FilterSet)->Vec<EntitySnapshot> {
        let mut vehicles: BTreeMap<&str,EntitySnapshot> = BTreeMap::new();

        for task in store.tasks().filter( |t| filter.matches_task(t)) {
            match store.sample_task( &task.id, at) {
                Ok(Some(sample)) => {
                    let is_newer = vehicles.get( task.vehicle_id.as_str()).map( |s| sample.timestamp >= s.source_timestamp).unwrap_or(true);
                    if is_newer {
                        vehicles.insert( &task.vehicle_id, EntitySnapshot {
                            entity_id: task.vehicle_id.clone(),
                            kind: EntityKind::Vehicle,
                            position: sample.position,
                            rotation: 0.0,
                            scale: self.resolver.display_scale( 1.0),
                            opacity: 1.0,
                            status: sample.status.clone(),
                            source_timestamp: sample.timestamp,
                            task_id: Some( task.id.clone()),
                        });
                    }
                }
                Ok(None) => {} // not started yet or no trajectory
                Err(e) => warn!("cannot sample task {}: {}", task.id, e)
            }
        }

        let mut list: Vec<EntitySnapshot> = vehicles.into_values().collect();
        for flight in store.flights() {
            if let Some(snapshot) = self.flight_snapshot( flight, store, at) {
                list.push( snapshot)
            }
        }

        list
    }

    fn flight_snapshot (&self, flight: &Flight, store: &TrajectoryStore, at: EpochMillis)->Option<EntitySnapshot> {
        let spot = store.parking_spot( &flight.parking_spot_id)?;
        let visual = self.resolver.resolve( flight, spot, at)?;

        Some( EntitySnapshot {
            entity_id: flight.id.clone(),
            kind: EntityKind::Flight,
            position: visual.position_from( &spot.position),
            rotation: visual.rotation,
            scale: self.resolver.display_scale( visual.scale),
            opacity: visual.opacity,
            status: visual.phase.to_string(),
            source_timestamp: at,
            task_id: None,
        })
    }

    fn compose_live (&self, events: Vec<LiveEvent>, store: &TrajectoryStore, filter: &FilterSet)->Vec<EntitySnapshot> {
        let mut list: Vec<EntitySnapshot> = events.iter()
            .filter( |e| e.kind == EntityKind::Flight || filter.is_all() || self.matches_live( e, store, filter))
            .filter_map( |e| self.live_snapshot( e))
            .collect();

        list.sort_by( |a,b| a.kind.cmp( &b.kind).then_with( || a.entity_id.cmp( &b.entity_id)));
        list
    }

    /// live payloads might not carry all task metadata, the missing parts are taken from the task
    /// the vehicle executes according to our session records
    fn matches_live (&self, e: &LiveEvent, store: &TrajectoryStore, filter: &FilterSet)->bool {
        let mut tags = EntityTags::from(e);

        if tags.driver_id.is_none() || tags.task_id.is_none() {
            if let Some(task) = tags.vehicle_id.and_then( |vid| store.active_task_of_vehicle( vid, e.timestamp)) {
                let task_tags = EntityTags::from( task);
                tags.driver_id = tags.driver_id.or( task_tags.driver_id);
                tags.task_id = tags.task_id.or( task_tags.task_id);
            }
        }

        filter.matches( &tags)
    }

    /// identity mapping of position and status. Visual parameters are those of a parked entity unless
    /// the payload carries its own phase (departed entities are not visible)
    fn live_snapshot (&self, e: &LiveEvent)->Option<EntitySnapshot> {
        let visual = match e.phase {
            Some(phase) => self.resolver.visual_for( phase, e.progress.unwrap_or(0.0), 0.0)?,
            None => PhaseVisual::parked()
        };

        Some( EntitySnapshot {
            entity_id: e.entity_id.clone(),
            kind: e.kind,
            position: e.position,
            rotation: visual.rotation,
            scale: self.resolver.display_scale( visual.scale),
            opacity: visual.opacity,
            status: e.status.clone(),
            source_timestamp: e.timestamp,
            task_id: e.task_id.clone(),
        })
    }
}
