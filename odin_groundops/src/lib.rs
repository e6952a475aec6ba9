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

//! temporal replay and live-tracking engine for airport ground operations.
//!
//! For any instant within a session time window this reconstructs a consistent snapshot of all tracked
//! entities (service vehicles and flights), either from recorded task trajectories plus flight phase
//! curves, or from the last-known states of a live event feed while playback is running.
//!
//! Data flow: `TimelineClock` tick -> `SnapshotComposer::compose` -> (`TrajectoryStore` + `PhaseResolver`
//! | `LiveFeedAdapter`) -> `FilterSet` -> `Frame` for the external renderer

pub mod errors;
pub mod datetime;
pub mod geo;
pub mod config;
pub mod model;
pub mod phase;
pub mod trajectory;
pub mod live;
pub mod clock;
pub mod filter;
pub mod composer;
pub mod engine;

pub use errors::{OdinGroundOpsError,Result};
pub use datetime::{EpochMillis,TimeWindow};
pub use geo::GeoPos;
pub use config::{GroundOpsConfig,load_config};
pub use model::{EntityKind,EntitySnapshot,Flight,LiveEvent,ParkingSpot,Session,Task,TrajectorySample};
pub use phase::{Phase,PhaseParams,PhaseResolver,PhaseVisual};
pub use trajectory::TrajectoryStore;
pub use live::{LiveFeedAdapter,LiveGeneration};
pub use clock::{PlayState,TimelineClock};
pub use filter::{EntityTags,FilterSet};
pub use composer::{ComposeMode,Frame,FrameSource,SnapshotComposer};
pub use engine::{EngineCommand,EngineStatus,GroundOpsEngine,GroundOpsHandle};
