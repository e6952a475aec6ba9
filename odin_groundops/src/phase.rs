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

/// the visual lifecycle of flights at their parking spot.
/// Everything here is a pure function of flight timestamps and the requested instant, there is no
/// animation state. Replaying the same instant always yields identical visual parameters

use std::fmt;
use serde::{Serialize,Deserialize};

use crate::config::GroundOpsConfig;
use crate::datetime::EpochMillis;
use crate::geo::{GeoPos,normalize_360};
use crate::model::{Flight,ParkingSpot};

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,Hash)]
#[serde(rename_all="lowercase")]
pub enum Phase {
    Arriving,
    Parked,
    Departing,
    Departed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Arriving => "arriving",
            Phase::Parked => "parked",
            Phase::Departing => "departing",
            Phase::Departed => "departed",
        };
        write!(f, "{s}")
    }
}

/// the constants of the phase curves
#[derive(Debug,Clone,PartialEq)]
pub struct PhaseParams {
    pub arrival_millis: i64,
    pub departure_millis: i64,
    pub base_offset: f64,
    pub departure_rotation: f64,
    pub arriving_scale: (f64,f64),
    pub departing_scale: (f64,f64),
    pub arriving_opacity: (f64,f64),
    pub departing_opacity: (f64,f64),
    pub display_scale_min: f64,
    pub display_scale_max: f64,
    pub display_magnification: f64,
}

impl From<&GroundOpsConfig> for PhaseParams {
    fn from (config: &GroundOpsConfig)->Self {
        PhaseParams {
            // zero length phases would divide by zero
            arrival_millis: (config.arrival_duration.as_millis() as i64).max(1),
            departure_millis: (config.departure_duration.as_millis() as i64).max(1),
            base_offset: config.base_offset,
            departure_rotation: config.departure_rotation,
            arriving_scale: config.arriving_scale,
            departing_scale: config.departing_scale,
            arriving_opacity: config.arriving_opacity,
            departing_opacity: config.departing_opacity,
            display_scale_min: config.display_scale_min,
            display_scale_max: config.display_scale_max,
            display_magnification: config.display_magnification,
        }
    }
}

impl Default for PhaseParams {
    fn default()->Self { PhaseParams::from( &GroundOpsConfig::default()) }
}

/// resolved visual parameters of a visible flight.
/// `offset` is in meters along `offset_bearing` (degrees) from the parking spot, `rotation` is in degrees
/// and `scale` is the phase scale (before display magnification)
#[derive(Debug,Clone,Copy,PartialEq)]
pub struct PhaseVisual {
    pub phase: Phase,
    pub progress: f64,
    pub offset: f64,
    pub offset_bearing: f64,
    pub rotation: f64,
    pub scale: f64,
    pub opacity: f64,
}

impl PhaseVisual {
    pub fn parked ()->Self {
        PhaseVisual { phase: Phase::Parked, progress: 0.0, offset: 0.0, offset_bearing: 0.0, rotation: 0.0, scale: 1.0, opacity: 1.0 }
    }

    pub fn position_from (&self, spot: &GeoPos)->GeoPos {
        spot.offset_by( self.offset_bearing, self.offset)
    }
}

#[inline]
fn clamp (x: f64, bounds: (f64,f64))->f64 { x.max( bounds.0).min( bounds.1) }

#[inline]
fn progress (elapsed_millis: i64, phase_millis: i64)->f64 {
    (elapsed_millis as f64 / phase_millis as f64).clamp( 0.0, 1.0)
}

#[derive(Debug,Clone,Default)]
pub struct PhaseResolver {
    params: PhaseParams,
}

impl PhaseResolver {
    pub fn new (params: PhaseParams)->Self { PhaseResolver{ params } }

    pub fn params (&self)->&PhaseParams { &self.params }

    /// the phase a flight is in at the given time, None if it has not arrived yet.
    /// Departure times before the arrival are treated as departing upon arrival, and the arriving
    /// phase gets cut short if the flight departs before it is completed (empty parked window)
    pub fn phase_at (&self, flight: &Flight, at: EpochMillis)->Option<Phase> {
        let arrival = flight.arrival_time;
        let departure = flight.departure_time.max( arrival);

        if at < arrival {
            None
        } else if at >= departure.offset_by_millis( self.params.departure_millis) {
            Some(Phase::Departed)
        } else if at >= departure {
            Some(Phase::Departing)
        } else if at >= arrival.offset_by_millis( self.params.arrival_millis) {
            Some(Phase::Parked)
        } else {
            Some(Phase::Arriving)
        }
    }

    /// visual parameters of a flight at the given time, None if the flight is not visible
    /// (not arrived yet or departed)
    pub fn resolve (&self, flight: &Flight, spot: &ParkingSpot, at: EpochMillis)->Option<PhaseVisual> {
        let phase = self.phase_at( flight, at)?;
        let p = match phase {
            Phase::Arriving => progress( at.millis_since( flight.arrival_time), self.params.arrival_millis),
            Phase::Departing => progress( at.millis_since( flight.departure_time.max( flight.arrival_time)), self.params.departure_millis),
            _ => 0.0
        };

        let bearing = match phase {
            Phase::Arriving => normalize_360( spot.approach_heading + 180.0), // we come in along the approach axis
            _ => normalize_360( spot.departure_heading())
        };

        self.visual_for( phase, p, bearing)
    }

    /// the phase curves for a given phase and progress, None for `Departed`
    pub fn visual_for (&self, phase: Phase, progress: f64, offset_bearing: f64)->Option<PhaseVisual> {
        let pr = &self.params;
        let progress = if progress.is_nan() { 0.0 } else { progress.clamp( 0.0, 1.0) };

        match phase {
            Phase::Arriving => Some( PhaseVisual {
                phase,
                progress,
                offset: pr.base_offset * (1.0 - progress),
                offset_bearing,
                rotation: 0.0,
                scale: clamp( 0.5 + 0.5 * progress, pr.arriving_scale),
                opacity: clamp( 0.5 + 0.5 * progress, pr.arriving_opacity),
            }),
            Phase::Parked => Some( PhaseVisual { offset_bearing, ..PhaseVisual::parked() }),
            Phase::Departing => Some( PhaseVisual {
                phase,
                progress,
                offset: pr.base_offset * progress,
                offset_bearing,
                rotation: pr.departure_rotation * progress,
                scale: clamp( 1.0 + 0.3 * progress, pr.departing_scale),
                opacity: clamp( 1.0 - 0.8 * progress, pr.departing_opacity),
            }),
            Phase::Departed => None
        }
    }

    /// the scale renderers get: the phase scale clamped to the display range, then magnified.
    /// Both stages are required since icons are sized against the magnification
    pub fn display_scale (&self, scale: f64)->f64 {
        let pr = &self.params;
        scale.max( pr.display_scale_min).min( pr.display_scale_max) * pr.display_magnification
    }
}
