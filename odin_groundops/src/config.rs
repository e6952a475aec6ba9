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

use std::{fs, path::Path, time::Duration};
use serde::Deserialize;

use crate::datetime::{self, deserialize_duration};
use crate::errors::Result;

/// runtime configuration of the replay engine, normally loaded from `configs/groundops.ron`.
/// All fields have defaults so config files only have to name what they change
#[derive(Deserialize,Debug,Clone)]
#[serde(default)]
pub struct GroundOpsConfig {
    #[serde(deserialize_with="deserialize_duration")]
    pub tick_interval: Duration, // real time between clock ticks

    pub default_speed: f64,
    pub min_speed: f64,
    pub max_speed: f64,

    #[serde(deserialize_with="deserialize_duration")]
    pub arrival_duration: Duration,
    #[serde(deserialize_with="deserialize_duration")]
    pub departure_duration: Duration,

    pub base_offset: f64, // meters between parking spot and start/end of taxi animation
    pub departure_rotation: f64, // degrees at the end of the departing phase

    pub arriving_scale: (f64,f64), // clamp bounds for the phase scale
    pub departing_scale: (f64,f64),
    pub arriving_opacity: (f64,f64),
    pub departing_opacity: (f64,f64),

    pub display_scale_min: f64,
    pub display_scale_max: f64,
    pub display_magnification: f64, // renderers size icons against this

    pub frame_queue: usize, // capacity of the renderer frame channel
}

impl Default for GroundOpsConfig {
    fn default()->Self {
        GroundOpsConfig {
            tick_interval: datetime::millis(100),

            default_speed: 1.0,
            min_speed: 0.5,
            max_speed: 5.0,

            arrival_duration: datetime::minutes(2),
            departure_duration: datetime::minutes(5),

            base_offset: 250.0,
            departure_rotation: 30.0,

            arriving_scale: (0.5, 2.0),
            departing_scale: (0.5, 2.0),
            arriving_opacity: (0.3, 1.0),
            departing_opacity: (0.2, 1.0),

            display_scale_min: 0.8,
            display_scale_max: 2.5,
            display_magnification: 1.5,

            frame_queue: 32,
        }
    }
}

impl GroundOpsConfig {
    pub fn from_ron_str (s: &str)->Result<Self> {
        Ok( ron::from_str(s)? )
    }
}

/// load a RON config from the given path
pub fn load_config (path: impl AsRef<Path>)->Result<GroundOpsConfig> {
    let data = fs::read_to_string( path.as_ref())?;
    GroundOpsConfig::from_ron_str( &data)
}
