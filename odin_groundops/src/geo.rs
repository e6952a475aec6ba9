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

use std::fmt;
use serde::{Serialize,Deserialize};
use geo::{Destination, Haversine, Point};

/// geodetic position in degrees. We accept the `geo` style x/y field names on input
#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq)]
pub struct GeoPos {
    #[serde(alias="longitude", alias="x")]
    pub lon: f64,
    #[serde(alias="latitude", alias="y")]
    pub lat: f64,
}

impl GeoPos {
    pub fn from_lon_lat_degrees (lon: f64, lat: f64)->Self { GeoPos{ lon, lat } }

    pub fn from_point (p: Point)->Self { GeoPos{ lon: p.x(), lat: p.y() } }

    pub fn point (&self)->Point { Point::new( self.lon, self.lat) }

    pub fn is_valid (&self)->bool {
        self.lon.is_finite() && self.lat.is_finite() && self.lat.abs() <= 90.0 && self.lon.abs() <= 180.0
    }

    /// displace by `meters` along the great circle with initial `bearing_deg` (clockwise from north)
    pub fn offset_by (&self, bearing_deg: f64, meters: f64)->GeoPos {
        if meters == 0.0 { return *self }

        GeoPos::from_point( Haversine.destination( self.point(), bearing_deg, meters))
    }
}

impl From<Point> for GeoPos {
    fn from (p: Point)->Self { GeoPos::from_point(p) }
}

impl From<GeoPos> for Point {
    fn from (pos: GeoPos)->Self { pos.point() }
}

impl fmt::Display for GeoPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.6},{:.6}]", self.lon, self.lat)
    }
}

/// normalize degrees into [0,360)
#[inline]
pub fn normalize_360 (deg: f64)->f64 {
    let d = deg % 360.0;
    if d < 0.0 { d + 360.0 } else { d }
}
