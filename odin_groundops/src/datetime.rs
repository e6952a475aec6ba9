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

/// absolute instants and time windows used by the replay engine.
/// All session times are epoch based, the replay clock only adds elapsed offsets to a window start

use chrono::{DateTime, TimeZone, Utc};
use serde::{Serialize,Deserialize,Deserializer};
use std::time::Duration;
use std::fmt;
use parse_duration::parse;

use crate::errors::{OdinGroundOpsError,Result};

#[derive(Serialize,Deserialize,Debug,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash)]
#[serde(transparent)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub fn now ()->Self { EpochMillis( Utc::now().timestamp_millis()) }

    pub fn new(millis:i64)->Self { EpochMillis(millis) }

    pub fn from_secs(secs: i64)->Self { EpochMillis(secs.saturating_mul(1000)) }

    pub fn millis(&self)->i64 { self.0 }

    /// instant arithmetic saturates at the i64 bounds, session records can carry arbitrary values
    pub fn offset_by (&self, dur: Duration)->Self {
        let millis = i64::try_from( dur.as_millis()).unwrap_or( i64::MAX);
        EpochMillis( self.0.saturating_add( millis))
    }

    pub fn offset_by_millis (&self, millis: i64)->Self { EpochMillis( self.0.saturating_add( millis)) }

    /// signed difference in milliseconds (negative if other is later)
    pub fn millis_since (&self, other: EpochMillis)->i64 { self.0.saturating_sub( other.0) }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match DateTime::<Utc>::from_timestamp_millis(self.0) {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}ms", self.0)
        }
    }
}

impl<Tz> From<DateTime<Tz>> for EpochMillis where Tz: TimeZone {
    fn from (date: DateTime<Tz>)->Self { EpochMillis(date.timestamp_millis()) }
}

/// the operational time window of a session. Invariant: start < end
#[derive(Serialize,Debug,Clone,Copy,PartialEq)]
pub struct TimeWindow {
    start: EpochMillis,
    end: EpochMillis,
}

impl TimeWindow {
    pub fn new (start: EpochMillis, end: EpochMillis)->Result<Self> {
        if start < end {
            Ok( TimeWindow{ start, end } )
        } else {
            Err( OdinGroundOpsError::InvalidTimeWindow( format!("start {start} not before end {end}")))
        }
    }

    pub fn start (&self)->EpochMillis { self.start }
    pub fn end (&self)->EpochMillis { self.end }

    pub fn duration_millis (&self)->i64 { self.end.millis_since( self.start) }

    pub fn duration (&self)->Duration { Duration::from_millis( self.duration_millis() as u64) }

    pub fn contains (&self, t: EpochMillis)->bool { t >= self.start && t <= self.end }

    pub fn clamp (&self, t: EpochMillis)->EpochMillis { t.max( self.start).min( self.end) }

    /// the instant at the given fraction of the window, fraction is clamped to [0,1]
    pub fn at_fraction (&self, fraction: f64)->EpochMillis {
        let f = if fraction.is_nan() { 0.0 } else { fraction.clamp( 0.0, 1.0) };
        self.start.offset_by_millis( (f * self.duration_millis() as f64).round() as i64)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.start, self.end)
    }
}

// deserialization has to go through the ctor so that we never get a window that violates start < end
impl<'de> Deserialize<'de> for TimeWindow {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error> where D: Deserializer<'de> {
        #[derive(Deserialize)]
        struct RawTimeWindow { start: EpochMillis, end: EpochMillis }

        let raw = RawTimeWindow::deserialize(deserializer)?;
        TimeWindow::new( raw.start, raw.end).map_err( serde::de::Error::custom)
    }
}

#[inline] pub fn millis (n: u64)->Duration { Duration::from_millis(n) }
#[inline] pub fn secs (n: u64)->Duration { Duration::from_secs(n) }
#[inline] pub fn minutes (n: u64)->Duration { Duration::from_secs(n * 60) }

//--- support for serde

pub fn deserialize_duration <'a,D>(deserializer: D) -> std::result::Result<Duration,D::Error>
    where D: Deserializer<'a>
{
    String::deserialize(deserializer).and_then( |string| {
        parse(string.as_str())
            .map_err( |e| serde::de::Error::custom(format!("{:?}",e)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_fraction () {
        let w = TimeWindow::new( EpochMillis::new(1000), EpochMillis::new(3000)).unwrap();
        assert_eq!( w.at_fraction(0.5), EpochMillis::new(2000));
        assert_eq!( w.at_fraction(-1.0), EpochMillis::new(1000));
        assert_eq!( w.at_fraction(7.0), EpochMillis::new(3000));
        assert_eq!( w.at_fraction(f64::NAN), EpochMillis::new(1000));
    }

    #[test]
    fn test_invalid_window () {
        assert!( TimeWindow::new( EpochMillis::new(5), EpochMillis::new(5)).is_err());
        assert!( serde_json::from_str::<TimeWindow>(r#"{"start":10,"end":2}"#).is_err());
    }

    #[test]
    fn test_saturating_offsets () {
        let t = EpochMillis::new( i64::MAX - 1000);
        assert_eq!( t.offset_by_millis( 300_000), EpochMillis::new( i64::MAX));
        assert_eq!( t.offset_by( Duration::from_secs( 300)), EpochMillis::new( i64::MAX));
        assert_eq!( t.offset_by( Duration::MAX), EpochMillis::new( i64::MAX));
        assert_eq!( EpochMillis::new( i64::MIN).millis_since( t), i64::MIN);
        assert_eq!( EpochMillis::new( 5).offset_by_millis( -3), EpochMillis::new( 2));
    }
}
