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

use std::{fmt, time::{Duration,Instant}};
use serde::Serialize;

use crate::config::GroundOpsConfig;
use crate::datetime::{EpochMillis,TimeWindow};

#[derive(Serialize,Debug,Clone,Copy,PartialEq,Eq)]
#[serde(rename_all="lowercase")]
pub enum PlayState {
    Playing,
    Paused,
}

/// the replay clock of a session. It owns the playback position within the session window.
///
/// While playing, each tick advances the position by the real time elapsed since the previous tick
/// times the speed multiplier, i.e. playback speed does not depend on tick cadence or tick latency.
/// Reaching the end of the window pauses the clock at exactly the window end.
///
/// All time dependent operations have an `*_at(Instant)` variant so that callers (and tests) can
/// supply the real time reference
#[derive(Debug,Clone)]
pub struct TimelineClock {
    window: TimeWindow,
    elapsed: f64, // milliseconds since window start
    speed: f64,
    min_speed: f64,
    max_speed: f64,
    state: PlayState,
    last_tick: Option<Instant>,
}

impl TimelineClock {
    pub fn new (window: TimeWindow, config: &GroundOpsConfig)->Self {
        let min_speed = config.min_speed.min( config.max_speed);
        let max_speed = config.max_speed.max( config.min_speed);
        let mut clock = TimelineClock {
            window,
            elapsed: 0.0,
            speed: 1.0,
            min_speed,
            max_speed,
            state: PlayState::Paused,
            last_tick: None
        };
        clock.set_speed( config.default_speed);
        clock
    }

    pub fn window (&self)->&TimeWindow { &self.window }
    pub fn state (&self)->PlayState { self.state }
    pub fn is_playing (&self)->bool { self.state == PlayState::Playing }
    pub fn speed (&self)->f64 { self.speed }

    fn duration_millis (&self)->f64 { self.window.duration_millis() as f64 }

    /// elapsed replay time since window start
    pub fn now (&self)->Duration { Duration::from_secs_f64( self.elapsed / 1000.0) }

    pub fn elapsed_millis (&self)->i64 { self.elapsed.floor() as i64 }

    /// the absolute instant the clock is at
    pub fn current_time (&self)->EpochMillis { self.window.start().offset_by_millis( self.elapsed_millis()) }

    pub fn fraction (&self)->f64 { self.elapsed / self.duration_millis() }

    pub fn play (&mut self) { self.play_at( Instant::now()) }

    /// start playback. Playing from the end of the window restarts at the window start
    pub fn play_at (&mut self, now: Instant) {
        if self.state == PlayState::Playing { return }

        if self.elapsed >= self.duration_millis() {
            self.elapsed = 0.0;
        }
        self.state = PlayState::Playing;
        self.last_tick = Some(now);
    }

    pub fn pause (&mut self) {
        self.state = PlayState::Paused;
        self.last_tick = None;
    }

    pub fn reset (&mut self) {
        self.elapsed = 0.0;
        self.pause();
    }

    /// jump to the given fraction of the window (clamped to [0,1]) without changing the play state
    pub fn scrub (&mut self, fraction: f64) {
        let f = if fraction.is_nan() { 0.0 } else { fraction.clamp( 0.0, 1.0) };
        self.elapsed = f * self.duration_millis();
    }

    /// set the speed multiplier, clamped to the configured bounds
    pub fn set_speed (&mut self, multiplier: f64) {
        self.speed = if multiplier.is_nan() { self.min_speed } else { multiplier.clamp( self.min_speed, self.max_speed) };
    }

    pub fn tick (&mut self)->bool { self.tick_at( Instant::now()) }

    /// advance if playing. Returns true if the clock advanced, which is when a new frame has to be composed
    pub fn tick_at (&mut self, now: Instant)->bool {
        if self.state != PlayState::Playing { return false }

        let dt = match self.last_tick {
            Some(last) => now.saturating_duration_since( last),
            None => Duration::ZERO
        };
        self.last_tick = Some(now);

        let duration = self.duration_millis();
        self.elapsed += (dt.as_nanos() as f64 / 1_000_000.0) * self.speed;

        if self.elapsed >= duration {
            self.elapsed = duration;
            self.pause();
        }
        true
    }
}

impl fmt::Display for TimelineClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!( f, "TimelineClock( {:?}, time: {}, elapsed: {}ms, speed: {})", self.state, self.current_time(), self.elapsed_millis(), self.speed)
    }
}
