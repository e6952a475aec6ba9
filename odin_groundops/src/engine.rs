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

use std::{fmt::Display, sync::Arc};
use futures::{Stream,StreamExt,stream::BoxStream};
use serde::Serialize;
use tokio::{sync::{mpsc,oneshot}, task::JoinHandle, time::{self,MissedTickBehavior}};
use tracing::{debug,info};

use crate::clock::{PlayState,TimelineClock};
use crate::composer::{ComposeMode,Frame,SnapshotComposer};
use crate::config::GroundOpsConfig;
use crate::datetime::EpochMillis;
use crate::errors::{OdinGroundOpsError,Result};
use crate::filter::FilterSet;
use crate::live::LiveFeedAdapter;
use crate::model::Session;
use crate::phase::{PhaseParams,PhaseResolver};
use crate::trajectory::TrajectoryStore;

/// operator commands, executed in the engine task
pub enum EngineCommand {
    Play,
    Pause,
    Reset,
    Scrub(f64),
    SetSpeed(f64),
    SetFilter(FilterSet),
    BindLive(BoxStream<'static,std::result::Result<String,String>>),
    UnbindLive,
    LoadSession(Session),
    Status(oneshot::Sender<EngineStatus>),
    Shutdown,
}

/// a point-in-time view of the engine control state
#[derive(Serialize,Debug,Clone,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct EngineStatus {
    pub airport: String,
    pub state: PlayState,
    pub speed: f64,
    pub time: EpochMillis,
    pub elapsed: i64,
    pub fraction: f64,
    pub filter: FilterSet,
    pub live_bound: bool,
    pub live_entities: usize,
}

/// the replay/live-tracking engine. This owns all session state and runs as a single tokio task that
/// multiplexes the fixed clock tick, operator commands and live update signals. Composed frames are
/// pushed to the renderer through a bounded channel without ever waiting on it
pub struct GroundOpsEngine {
    config: Arc<GroundOpsConfig>,
    clock: TimelineClock,
    store: TrajectoryStore,
    filter: FilterSet,
    composer: SnapshotComposer,
    live: LiveFeedAdapter,
    frame_tx: mpsc::Sender<Frame>,
}

impl GroundOpsEngine {
    pub fn new (config: GroundOpsConfig, session: Session, frame_tx: mpsc::Sender<Frame>)->Self {
        let composer = SnapshotComposer::new( PhaseResolver::new( PhaseParams::from( &config)));
        let store = TrajectoryStore::from_session( session);
        let clock = TimelineClock::new( *store.window(), &config);

        GroundOpsEngine {
            config: Arc::new(config),
            clock,
            store,
            filter: FilterSet::all(),
            composer,
            live: LiveFeedAdapter::new(),
            frame_tx,
        }
    }

    /// start the engine task. Has to be called from within a tokio runtime
    pub fn spawn (config: GroundOpsConfig, session: Session, frame_tx: mpsc::Sender<Frame>)->(GroundOpsHandle,JoinHandle<()>) {
        let (tx,rx) = mpsc::channel(64);
        let engine = GroundOpsEngine::new( config, session, frame_tx);
        let task = tokio::spawn( engine.run( rx));
        (GroundOpsHandle{ tx }, task)
    }

    async fn run (mut self, mut cmd_rx: mpsc::Receiver<EngineCommand>) {
        let mut ticker = time::interval( self.config.tick_interval);
        ticker.set_missed_tick_behavior( MissedTickBehavior::Delay);
        let mut live_rx = self.live.subscribe();

        info!("ground operations engine started for '{}' {}", self.store.airport(), self.store.window());
        self.publish();

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.clock.tick() {
                        self.publish();
                    }
                }
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(EngineCommand::Shutdown) | None => break,
                        Some(cmd) => self.execute( cmd)
                    }
                }
                Ok(_) = live_rx.changed() => {
                    // the clock tick recomposes anyway, this just gets fresh live state out faster
                    if SnapshotComposer::select_mode( &self.clock, &self.live) == ComposeMode::Live {
                        self.publish();
                    }
                }
            }
        }

        self.live.unbind();
        info!("ground operations engine terminated");
    }

    fn execute (&mut self, cmd: EngineCommand) {
        match cmd {
            EngineCommand::Play => {
                self.clock.play();
                self.publish();
            }
            EngineCommand::Pause => {
                self.clock.pause();
                self.publish(); // this might switch us from live back to replay
            }
            EngineCommand::Reset => {
                self.clock.reset();
                self.publish();
            }
            EngineCommand::Scrub(fraction) => {
                self.clock.scrub( fraction);
                self.publish();
            }
            EngineCommand::SetSpeed(multiplier) => {
                self.clock.set_speed( multiplier);
                debug!("playback speed set to {}", self.clock.speed());
            }
            EngineCommand::SetFilter(filter) => {
                debug!("filter set to {}", filter);
                self.filter = filter;
                self.publish();
            }
            EngineCommand::BindLive(events) => {
                self.live.bind( events);
            }
            EngineCommand::UnbindLive => {
                self.live.unbind();
                self.publish();
            }
            EngineCommand::LoadSession(session) => {
                self.load_session( session);
                self.publish();
            }
            EngineCommand::Status(tx) => {
                if tx.send( self.status()).is_err() {
                    debug!("status requester gone");
                }
            }
            EngineCommand::Shutdown => {} // handled by run loop
        }
    }

    /// switching sessions drops everything that was derived from the old one, including live state
    fn load_session (&mut self, session: Session) {
        self.live.unbind();
        self.store = TrajectoryStore::from_session( session);
        self.clock = TimelineClock::new( *self.store.window(), &self.config);
        self.filter = FilterSet::all();
        info!("loaded session for '{}' {}", self.store.airport(), self.store.window());
    }

    fn status (&self)->EngineStatus {
        EngineStatus {
            airport: self.store.airport().to_string(),
            state: self.clock.state(),
            speed: self.clock.speed(),
            time: self.clock.current_time(),
            elapsed: self.clock.elapsed_millis(),
            fraction: self.clock.fraction(),
            filter: self.filter.clone(),
            live_bound: self.live.is_bound(),
            live_entities: self.live.len(),
        }
    }

    fn publish (&self) {
        let frame = self.composer.compose_frame( &self.clock, &self.store, &self.live, &self.filter);
        match self.frame_tx.try_send( frame) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => debug!("renderer queue full, dropping frame"),
            Err(mpsc::error::TrySendError::Closed(_)) => debug!("renderer gone, dropping frame"),
        }
    }
}

/// the operator control surface of a running engine
#[derive(Clone,Debug)]
pub struct GroundOpsHandle {
    tx: mpsc::Sender<EngineCommand>,
}

impl GroundOpsHandle {
    async fn send (&self, cmd: EngineCommand)->Result<()> {
        self.tx.send( cmd).await.map_err( |_| OdinGroundOpsError::ChannelClosed("engine terminated".into()))
    }

    pub async fn play (&self)->Result<()> { self.send( EngineCommand::Play).await }
    pub async fn pause (&self)->Result<()> { self.send( EngineCommand::Pause).await }
    pub async fn reset (&self)->Result<()> { self.send( EngineCommand::Reset).await }
    pub async fn scrub (&self, fraction: f64)->Result<()> { self.send( EngineCommand::Scrub(fraction)).await }
    pub async fn set_speed (&self, multiplier: f64)->Result<()> { self.send( EngineCommand::SetSpeed(multiplier)).await }
    pub async fn set_filter (&self, filter: FilterSet)->Result<()> { self.send( EngineCommand::SetFilter(filter)).await }
    pub async fn unbind_live (&self)->Result<()> { self.send( EngineCommand::UnbindLive).await }
    pub async fn load_session (&self, session: Session)->Result<()> { self.send( EngineCommand::LoadSession(session)).await }
    pub async fn shutdown (&self)->Result<()> { self.send( EngineCommand::Shutdown).await }

    /// attach a live event sequence of raw JSON payloads (see `LiveFeedAdapter::bind`)
    pub async fn bind_live<S,E> (&self, events: S)->Result<()>
        where S: Stream<Item=std::result::Result<String,E>> + Send + 'static, E: Display + Send + 'static
    {
        let events = events.map( |r| r.map_err( |e| e.to_string())).boxed();
        self.send( EngineCommand::BindLive(events)).await
    }

    pub async fn status (&self)->Result<EngineStatus> {
        let (tx,rx) = oneshot::channel();
        self.send( EngineCommand::Status(tx)).await?;
        rx.await.map_err( |_| OdinGroundOpsError::ChannelClosed("engine dropped status request".into()))
    }
}

impl std::fmt::Debug for EngineCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineCommand::Play => write!(f, "Play"),
            EngineCommand::Pause => write!(f, "Pause"),
            EngineCommand::Reset => write!(f, "Reset"),
            EngineCommand::Scrub(x) => write!(f, "Scrub({x})"),
            EngineCommand::SetSpeed(x) => write!(f, "SetSpeed({x})"),
            EngineCommand::SetFilter(filter) => write!(f, "SetFilter({filter})"),
            EngineCommand::BindLive(_) => write!(f, "BindLive(..)"),
            EngineCommand::UnbindLive => write!(f, "UnbindLive"),
            EngineCommand::LoadSession(s) => write!(f, "LoadSession({})", s.airport),
            EngineCommand::Status(_) => write!(f, "Status"),
            EngineCommand::Shutdown => write!(f, "Shutdown"),
        }
    }
}
