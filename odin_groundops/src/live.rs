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
use dashmap::{DashMap, mapref::entry::Entry};
use futures::{Stream,StreamExt};
use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug,info,warn};

use crate::errors::{OdinGroundOpsError,Result,parse_error};
use crate::model::LiveEvent;

/// the last-known state of live entities, fed by an external (server push) event sequence.
///
/// The adapter is the only writer of its snapshot map. Events are admitted per entity in monotonic
/// timestamp order, a late arriving event that is older than what we already have is dropped so that
/// it cannot roll back a newer state. Each admitted event bumps a generation counter that can be watched
/// by composers (see `subscribe()`), we never block on whoever consumes that signal.
///
/// Snapshot maps belong to a single binding. Unbinding replaces the map and invalidates the binding id
/// of the signal, so a consumer task that is still in flight can neither reach the new map nor notify.
///
/// Consumption runs as its own tokio task, `bind()` therefore has to be called from within a runtime
pub struct LiveFeedAdapter {
    snapshots: Arc<DashMap<String,LiveEvent>>,
    signal: Arc<watch::Sender<LiveGeneration>>,
    binding: Option<LiveBinding>,
}

/// the value of the live update signal
#[derive(Debug,Clone,Copy,PartialEq,Eq,Default)]
pub struct LiveGeneration {
    pub binding: u64,
    pub admitted: u64,
}

struct LiveBinding {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl LiveFeedAdapter {
    pub fn new ()->Self {
        let (tx,_) = watch::channel( LiveGeneration::default());
        LiveFeedAdapter { snapshots: Arc::new( DashMap::new()), signal: Arc::new(tx), binding: None }
    }

    /// receiver that gets notified whenever an event was admitted
    pub fn subscribe (&self)->watch::Receiver<LiveGeneration> { self.signal.subscribe() }

    /// attach to a (possibly infinite) sequence of raw JSON event payloads. Any previous binding
    /// is cancelled and its state cleared first.
    /// Undecodable payloads are dropped, an `Err` item ends consumption and freezes the current state
    pub fn bind<S,E> (&mut self, events: S) where S: Stream<Item=std::result::Result<String,E>> + Send + 'static, E: Display + Send + 'static {
        self.unbind();

        let binding = self.signal.borrow().binding;
        let token = CancellationToken::new();
        let task = tokio::spawn( consume_events( events, binding, self.snapshots.clone(), self.signal.clone(), token.clone()));
        self.binding = Some( LiveBinding{ token, task });
        info!("live feed bound");
    }

    /// detach from the event sequence (dropping it) and clear all live state
    pub fn unbind (&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.token.cancel();
            binding.task.abort();
            info!("live feed unbound");
        }

        // orphan whatever the old consumer still holds, without notifying receivers
        self.signal.send_if_modified( |g| {
            g.binding = g.binding.wrapping_add(1);
            false
        });
        self.snapshots = Arc::new( DashMap::new());
    }

    pub fn is_bound (&self)->bool { self.binding.is_some() }

    /// note this only tells us if the consumer task is still running, not if the map is still valid
    pub fn is_consuming (&self)->bool {
        self.binding.as_ref().map( |b| !b.task.is_finished()).unwrap_or(false)
    }

    pub fn snapshot_of (&self, entity_id: &str)->Option<LiveEvent> {
        self.snapshots.get( entity_id).map( |e| e.value().clone())
    }

    pub fn is_empty (&self)->bool { self.snapshots.is_empty() }
    pub fn len (&self)->usize { self.snapshots.len() }

    /// a copy of all current entity states (in no particular order)
    pub fn entries (&self)->Vec<LiveEvent> {
        self.snapshots.iter().map( |e| e.value().clone()).collect()
    }
}

impl Default for LiveFeedAdapter {
    fn default()->Self { LiveFeedAdapter::new() }
}

impl Drop for LiveFeedAdapter {
    fn drop (&mut self) {
        if let Some(binding) = self.binding.take() {
            binding.token.cancel();
            binding.task.abort();
        }
    }
}

async fn consume_events<S,E> (events: S, binding: u64, snapshots: Arc<DashMap<String,LiveEvent>>,
                              signal: Arc<watch::Sender<LiveGeneration>>, token: CancellationToken)
    where S: Stream<Item=std::result::Result<String,E>> + Send + 'static, E: Display + Send + 'static
{
    let mut events = std::pin::pin!(events);

    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = events.next() => next
        };

        match next {
            Some(Ok(payload)) => {
                if token.is_cancelled() { break }

                match decode_event( &payload) {
                    Ok(event) => {
                        if admit( &snapshots, event) && !notify( &signal, binding) {
                            break // unbound while we were admitting, our map is orphaned
                        }
                    }
                    Err(e) => warn!("dropping malformed live event: {}", e)
                }
            }
            Some(Err(e)) => {
                warn!("live event stream failed, keeping last state: {}", e);
                break
            }
            None => {
                info!("live event stream ended, keeping last state");
                break
            }
        }
    }
}

/// bump the admitted count if our binding is still the current one. Returns false if it is not
fn notify (signal: &watch::Sender<LiveGeneration>, binding: u64)->bool {
    signal.send_if_modified( |g| {
        if g.binding == binding {
            g.admitted = g.admitted.wrapping_add(1);
            true
        } else {
            false
        }
    })
}

/// parse a JSON event payload
pub fn decode_event (payload: &str)->Result<LiveEvent> {
    let event: LiveEvent = serde_json::from_str( payload.trim()).map_err( |e| parse_error!("{} in '{}'", e, payload))?;

    if event.entity_id.is_empty() {
        return Err( parse_error!("empty entity id in '{}'", payload))
    }
    if !event.position.is_valid() {
        return Err( parse_error!("invalid position {} in '{}'", event.position, payload))
    }
    Ok(event)
}

/// monotonic per-entity admission. Returns true if the event was applied
fn admit (snapshots: &DashMap<String,LiveEvent>, event: LiveEvent)->bool {
    match snapshots.entry( event.entity_id.clone()) {
        Entry::Occupied(mut e) => {
            if event.timestamp >= e.get().timestamp {
                e.insert( event);
                true
            } else {
                debug!("dropping out of order event for {} ({} < {})", event.entity_id, event.timestamp, e.get().timestamp);
                false
            }
        }
        Entry::Vacant(e) => {
            e.insert( event);
            true
        }
    }
}
