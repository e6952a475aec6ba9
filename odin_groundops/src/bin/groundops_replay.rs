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

use std::{convert::Infallible, fs, path::PathBuf, time::Duration};
use anyhow::Result;
use clap::Parser;
use futures::{StreamExt,stream};
use lazy_static::lazy_static;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use odin_groundops::{FilterSet, GroundOpsConfig, GroundOpsEngine, Session, load_config};

#[derive(Parser,Debug)]
#[command(about="replay a recorded ground operations session and print composed frames as JSON lines")]
struct CliOpts {
    /// session JSON file (window, tasks, flights and parking spots)
    #[arg(long)]
    session: PathBuf,

    /// engine config RON file (defaults are used if not set)
    #[arg(long)]
    config: Option<PathBuf>,

    /// playback speed multiplier
    #[arg(long)]
    speed: Option<f64>,

    /// start at this fraction of the session window
    #[arg(long, default_value_t=0.0)]
    start: f64,

    /// file with one JSON live event per line that is fed as live stream
    #[arg(long)]
    live: Option<PathBuf>,

    /// real time milliseconds between live events read from file
    #[arg(long, default_value_t=100)]
    live_interval: u64,

    /// only show entities of this vehicle
    #[arg(long)]
    vehicle: Option<String>,

    /// only show entities of this driver
    #[arg(long)]
    driver: Option<String>,

    /// only show entities of this task
    #[arg(long)]
    task: Option<String>,

    /// stop after this number of frames
    #[arg(long)]
    frames: Option<usize>,
}

lazy_static! { static ref ARGS: CliOpts = CliOpts::parse(); }

#[tokio::main]
async fn main()->Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter( EnvFilter::from_default_env())  // use RUST_LOG to set max level
        .with_writer( std::io::stderr)
        .init();

    let config = match &ARGS.config {
        Some(path) => load_config( path)?,
        None => GroundOpsConfig::default()
    };
    let session = Session::from_path( &ARGS.session)?;
    let window = session.window;

    let (frame_tx, mut frame_rx) = mpsc::channel( config.frame_queue);
    let (hengine, task) = GroundOpsEngine::spawn( config, session, frame_tx);

    let filter = FilterSet::new( ARGS.vehicle.as_deref(), ARGS.driver.as_deref(), ARGS.task.as_deref());
    if !filter.is_all() {
        hengine.set_filter( filter).await?;
    }
    if let Some(speed) = ARGS.speed {
        hengine.set_speed( speed).await?;
    }
    if let Some(path) = &ARGS.live {
        let lines: Vec<String> = fs::read_to_string( path)?.lines().filter( |l| !l.trim().is_empty()).map( str::to_string).collect();
        let interval = Duration::from_millis( ARGS.live_interval);
        let events = stream::iter( lines).then( move |line| async move {
            tokio::time::sleep( interval).await;
            Ok::<String,Infallible>(line)
        });
        hengine.bind_live( events).await?;
    }

    hengine.scrub( ARGS.start).await?;
    hengine.play().await?;

    let mut n_frames = 0;
    let mut started = false;
    while let Some(frame) = frame_rx.recv().await {
        println!("{}", serde_json::to_string( &frame)?);
        n_frames += 1;

        if ARGS.frames.map( |max| n_frames >= max).unwrap_or(false) { break }

        if frame.playing {
            started = true;
        } else if started && frame.elapsed >= window.duration_millis() {
            break // clock reached end of window
        }
    }

    hengine.shutdown().await?;
    task.await?;
    Ok(())
}
