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

use crate::model::{LiveEvent,Task};

/// the task metadata of an entity that filters are matched against
#[derive(Debug,Clone,Copy,Default,PartialEq)]
pub struct EntityTags<'a> {
    pub vehicle_id: Option<&'a str>,
    pub driver_id: Option<&'a str>,
    pub task_id: Option<&'a str>,
}

impl<'a> From<&'a Task> for EntityTags<'a> {
    fn from (task: &'a Task)->Self {
        EntityTags {
            vehicle_id: Some( task.vehicle_id.as_str()),
            driver_id: task.driver_id.as_deref(),
            task_id: Some( task.id.as_str()),
        }
    }
}

impl<'a> From<&'a LiveEvent> for EntityTags<'a> {
    fn from (e: &'a LiveEvent)->Self {
        EntityTags {
            vehicle_id: e.vehicle_id(),
            driver_id: e.driver_id.as_deref(),
            task_id: e.task_id.as_deref(),
        }
    }
}

/// the operator selected subset of vehicle entities. Unset fields match everything, set fields are
/// equality predicates that all have to hold. Flights are not owned by tasks and hence never filtered
#[derive(Serialize,Deserialize,Debug,Clone,Default,PartialEq)]
#[serde(rename_all="camelCase")]
pub struct FilterSet {
    pub vehicle_id: Option<String>,
    pub driver_id: Option<String>,
    pub task_id: Option<String>,
}

impl FilterSet {
    pub fn all ()->Self { FilterSet::default() }

    /// empty strings and "all" select everything
    pub fn new (vehicle_id: Option<&str>, driver_id: Option<&str>, task_id: Option<&str>)->Self {
        FilterSet {
            vehicle_id: selector( vehicle_id),
            driver_id: selector( driver_id),
            task_id: selector( task_id),
        }
    }

    pub fn is_all (&self)->bool {
        self.vehicle_id.is_none() && self.driver_id.is_none() && self.task_id.is_none()
    }

    pub fn matches (&self, tags: &EntityTags)->bool {
        matches_field( &self.vehicle_id, tags.vehicle_id)
            && matches_field( &self.driver_id, tags.driver_id)
            && matches_field( &self.task_id, tags.task_id)
    }

    pub fn matches_task (&self, task: &Task)->bool {
        self.matches( &EntityTags::from(task))
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all() { return write!(f, "FilterSet(all)") }

        write!(f, "FilterSet(")?;
        if let Some(id) = &self.vehicle_id { write!(f, " vehicle: {id}")?; }
        if let Some(id) = &self.driver_id { write!(f, " driver: {id}")?; }
        if let Some(id) = &self.task_id { write!(f, " task: {id}")?; }
        write!(f, " )")
    }
}

fn selector (s: Option<&str>)->Option<String> {
    match s.map( str::trim) {
        None | Some("") => None,
        Some(s) if s.eq_ignore_ascii_case("all") => None,
        Some(s) => Some(s.to_string())
    }
}

#[inline]
fn matches_field (filter: &Option<String>, value: Option<&str>)->bool {
    match filter {
        Some(f) => value == Some(f.as_str()),
        None => true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector () {
        let f = FilterSet::new( Some("all"), Some(""), None);
        assert!( f.is_all());

        let f = FilterSet::new( Some("V1"), None, Some("ALL"));
        assert_eq!( f.vehicle_id.as_deref(), Some("V1"));
        assert!( f.task_id.is_none());
    }

    #[test]
    fn test_matches () {
        let tags = EntityTags{ vehicle_id: Some("V1"), driver_id: None, task_id: Some("T1") };
        assert!( FilterSet::all().matches( &tags));
        assert!( FilterSet::new( Some("V1"), None, Some("T1")).matches( &tags));
        assert!( !FilterSet::new( Some("V2"), None, None).matches( &tags));
        assert!( !FilterSet::new( None, Some("D1"), None).matches( &tags)); // unknown driver does not match
    }
}
