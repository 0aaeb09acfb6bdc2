//! Scheduling of a batch into independent lanes.

use std::collections::{BTreeMap, HashMap};

use crate::types::{CalibrationAdjustment, TargetComponent};

/// Group adjustment indices so that any two adjustments writing the same
/// `(component, parameter)` share a lane.
///
/// Lanes may run concurrently; indices inside a lane are ascending and must be
/// applied sequentially.
pub fn plan_lanes(adjustments: &[CalibrationAdjustment]) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..adjustments.len()).collect();
    let mut owner: HashMap<(TargetComponent, &str), usize> = HashMap::new();

    for (index, adjustment) in adjustments.iter().enumerate() {
        for key in adjustment.parameter_keys() {
            match owner.get(&key) {
                Some(&other) => union(&mut parent, index, other),
                None => {
                    owner.insert(key, index);
                }
            }
        }
    }

    let mut lanes: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for index in 0..adjustments.len() {
        let root = find(&mut parent, index);
        lanes.entry(root).or_default().push(index);
    }
    lanes.into_values().collect()
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[ra.max(rb)] = ra.min(rb);
    }
}
