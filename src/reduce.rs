//! Latest-position-per-vehicle reduction.

use std::collections::HashMap;

use crate::feed::VehicleUpdate;

/// Collapses a batch of updates to the most recent one per vehicle.
///
/// The feed repeats vehicles, so the batch is stably sorted ascending by
/// timestamp and folded into a map where later entries overwrite earlier
/// ones. On equal timestamps the update appearing later in the original
/// sequence wins (stable sort preserves input order within a timestamp).
/// Output order across vehicles is unspecified.
pub fn latest_per_vehicle(mut updates: Vec<VehicleUpdate>) -> Vec<VehicleUpdate> {
    updates.sort_by_key(|u| u.timestamp);

    let mut latest: HashMap<String, VehicleUpdate> = HashMap::with_capacity(updates.len());
    for update in updates {
        latest.insert(update.vehicle_id.clone(), update);
    }

    latest.into_values().collect()
}
