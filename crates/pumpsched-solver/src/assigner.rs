//! Actuation Assigner. Translates an hour's target pump *count* into a
//! binary activation row, preserving the per-pump actuation-cap invariant:
//! start from the previous row, sort idle (or active) pumps by ascending
//! cumulative actuations, and flip the cheapest ones.

use thiserror::Error;

use pumpsched_core::{ActuationProfile, Horizon, PumpId};

/// C3's rejection outcome: activating the requested count would push some
/// pump over its actuation cap. A feasibility failure, not a bug; the
/// driver continues to the next sibling at this hour.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("pump {pump} would exceed the actuation cap ({cap}) to reach count {y_new}")]
pub struct AssignError {
    pub pump: PumpId,
    pub cap: u32,
    pub y_new: usize,
}

/// Apply the count-vector target `y_new` for hour `h`, given the previous
/// hour's row `x_prev` and count `y_old`, writing the result into `x_new`.
///
/// `x_new` must already have `x_prev`'s length (`num_pumps`); on success it
/// holds the new row and `Ok(())` is returned. On a cap violation `x_new` is
/// left unspecified (the caller discards it) and `Err(AssignError)` is
/// returned.
///
/// Tie-break: ascending `A[j]`, then ascending pump index. A stable sort by
/// `(A[j], j)` gives this directly.
pub fn apply_actuation(
    x_prev: &[bool],
    x_new: &mut [bool],
    y_new: usize,
    y_old: usize,
    actuations: &ActuationProfile,
    cap: u32,
) -> Result<(), AssignError> {
    debug_assert_eq!(x_prev.len(), x_new.len());

    x_new.copy_from_slice(x_prev);

    if y_new == y_old {
        return Ok(());
    }

    if y_new > y_old {
        let delta = y_new - y_old;
        let mut idle: Vec<PumpId> = (0..x_prev.len()).filter(|&j| !x_prev[j]).collect();
        idle.sort_by_key(|&j| (actuations.get(j), j));
        let chosen = &idle[..delta.min(idle.len())];
        for &pump in chosen {
            if actuations.get(pump) >= cap {
                return Err(AssignError {
                    pump,
                    cap,
                    y_new,
                });
            }
        }
        for &pump in chosen {
            x_new[pump] = true;
        }
        return Ok(());
    }

    // y_new < y_old: deactivations never count against the cap; only
    // 0->1 transitions do.
    let delta = y_old - y_new;
    let mut active: Vec<PumpId> = (0..x_prev.len()).filter(|&j| x_prev[j]).collect();
    active.sort_by_key(|&j| (actuations.get(j), j));
    for &pump in &active[..delta.min(active.len())] {
        x_new[pump] = false;
    }
    Ok(())
}

/// Convenience wrapper used by the driver: reads/writes directly through
/// `pumpsched_core::ActivationMatrix` rows at hour `h` and `h - 1`.
pub fn apply_actuation_at(
    matrix: &mut pumpsched_core::ActivationMatrix,
    h: Horizon,
    y_new: usize,
    y_old: usize,
    actuations: &ActuationProfile,
    cap: u32,
) -> Result<(), AssignError> {
    let num_pumps = matrix.num_pumps();
    let mut new_row = vec![false; num_pumps];
    apply_actuation(
        matrix.row(h - 1),
        &mut new_row,
        y_new,
        y_old,
        actuations,
        cap,
    )?;
    matrix.set_row(h, &new_row);
    Ok(())
}
