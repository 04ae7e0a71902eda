//! Loadable weights for a bar and plate set
//!
//! Weights are tracked in hundredths of the unit so plate sums are exact.

use crate::Settings;
use liftscript_core::{ScriptError, Unit, Weight};
use liftscript_plugin::WeightFinalizer;
use std::collections::BTreeSet;
use std::sync::Arc;

const SCALE: f64 = 100.0;

/// Plates per side considered for one plate size
const MAX_PER_SIDE: u32 = 20;

/// Largest magnitude in hundredths that rounding accepts
const MAX_HUNDREDTHS: f64 = (u64::MAX / 4) as f64;

/// Bar, plates and the weights they can make in one unit
#[derive(Debug, Clone)]
pub struct Equipment {
    unit: Unit,
    /// Every loadable total in hundredths, ascending
    loads: Vec<u64>,
    /// Rounding step in hundredths once the plates run out
    step: u64,
}

fn to_hundredths(value: f64) -> u64 {
    (value * SCALE).round().max(0.0) as u64
}

fn default_step(unit: Unit) -> f64 {
    match unit {
        Unit::Lb => 5.0,
        Unit::Kg => 2.5,
    }
}

impl Equipment {
    pub fn new(unit: Unit, settings: &Settings) -> Self {
        let bar = settings.bars.for_unit(unit).convert_to(unit);
        let bar_h = to_hundredths(bar.value);

        // Per-side sums: each plate stack splits evenly across both sides
        let mut sides: BTreeSet<u64> = BTreeSet::from([0]);
        let mut smallest: Option<u64> = None;
        for plate in settings.plates_for(unit) {
            let w = to_hundredths(plate.weight.value);
            let per_side = (plate.num / 2).min(MAX_PER_SIDE);
            if w == 0 || per_side == 0 {
                continue;
            }
            smallest = Some(smallest.map_or(w, |s| s.min(w)));
            let current: Vec<u64> = sides.iter().copied().collect();
            for base in current {
                for k in 1..=u64::from(per_side) {
                    sides.insert(base.saturating_add(k.saturating_mul(w)));
                }
            }
        }

        let loads = sides.into_iter().map(|s| bar_h.saturating_add(s.saturating_mul(2))).collect();
        let step = smallest.map_or_else(|| to_hundredths(default_step(unit)), |s| s.saturating_mul(2));

        tracing::debug!(unit = %unit, bar = %bar, step, "built equipment");
        Self { unit, loads, step }
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    /// Heaviest weight the plates can make
    pub fn max_load(&self) -> Weight {
        let max = self.loads.last().copied().unwrap_or(0);
        Weight::new(max as f64 / SCALE, self.unit)
    }

    /// Nearest loadable weight, expressed in this equipment's unit.
    /// Ties go to the lighter load. Above the heaviest load, rounds to
    /// the smallest plate pair.
    pub fn round(&self, weight: Weight) -> Result<Weight, ScriptError> {
        let value = weight.convert_to(self.unit).value;
        if !value.is_finite() {
            return Err(ScriptError::domain_error("cannot round a non-finite weight"));
        }
        if value < 0.0 {
            return Err(ScriptError::domain_error(format!("cannot round a negative weight ({})", weight)));
        }

        if value * SCALE > MAX_HUNDREDTHS {
            return Err(ScriptError::domain_error(format!("weight too large to round ({})", weight)));
        }

        let target = to_hundredths(value);
        let max = self.loads.last().copied().unwrap_or(0);
        let rounded = if target > max || self.loads.is_empty() {
            let step = self.step.max(1);
            let half_up = target
                .checked_add(step / 2)
                .ok_or_else(|| ScriptError::domain_error(format!("weight too large to round ({})", weight)))?;
            (half_up / step) * step
        } else {
            let idx = self.loads.partition_point(|&l| l < target);
            match (idx.checked_sub(1).map(|i| self.loads[i]), self.loads.get(idx).copied()) {
                (Some(below), Some(above)) => {
                    if above - target < target - below { above } else { below }
                }
                (Some(below), None) => below,
                (None, Some(above)) => above,
                (None, None) => target,
            }
        };

        Ok(Weight::new(rounded as f64 / SCALE, self.unit))
    }

    /// A finalizer that rounds weight-mode results with this equipment
    pub fn finalizer(self: Arc<Self>) -> WeightFinalizer {
        Arc::new(move |w: Weight| self.round(w))
    }
}
