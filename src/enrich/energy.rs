//! Photovoltaic energy estimate from daily sunshine duration

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Result;
use crate::models::ForecastPayload;

/// Nominal panel power in kW
pub const PANEL_POWER_KW: f64 = 2.5;
/// Fraction of nominal power actually produced while the sun shines
pub const PANEL_EFFICIENCY: f64 = 0.2;

pub const ENERGY_FIELD: &str = "energy";
pub const ENERGY_UNIT: &str = "kWh";
const SUNSHINE_FIELD: &str = "sunshine_duration";
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Fixed installation parameters used for the estimate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub power_kw: f64,
    pub efficiency: f64,
}

impl Default for PanelSpec {
    fn default() -> Self {
        Self {
            power_kw: PANEL_POWER_KW,
            efficiency: PANEL_EFFICIENCY,
        }
    }
}

impl PanelSpec {
    /// Energy in kWh produced over `sunshine_seconds` of sunshine
    #[must_use]
    pub fn energy_kwh(&self, sunshine_seconds: f64) -> f64 {
        self.efficiency * self.power_kw * (sunshine_seconds / SECONDS_PER_HOUR)
    }

    /// Day-aligned energy estimate for a sunshine series in seconds
    #[must_use]
    pub fn daily_energy(&self, sunshine_seconds: &[f64]) -> Vec<f64> {
        sunshine_seconds
            .iter()
            .map(|&seconds| self.energy_kwh(seconds))
            .collect()
    }
}

/// Energy estimate using the default panel
#[must_use]
pub fn compute_pv_energy(sunshine_seconds: &[f64]) -> Vec<f64> {
    PanelSpec::default().daily_energy(sunshine_seconds)
}

/// Add `daily.energy` and `daily_units.energy` to the payload
#[tracing::instrument(level = "debug", skip(payload))]
pub fn attach_energy(payload: &mut ForecastPayload, panel: &PanelSpec) -> Result<()> {
    let sunshine = payload.series(SUNSHINE_FIELD)?;
    let energy = panel.daily_energy(&sunshine);
    tracing::debug!(days = energy.len(), "computed pv energy");

    payload.insert_daily(ENERGY_FIELD, Value::from(energy));
    payload.insert_daily_unit(ENERGY_FIELD, ENERGY_UNIT);
    Ok(())
}
