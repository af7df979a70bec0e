//! Derived data added on top of the provider forecast
//!
//! - Energy: per-day photovoltaic output estimate (`daily.energy`)
//! - Summary: weekly rain classification, temperature extremes and averages

pub mod energy;
pub mod summary;

pub use energy::{PANEL_EFFICIENCY, PANEL_POWER_KW, PanelSpec, attach_energy, compute_pv_energy};
pub use summary::{
    ForecastSummary, RAIN_CODE_THRESHOLD, RAINY_DAYS_PER_WEEK, SummaryRules, WEEK_DAYS,
    WeatherSummary, attach_summary, compute_summary,
};
