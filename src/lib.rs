//! chart_overlay draws an observed time series on top of a scanned or
//! exported forecast chart, then crops the chart tightly around its plot.
//! Nothing about the chart's coordinate system needs to be known up front:
//! the axes are located and calibrated by inspecting pixels.
//!
//! Typical use:
//!
//! ```no_run
//! use chart_overlay::prediction::Prediction;
//! use chart_overlay::series::read_series;
//!
//! # fn main() -> Result<(), chart_overlay::error::OverlayError> {
//! let series = read_series("hospitalized.txt")?;
//! let mut prediction = Prediction::open("forecast.png", 120.0, 1500.0, series)?;
//! let plot = prediction.process(80, 410)?;
//! plot.save("forecast_overlay.png")?;
//! # Ok(())
//! # }
//! ```
//!
//! # Algorithm
//!
//! The caller supplies a seed pixel: a background position just below the
//! vertical axis' lowest tick and just left of the horizontal axis' first
//! tick. From there:
//!
//! * Scanning upward and rightward from the seed, alternating runs of
//!   background and mark pixels are measured. Each mark run is a tick. Tick
//!   gaps are expected to be regular; once a gap deviates from the reference
//!   gap length by more than 10% the scan has run into other content (a
//!   label, a legend, the plotted forecast) and stops. The first tick on
//!   each axis gives the origin; the distance to the last tick, divided by
//!   the number of units it represents, gives pixels per unit.
//! * The series is drawn as a red antialiased polyline starting at the
//!   origin, one unit step to the right per value.
//! * The box spanned by the ticks (and the drawn line) is grown edge by edge
//!   until each edge is followed by 10 consecutive blank lines. Isolated
//!   marks within that margin, such as antialiasing residue, are absorbed
//!   rather than ending the search early.
//!
//! All thresholds are adjustable through [params::Params].
//!
//! # Caveats
//!
//! * Only channel 0 of each pixel is consulted, so axes must be dark on a
//!   light background. Coloured charts are handled as long as the axis ink
//!   is dark in the red channel.
//! * Axes must be linear, and there must be at least two ticks (giving two
//!   gap measurements) on each axis.
//! * A chart whose content runs to the image border cannot be cropped,
//!   since no blank margin can be found there.
//! * Parts of the series drawn within the margin of the image border, or
//!   off the image entirely, are left out of the crop.

pub mod axis;
pub mod crop;
pub mod error;
pub mod overlay;
pub mod params;
pub mod prediction;
pub mod series;
pub mod walker;
