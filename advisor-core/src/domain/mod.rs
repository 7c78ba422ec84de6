//! Domain types: bars, series, recommendations.

pub mod bar;
pub mod recommendation;
pub mod series;

pub use bar::PriceBar;
pub use recommendation::{Action, Recommendation};
pub use series::{PriceSeries, SeriesError};
