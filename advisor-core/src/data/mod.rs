//! Price data collaborators: the provider seam, CSV import, Yahoo chart
//! fetch and the ingest step that turns raw rows into a `PriceSeries`.

pub mod csv_import;
pub mod ingest;
pub mod provider;
pub mod yahoo;

pub use csv_import::CsvProvider;
pub use ingest::{fetch_series, ingest};
pub use provider::{AssetType, DataError, DataProvider, DataSource, FetchRequest, FetchResult};
pub use yahoo::YahooProvider;
