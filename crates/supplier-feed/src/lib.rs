pub mod aggregate;
pub mod catalog;
pub mod currency;
pub mod fetch;
pub mod json;
pub mod normalize;
pub mod product;
pub mod reader;
pub mod record;
pub mod result;
pub mod sniff;
pub mod sync;
pub mod validate;

pub use aggregate::SkuAggregator;
pub use catalog::{Catalog, CatalogError};
pub use currency::sanitize_currency;
pub use fetch::{FeedFetcher, FetchError, FetchedBody};
pub use json::{DecodeError, decode_products};
pub use normalize::normalize_row;
pub use product::{CanonicalRow, NormalizedRow};
pub use reader::{CsvRows, ReadError};
pub use record::RawRecord;
pub use result::SyncResult;
pub use sniff::{detect_delimiter, is_likely_header, normalize_header};
pub use sync::SupplierSync;
pub use validate::{RowError, RowValidation, validate_row};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
