//! EaseMyTrip implementation.
//!
//! Each fare sits in a `spnPrice{n}` span carrying the amount in a `price`
//! attribute; rows are found by walking up from those spans.

mod descriptor;
mod extractor;
mod site;

pub use descriptor::easemytrip_descriptor;
pub use extractor::easemytrip_extractor;
pub use site::EaseMyTripSite;
