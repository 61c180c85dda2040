//! MakeMyTrip implementation.
//!
//! Results render into `.listingCard` elements. A near-empty `200-OK` page
//! is the site's bot trap.

mod descriptor;
mod extractor;
mod site;

pub use descriptor::makemytrip_descriptor;
pub use extractor::makemytrip_extractor;
pub use site::MakeMyTripSite;
