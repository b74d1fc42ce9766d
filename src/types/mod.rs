pub mod itinerary;
pub mod library;
pub mod request;

pub use itinerary::{Itinerary, ItineraryDay, ItineraryMeta};
pub use library::{ContentBlock, DayPlanFragment, RouteTemplate};
pub use request::{ItineraryRequest, MAX_REQUEST_DAYS};
