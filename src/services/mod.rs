pub mod places_api;
