pub mod api_errors;
pub mod direct;
pub mod notification;
pub mod payments;
pub mod sanitize;
pub mod stripe;
pub mod stripe_client;
