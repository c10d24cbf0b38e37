//! Warning selection, formatting, and delivery.
//!
//! Per invocation the dispatcher moves through
//! `Selecting-Region → Filtering → (Empty: Done) | (Formatting → Dispatching → Done | Fatal)`.
//! The selection and formatting steps are pure functions in [`message`].

mod dispatcher;
pub mod message;
mod outcome;

pub use dispatcher::WarningDispatcher;
pub use message::{
    format_region_list, format_subject, format_warning_message, select_sending_region,
    sort_by_use_ratio, warning_regions,
};
pub use outcome::{DeliveryResult, DeliveryStatus, WarningDispatchOutcome};
