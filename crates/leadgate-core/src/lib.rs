//! Domain logic for the leadgate relay.
//!
//! Provides the payload sanitizer and the two outbound projections of a
//! lead submission: the TrackDrive API record and the spreadsheet row.
//! Both projections are driven by a single field schema table so their
//! coercion rules cannot drift apart, while their differing treatment of
//! missing values (the record omits, the row renders empty cells) stays
//! explicit in each builder.
//!
//! Everything in this crate is a pure function of its inputs: no I/O,
//! no error conditions, no shared state.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fields;
pub mod mapper;
pub mod payload;
pub mod row;

pub use fields::{FieldSpec, Seeds, CERT_URL_KEY, FIELD_SPECS};
pub use mapper::build_api_record;
pub use payload::{sanitize, InboundPayload};
pub use row::build_sheet_row;
