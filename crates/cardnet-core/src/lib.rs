//! Cardnet Core - the Person data model
//!
//! Every user of the business-card network is represented by one
//! [`Person`], keyed by a stable external `user_id`. The graph crate
//! stores these as nodes and links them with FRIEND_OF edges.
//!
//! # Example
//!
//! ```
//! use cardnet_core::Person;
//!
//! let person = Person::new("u1", "Ada Lovelace")
//!     .with_company("Analytical Engines")
//!     .with_position("Engineer");
//!
//! assert_eq!(person.user_id, "u1");
//! assert!(person.validate().is_ok());
//! ```

mod error;
mod person;

pub use error::ValidationError;
pub use person::{Person, PersonUpdate};
