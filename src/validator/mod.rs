//! Validation subsystem
//!
//! The [`ValidationController`] is the single point of dispatch for both
//! schema well-formedness and data conformance. It owns, per schema kind, an
//! ordered list of validators: the required one first, then any
//! caller-supplied customs registered through [`ControllerBuilder`].

mod controller;
mod required;

pub use controller::{ControllerBuilder, DataValidator, SchemaValidator, ValidationController};
pub use required::{
    ArrayValidator, BooleanValidator, NumberValidator, ObjectValidator, ReferenceValidator,
    StringValidator,
};
