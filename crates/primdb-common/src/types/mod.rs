//! Type definitions for primdb.
//!
//! This module contains the scalar type system and the row and filter
//! shapes that every other component is written against.

mod row;
mod scalar;

pub use row::{Assignments, Filter, Row};
pub use scalar::{parse_literal, validate, ScalarType, Value};
