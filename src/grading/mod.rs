//! Scoring and grading of loaded student records.
//!
//! Records flow through [`scorer`] (weighted overall score), [`grade`]
//! (letter grade) and [`assemble`] (one graded record per student).

pub mod assemble;
pub mod grade;
pub mod scorer;
pub mod types;
