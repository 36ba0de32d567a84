//! Reconciling assignment completion between a classroom and a report sheet.
//!
//! A student has completed an assignment when the repository created for their submission has a
//! closed pull request titled exactly `Feedback`. Completion is gathered per assignment
//! ([`evaluate`]), across the assignments a sheet asks about ([`aggregate`]), and merged into the
//! sheet's grid ([`grid`]). [`sync`] ties these to the spreadsheet itself.
//!
//! # Terminology:
//! - Submission: an accepted assignment, credited to its first listed student
//! - Completion map: student login to completed, for one assignment
//! - Grid: the report sheet's cells; a header row of assignment titles above one row per student

pub mod aggregate;
pub mod evaluate;
pub mod grid;
pub mod sync;
