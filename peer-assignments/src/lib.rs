//! Weekly peer observation assignments.
//!
//! Matches free observer slots against classes being taught, through a chain
//! of progressively relaxed constraints, with picks seeded by the ISO week so
//! that every run within the same week produces the same table.
//!
//! - **`parser`**: loads the `Peerslots` and `Busy_fac` CSV exports
//! - **`schedule`**: seeding, slot catalog, fallback chain, selection, output records
//! - **`export`** / **`display`**: CSV/JSON files and the console report
//! - **`web`**: dashboard serving the generated table

pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod parser;
pub mod schedule;
pub mod web;

pub use config::{GeneratorConfig, MatchMode, RunScope};
pub use error::{AssignError, AssignResult};
pub use parser::{InputSource, InputTables};
pub use schedule::{AssignmentBuilder, AssignmentRecord, GenerationReport, Generator};

/// Runs the generator over loaded tables and renders the output table
pub fn generate_records(
    tables: InputTables,
    config: &GeneratorConfig,
) -> AssignResult<(GenerationReport, Vec<AssignmentRecord>)> {
    let generator = Generator::new(config.clone())?;
    let report = generator.generate(&tables.observers, tables.candidates)?;

    let mut builder = AssignmentBuilder::new(report.week, config.time_convention);
    for scope in &report.scopes {
        builder.push_scope(scope);
    }
    let records = builder.finish();
    Ok((report, records))
}
