//! Rendering a schema diff as a runnable SQL script.

use std::io::Write;

use oxide_mysql_core::diff::RoutineDiff;
use oxide_mysql_core::{DiffError, ObjectDiff, SchemaDiff, StatementModifiers};
use tracing::{info, warn};

use crate::error::Result;

/// Counts of what [`write_script`] emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScriptSummary {
    /// Statements written as runnable SQL.
    pub emitted: usize,
    /// Statements written commented out, because they were unsafe or
    /// unsupported under the modifiers in use.
    pub withheld: usize,
}

impl ScriptSummary {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.withheld == 0
    }
}

/// Writes every statement of `diff` to `out`, in execution order.
///
/// Stored programs with a `BEGIN ... END` body are wrapped in `DELIMITER`
/// commands. A withheld statement is written as SQL comments, preceded by
/// the reason it was withheld.
///
/// # Errors
///
/// Returns an error if writing fails, or if a diff can't be rendered at all.
pub fn write_script<W: Write>(
    out: &mut W,
    diff: &SchemaDiff<'_>,
    mods: &StatementModifiers,
) -> Result<ScriptSummary> {
    let mut summary = ScriptSummary::default();

    let tables = diff.table_diffs.iter().map(|td| (td as &dyn ObjectDiff, false));
    let routines = diff
        .routine_diffs
        .iter()
        .map(|rd| (rd as &dyn ObjectDiff, RoutineDiff::is_compound_statement(rd)));
    let ordered = diff
        .database_diff
        .iter()
        .map(|dd| (dd as &dyn ObjectDiff, false))
        .chain(tables)
        .chain(routines);

    for (object_diff, compound) in ordered {
        let key = object_diff.object_key();
        match object_diff.statement(mods) {
            Ok(stmt) if stmt.is_empty() => {}
            Ok(stmt) => {
                write_statement(out, &stmt, compound)?;
                summary.emitted += 1;
            }
            Err(err) => {
                let Some(stmt) = err.statement().filter(|s| !s.is_empty()) else {
                    return Err(err.into());
                };
                match &err {
                    DiffError::Unsafe(_) => warn!(object = %key, "withholding unsafe statement"),
                    _ => warn!(object = %key, "withholding unsupported statement"),
                }
                writeln!(out, "-- {err}")?;
                for line in stmt.lines() {
                    writeln!(out, "-- {line}")?;
                }
                summary.withheld += 1;
            }
        }
    }

    info!(
        emitted = summary.emitted,
        withheld = summary.withheld,
        "diff complete"
    );
    Ok(summary)
}

fn write_statement<W: Write>(out: &mut W, stmt: &str, compound: bool) -> std::io::Result<()> {
    if compound {
        writeln!(out, "DELIMITER //")?;
        writeln!(out, "{stmt}//")?;
        writeln!(out, "DELIMITER ;")
    } else {
        writeln!(out, "{stmt};")
    }
}
