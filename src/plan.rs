// src/plan.rs

use crate::error::{Error, Result};
use crate::records::{FromRow, Record};
use crate::rows::read_rows;
use crate::schema::{self, Table};
use crate::source::RawFileProvider;
use crate::store::Store;
use crate::votes::{read_votes, VoteRecord};
use std::time::Instant;
use tracing::{info, warn};

type Runner = fn(&mut Store, &dyn RawFileProvider) -> Result<usize>;

/// How one target table is populated: which record type (and so which
/// schema and conversions) and which row source.
#[derive(Clone, Copy)]
pub struct Plan {
    table: fn() -> &'static Table,
    run: Runner,
}

impl Plan {
    /// Load `T` from its headed CSV source file.
    pub const fn csv<T: FromRow>() -> Self {
        Self {
            table: T::table,
            run: load_csv::<T>,
        }
    }

    /// Load the unpivoted vote ledger.
    pub const fn votes() -> Self {
        Self {
            table: VoteRecord::table,
            run: load_votes,
        }
    }

    pub fn table(&self) -> &'static Table {
        (self.table)()
    }

    /// Replace the table's contents from its source file. The source is
    /// read once, front to back; any error leaves the table as it was
    /// before the call.
    #[tracing::instrument(level = "info", skip_all, fields(table = self.table().name))]
    pub fn run(&self, store: &mut Store, provider: &dyn RawFileProvider) -> Result<usize> {
        let start = Instant::now();
        let rows = (self.run)(store, provider)?;
        info!(rows, elapsed = ?start.elapsed(), "loaded");
        Ok(rows)
    }
}

impl std::fmt::Debug for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Plan")
            .field("table", &self.table().name)
            .finish()
    }
}

fn load_csv<T: FromRow>(store: &mut Store, provider: &dyn RawFileProvider) -> Result<usize> {
    let table = T::table();
    let reader = provider.open(table.source)?;
    let records = read_rows(table.source, reader, table.aliases)?.map(|row| {
        let row = row?;
        T::from_row(&row).map_err(|source| {
            warn!(table = table.name, line = row.line(), column = source.column(), "bad cell");
            Error::Conversion {
                table: table.name,
                line: row.line(),
                source,
            }
        })
    });
    store.replace(records)
}

fn load_votes(store: &mut Store, provider: &dyn RawFileProvider) -> Result<usize> {
    let source = schema::VOTES.source;
    let votes = read_votes(source, provider.open(source)?)?;
    store.replace::<VoteRecord, _>(votes)
}
