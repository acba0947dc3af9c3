// src/votes.rs
//
// VOTE.CSV has no header. Each line is a history ref id followed by any
// number of (member id, vote) pairs laid out as extra columns:
//
//   H1234,H0001,Y,H0002,N,S0003,A
//
// `VoteRecords` turns that into one narrow record per pair.

use crate::error::{Error, Result};
use crate::rows::skip_bom;
use csv::{ReaderBuilder, StringRecord, StringRecordsIntoIter};
use std::io::{BufReader, Read};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord {
    pub ref_id: String,
    pub member_id: String,
    pub vote_status: String,
}

/// Lazy, single-pass iterator of unpivoted votes. Stops after the first error.
pub struct VoteRecords<R> {
    file: String,
    records: StringRecordsIntoIter<BufReader<R>>,
    pending: std::vec::IntoIter<VoteRecord>,
    done: bool,
}

pub fn read_votes<R: Read>(file: &str, reader: R) -> Result<VoteRecords<R>> {
    let rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(skip_bom(file, reader)?);
    Ok(VoteRecords {
        file: file.to_string(),
        records: rdr.into_records(),
        pending: Vec::new().into_iter(),
        done: false,
    })
}

impl<R: Read> Iterator for VoteRecords<R> {
    type Item = Result<VoteRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(vote) = self.pending.next() {
                return Some(Ok(vote));
            }
            if self.done {
                return None;
            }
            let unpivoted = match self.records.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => Err(Error::parse(&self.file, e)),
                Some(Ok(record)) => unpivot_row(&self.file, &record),
            };
            match unpivoted {
                Ok(votes) => self.pending = votes.into_iter(),
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Split one vote line into `(ref id, member, vote)` triples.
///
/// A ref id with no pairs yields nothing: nobody voted on that event, and a
/// row with a null member could not be deduplicated by the store. A lone
/// trailing member id is an error rather than something to pad or drop.
fn unpivot_row(file: &str, record: &StringRecord) -> Result<Vec<VoteRecord>> {
    let mut fields = record.iter();
    let Some(ref_id) = fields.next() else {
        return Ok(Vec::new());
    };
    let rest: Vec<&str> = fields.collect();

    if rest.len() % 2 != 0 {
        return Err(Error::MalformedRow {
            file: file.to_string(),
            line: record.position().map(|p| p.line()).unwrap_or(0),
            ref_id: ref_id.to_string(),
            trailing: rest.len(),
        });
    }

    Ok(rest
        .chunks_exact(2)
        .map(|pair| VoteRecord {
            ref_id: ref_id.to_string(),
            member_id: pair[0].to_string(),
            vote_status: pair[1].to_string(),
        })
        .collect())
}
