// src/records.rs
//
// One typed record per target table. `from_row` applies that table's
// conversions; `values` binds the fields in the table's column order.

use crate::error::ConversionError;
use crate::rows::Row;
use crate::schema::{self, Table};
use crate::votes::VoteRecord;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::ToSql;

pub trait Record {
    fn table() -> &'static Table;

    /// Field values in `table().columns` order.
    fn values(&self) -> Vec<&dyn ToSql>;
}

/// A record read from a headed CSV file.
pub trait FromRow: Record + Sized {
    fn from_row(row: &Row) -> Result<Self, ConversionError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub number: Option<String>,
    pub name: Option<String>,
}

impl Record for Member {
    fn table() -> &'static Table {
        &schema::MEMBERS
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.number as &dyn ToSql, &self.name as &dyn ToSql]
    }
}

impl FromRow for Member {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            number: row.text("MBR_MBRNO")?,
            name: row.trimmed("MBR_NAME")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Committee {
    pub number: Option<String>,
    pub name: Option<String>,
}

impl Record for Committee {
    fn table() -> &'static Table {
        &schema::COMMITTEES
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.number as &dyn ToSql, &self.name as &dyn ToSql]
    }
}

impl FromRow for Committee {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            number: row.text("COM_COMNO")?,
            name: row.trimmed("COM_NAME")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommitteeMember {
    pub committee: Option<String>,
    pub member: Option<String>,
}

impl Record for CommitteeMember {
    fn table() -> &'static Table {
        &schema::COMMITTEE_MEMBERS
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.committee as &dyn ToSql, &self.member as &dyn ToSql]
    }
}

impl FromRow for CommitteeMember {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            committee: row.text("CMB_COMNO")?,
            member: row.text("CMB_MBRNO")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bill {
    pub id: Option<String>,
    pub description: Option<String>,
    pub patron_id: Option<String>,
    pub last_house_committee_id: Option<String>,
    pub last_house_action_date: Option<NaiveDate>,
    pub last_senate_committee_id: Option<String>,
    pub last_senate_action_date: Option<NaiveDate>,
    pub last_conference_action_date: Option<NaiveDate>,
    pub last_governor_action_date: Option<NaiveDate>,
    pub introduction_date: Option<NaiveDate>,
}

impl Record for Bill {
    fn table() -> &'static Table {
        &schema::BILLS
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.id as &dyn ToSql,
            &self.description as &dyn ToSql,
            &self.patron_id as &dyn ToSql,
            &self.last_house_committee_id as &dyn ToSql,
            &self.last_house_action_date as &dyn ToSql,
            &self.last_senate_committee_id as &dyn ToSql,
            &self.last_senate_action_date as &dyn ToSql,
            &self.last_conference_action_date as &dyn ToSql,
            &self.last_governor_action_date as &dyn ToSql,
            &self.introduction_date as &dyn ToSql,
        ]
    }
}

impl FromRow for Bill {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            id: row.text("Bill_id")?,
            description: row.text("Bill_description")?,
            patron_id: row.text("Patron_id")?,
            last_house_committee_id: row.text("Last_house_committee_id")?,
            last_house_action_date: row.date("Last_house_action_date")?,
            last_senate_committee_id: row.text("Last_senate_committee_id")?,
            last_senate_action_date: row.date("Last_senate_action_date")?,
            last_conference_action_date: row.date("Last_conference_action_date")?,
            last_governor_action_date: row.date("Last_governor_action_date")?,
            introduction_date: row.date("Introduction_date")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillSubject {
    pub bill_number: Option<String>,
    pub subject_name: Option<String>,
    pub subject_id: Option<i64>,
}

impl Record for BillSubject {
    fn table() -> &'static Table {
        &schema::BILL_SUBJECTS
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.bill_number as &dyn ToSql,
            &self.subject_name as &dyn ToSql,
            &self.subject_id as &dyn ToSql,
        ]
    }
}

impl FromRow for BillSubject {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            bill_number: row.text("Bill_Number")?,
            subject_name: row.text("Subject_Name")?,
            subject_id: row.integer("Subject_Id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParentChildSubject {
    pub parent_subject: Option<String>,
    pub parent_id: Option<i64>,
    pub child_subject: Option<String>,
    pub child_id: Option<i64>,
}

impl Record for ParentChildSubject {
    fn table() -> &'static Table {
        &schema::PARENT_CHILD_SUBJECTS
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.parent_subject as &dyn ToSql,
            &self.parent_id as &dyn ToSql,
            &self.child_subject as &dyn ToSql,
            &self.child_id as &dyn ToSql,
        ]
    }
}

impl FromRow for ParentChildSubject {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            parent_subject: row.text("Parent_Subject")?,
            parent_id: row.integer("P_Subject_Id")?,
            child_subject: row.text("Child_Subject")?,
            child_id: row.integer("C_Subject_Id")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Docket {
    pub committee: Option<String>,
    pub date: Option<NaiveDate>,
    pub number: Option<i64>,
    pub bill: Option<String>,
}

impl Record for Docket {
    fn table() -> &'static Table {
        &schema::DOCKETS
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.committee as &dyn ToSql,
            &self.date as &dyn ToSql,
            &self.number as &dyn ToSql,
            &self.bill as &dyn ToSql,
        ]
    }
}

impl FromRow for Docket {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            committee: row.text("Com_no")?,
            date: row.date("Doc_date")?,
            number: row.integer("Doc_no")?,
            bill: row.text("Bill_no")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubDocket {
    pub committee: Option<String>,
    pub subcommittee: Option<String>,
    pub date: Option<NaiveDate>,
    pub bill: Option<String>,
}

impl Record for SubDocket {
    fn table() -> &'static Table {
        &schema::SUBDOCKETS
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.committee as &dyn ToSql,
            &self.subcommittee as &dyn ToSql,
            &self.date as &dyn ToSql,
            &self.bill as &dyn ToSql,
        ]
    }
}

impl FromRow for SubDocket {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            committee: row.text("Com_no")?,
            subcommittee: row.text("Sub_no")?,
            date: row.date("Doc_date")?,
            bill: row.text("Bill_no")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub bill_id: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub ref_id: Option<String>,
}

impl Record for HistoryEntry {
    fn table() -> &'static Table {
        &schema::HISTORY
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.bill_id as &dyn ToSql,
            &self.date as &dyn ToSql,
            &self.description as &dyn ToSql,
            &self.ref_id as &dyn ToSql,
        ]
    }
}

impl FromRow for HistoryEntry {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            bill_id: row.text("Bill_id")?,
            date: row.text("History_date")?,
            description: row.trimmed("History_description")?,
            ref_id: row.trimmed("History_refid")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sponsor {
    pub member_name: Option<String>,
    pub member_id: Option<String>,
    pub bill_number: Option<String>,
    pub patron_type: Option<String>,
}

impl Record for Sponsor {
    fn table() -> &'static Table {
        &schema::SPONSORS
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.member_name as &dyn ToSql,
            &self.member_id as &dyn ToSql,
            &self.bill_number as &dyn ToSql,
            &self.patron_type as &dyn ToSql,
        ]
    }
}

impl FromRow for Sponsor {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            member_name: row.trimmed("MEMBER_NAME")?,
            member_id: row.text("MEMBER_ID")?,
            bill_number: row.text("BILL_NUMBER")?,
            patron_type: row.text("PATRON_TYPE")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubcommitteeMember {
    pub chamber: Option<String>,
    pub committee: Option<String>,
    pub subcommittee: Option<String>,
    pub member: Option<String>,
}

impl Record for SubcommitteeMember {
    fn table() -> &'static Table {
        &schema::SUBCOMMITTEE_MEMBERS
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.chamber as &dyn ToSql,
            &self.committee as &dyn ToSql,
            &self.subcommittee as &dyn ToSql,
            &self.member as &dyn ToSql,
        ]
    }
}

impl FromRow for SubcommitteeMember {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            chamber: row.text("SCM_HOUSE")?,
            committee: row.text("SCM_COMNO")?,
            subcommittee: row.text("SCM_SUBCOMNO")?,
            member: row.text("SCM_MBRNO")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub bill_number: Option<String>,
    pub doc_id: Option<String>,
    pub kind: Option<String>,
    /// HTML as published.
    pub text: Option<String>,
}

impl Record for Summary {
    fn table() -> &'static Table {
        &schema::SUMMARIES
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.bill_number as &dyn ToSql,
            &self.doc_id as &dyn ToSql,
            &self.kind as &dyn ToSql,
            &self.text as &dyn ToSql,
        ]
    }
}

impl FromRow for Summary {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            bill_number: row.text("SUM_BILNO")?,
            doc_id: row.trimmed("SUMMARY_DOCID")?,
            kind: row.text("SUMMARY_TYPE")?,
            text: row.text("SUMMARY_TEXT")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoteStatement {
    pub bill_id: Option<String>,
    pub ref_id: Option<String>,
    pub voted_at: Option<NaiveDateTime>,
    pub legislator_id: Option<String>,
    pub vote: Option<String>,
    pub statement: Option<String>,
}

impl Record for VoteStatement {
    fn table() -> &'static Table {
        &schema::VOTE_STATEMENTS
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.bill_id as &dyn ToSql,
            &self.ref_id as &dyn ToSql,
            &self.voted_at as &dyn ToSql,
            &self.legislator_id as &dyn ToSql,
            &self.vote as &dyn ToSql,
            &self.statement as &dyn ToSql,
        ]
    }
}

impl FromRow for VoteStatement {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            bill_id: row.text("Bill_id")?,
            ref_id: row.trimmed("History_refid")?,
            voted_at: row.datetime("Vote_date")?,
            legislator_id: row.text("Legislator_id")?,
            vote: row.text("Vote")?,
            statement: row.text("Statement")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FiscalImpactStatement {
    pub bill_number: Option<String>,
    pub ref_id: Option<String>,
}

impl Record for FiscalImpactStatement {
    fn table() -> &'static Table {
        &schema::FISCAL_IMPACT_STATEMENTS
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![&self.bill_number as &dyn ToSql, &self.ref_id as &dyn ToSql]
    }
}

impl FromRow for FiscalImpactStatement {
    fn from_row(row: &Row) -> Result<Self, ConversionError> {
        Ok(Self {
            bill_number: row.text("BILL_NUMBER")?,
            ref_id: row.trimmed("HST_REFID")?,
        })
    }
}

impl Record for VoteRecord {
    fn table() -> &'static Table {
        &schema::VOTES
    }

    fn values(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.ref_id as &dyn ToSql,
            &self.member_id as &dyn ToSql,
            &self.vote_status as &dyn ToSql,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rows::read_rows;

    fn first_row(content: &str) -> Row {
        read_rows("test.csv", content.as_bytes(), &[])
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_values_match_declared_columns() {
        let member = Member {
            number: None,
            name: None,
        };
        assert_eq!(member.values().len(), Member::table().columns.len());

        let bill = Bill {
            id: None,
            description: None,
            patron_id: None,
            last_house_committee_id: None,
            last_house_action_date: None,
            last_senate_committee_id: None,
            last_senate_action_date: None,
            last_conference_action_date: None,
            last_governor_action_date: None,
            introduction_date: None,
        };
        assert_eq!(bill.values().len(), Bill::table().columns.len());

        let statement = VoteStatement {
            bill_id: None,
            ref_id: None,
            voted_at: None,
            legislator_id: None,
            vote: None,
            statement: None,
        };
        assert_eq!(statement.values().len(), VoteStatement::table().columns.len());
    }

    #[test]
    fn test_member_name_is_trimmed() {
        let row = first_row("MBR_HOUSE,MBR_MBRNO,MBR_NAME\nH,H0001,\"  Smith  \"\n");
        assert_eq!(
            Member::from_row(&row).unwrap(),
            Member {
                number: Some("H0001".into()),
                name: Some("Smith".into()),
            }
        );
    }

    #[test]
    fn test_bill_dates_parse_and_blanks_are_null() {
        let content = "Bill_id,Bill_description,Patron_id,Last_house_committee_id,Last_house_action_date,Last_senate_committee_id,Last_senate_action_date,Last_conference_action_date,Last_governor_action_date,Introduction_date\n\
HB1,Roads,H0001,H01,1/15/2024,,,,,1/10/2024\n";
        let bill = Bill::from_row(&first_row(content)).unwrap();
        assert_eq!(bill.last_house_action_date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(bill.introduction_date, NaiveDate::from_ymd_opt(2024, 1, 10));
        assert_eq!(bill.last_senate_committee_id, None);
        assert_eq!(bill.last_senate_action_date, None);
    }

    #[test]
    fn test_bad_docket_date_is_conversion_error() {
        let row = first_row("Com_no,Doc_date,Doc_no,Bill_no\nH01,someday,1,HB1\n");
        assert_eq!(
            Docket::from_row(&row),
            Err(ConversionError::InvalidDate {
                column: "Doc_date",
                value: "someday".into()
            })
        );
    }

    #[test]
    fn test_missing_column_is_reported() {
        let row = first_row("MBR_MBRNO\nH0001\n");
        assert_eq!(
            Member::from_row(&row),
            Err(ConversionError::MissingColumn { column: "MBR_NAME" })
        );
    }

    #[test]
    fn test_vote_statement_timestamp() {
        let row = first_row(
            "Bill_id,History_refid,Vote_date,Legislator_id,Vote,Statement\nHB1, H100 ,1/20/2024 3:15:00 PM,H0001,Y,I meant to vote yes\n",
        );
        let statement = VoteStatement::from_row(&row).unwrap();
        assert_eq!(statement.ref_id.as_deref(), Some("H100"));
        assert_eq!(
            statement.voted_at,
            NaiveDate::from_ymd_opt(2024, 1, 20).and_then(|d| d.and_hms_opt(15, 15, 0))
        );
    }
}
