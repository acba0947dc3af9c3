// src/load.rs

use crate::config::Config;
use crate::error::{Error, Result};
use crate::plan::Plan;
use crate::records::{
    Bill, BillSubject, Committee, CommitteeMember, Docket, FiscalImpactStatement, HistoryEntry,
    Member, ParentChildSubject, Sponsor, SubDocket, SubcommitteeMember, Summary, VoteStatement,
};
use crate::schema::Table;
use crate::source::{DirectoryProvider, RawFileProvider};
use crate::store::{Dangling, Store};
use anyhow::Context;
use serde::Serialize;
use std::time::Instant;
use tracing::{info, warn};

/// Every load plan, parents before children. Fixed rather than derived: the
/// graph is small and a reader should be able to see the order.
pub static PLANS: &[Plan] = &[
    Plan::csv::<Member>(),
    Plan::csv::<Committee>(),
    Plan::csv::<CommitteeMember>(),
    Plan::csv::<SubcommitteeMember>(),
    Plan::csv::<Bill>(),
    Plan::csv::<BillSubject>(),
    Plan::csv::<ParentChildSubject>(),
    Plan::csv::<Docket>(),
    Plan::csv::<SubDocket>(),
    Plan::csv::<HistoryEntry>(),
    Plan::csv::<Sponsor>(),
    Plan::csv::<Summary>(),
    Plan::csv::<VoteStatement>(),
    Plan::csv::<FiscalImpactStatement>(),
    Plan::votes(),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableCount {
    pub table: &'static str,
    pub rows: usize,
}

/// What a successful run loaded, plus any references the source left
/// dangling (only possible when foreign keys are not enforced).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub tables: Vec<TableCount>,
    pub dangling: Vec<Dangling>,
}

/// Open the configured database and rebuild it from the raw files cached in
/// `config.data_dir`.
pub fn run(config: &Config) -> anyhow::Result<LoadSummary> {
    let mut store = Store::open(&config.db_path, config.enforce_foreign_keys)
        .with_context(|| format!("opening {}", config.db_path.display()))?;
    let provider = DirectoryProvider::new(&config.data_dir);
    info!(
        dir = %provider.dir().display(),
        db = %config.db_path.display(),
        enforce_foreign_keys = config.enforce_foreign_keys,
        "loading"
    );
    Ok(load_all(&mut store, &provider)?)
}

/// Rebuild every table from `provider`.
///
/// All target tables are dropped first, then each plan runs in order in its
/// own transaction. The first failure stops the run: tables loaded before it
/// keep their new contents and tables after it stay absent until the next
/// successful run. There is no cross-table rollback.
pub fn load_all(store: &mut Store, provider: &dyn RawFileProvider) -> Result<LoadSummary> {
    let start = Instant::now();
    let tables: Vec<&'static Table> = PLANS.iter().rev().map(Plan::table).collect();
    store.drop_tables(&tables)?;

    let mut counts = Vec::with_capacity(PLANS.len());
    for plan in PLANS {
        let rows = plan.run(store, provider)?;
        counts.push(TableCount {
            table: plan.table().name,
            rows,
        });
    }

    let dangling = store
        .foreign_key_violations()
        .map_err(Error::load("foreign_key_check"))?;
    for d in &dangling {
        warn!(table = %d.table, parent = %d.parent, rows = d.rows, "dangling references");
    }

    info!(tables = counts.len(), elapsed = ?start.elapsed(), "load complete");
    Ok(LoadSummary {
        tables: counts,
        dangling,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use crate::source::MemoryProvider;
    use rusqlite::types::Value;
    use std::fs;
    use tempfile::tempdir;

    const MEMBERS: &str = "\u{feff}MBR_MBRNO,MBR_NAME\nH0001,\"Smith, Jane   \"\nH0002,Jones\nS0001,Lee\n";
    const COMMITTEES: &str = "COM_COMNO,COM_NAME\nH01,\"Finance   \"\nS01,Courts\n";
    const COMMITTEE_MEMBERS: &str = "CMB_COMNO,CMB_MBRNO\nH01,H0001\nH01,H0002\nS01,S0001\n";
    const SUBCOMMITTEE_MEMBERS: &str =
        "SCM_HOUSE,SCM_COMNO,SCM_SUBCOMNO,SCM_MBRNO\nH,H01,1,H0001\n";
    const BILLS: &str = "Bill_id,Bill_description,Patron_id,Last_house_committee_id,Last_house_action_date,Last_senate_committee_id,Last_senate_action_date,Last_conference_action_date,Last_governor_action_date,Introduction_date\n\
HB1,Motor vehicles; speed limits on highways.,H0001,H01,1/15/2024,,,,,1/10/2024\n\
SB2,Public schools; teacher licensure.,S0001,,,S01,2/1/2024,,3/1/2024,1/11/2024\n";
    const BILL_SUBJECTS: &str = "Bill_Number,Subject_Name,Subject_Id\nHB1,Transportation,10\nSB2,Education,20\n";
    const PARENT_CHILD: &str =
        "Parent_Subject,P_Subject_Id,Child_Subject,C_Subject_Id\nGovernment,1,Transportation,10\n";
    const DOCKET: &str = "Com_no,Doc_date,Doc_no,Bill_no\nH01,1/12/2024,1,HB1\n";
    const SUBDOCKET: &str = "Com_no,Sub_no,Doc_date,Bill_no\nH01,1,1/13/2024,HB1\n";
    const HISTORY: &str = "Bill_id,History_date,History_description,History_refid\n\
HB1,1/10/2024,\"Prefiled and ordered printed   \",\n\
HB1,1/15/2024,Reported from Finance (10-Y 0-N),\" H100 \"\n\
SB2,2/1/2024,Passed Senate (40-Y 0-N),S200\n";
    const SPONSORS: &str = "MEMBER_NAME,MEMBER_ID,BILL_NUMBER,PATRON_TYPE\n\"Smith   \",H0001,HB1,Chief Patron\n";
    const SUMMARIES: &str = "SUM_BILNO,SUMMARY_DOCID,SUMMARY_TYPE,SUMMARY_TEXT\nHB1,\" HB1SUM \",Introduced,<p>Raises the speed limit.</p>\n";
    const VOTE_STATEMENTS: &str = "Bill_id,History_refid,Vote_date,Legislator_id,Vote,Statement\nSB2,S200,2/1/2024 4:30:00 PM,S0001,Y,Intended to vote yes\n";
    const FISCAL: &str = "BILL_NUMBER, \"HST_REFID\"\nHB1,H100\n";
    const VOTE: &str = "H100,H0001,Y,H0002,N\nH999\nS200,S0001,Y\n";

    fn fixture() -> MemoryProvider {
        MemoryProvider::default()
            .with("members.csv", MEMBERS)
            .with("committees.csv", COMMITTEES)
            .with("committeemembers.csv", COMMITTEE_MEMBERS)
            .with("subcommitteemembers.csv", SUBCOMMITTEE_MEMBERS)
            .with("bills.csv", BILLS)
            .with("cibillsubjects.csv", BILL_SUBJECTS)
            .with("ciparentchildsubjects.csv", PARENT_CHILD)
            .with("docket.csv", DOCKET)
            .with("subdocket.csv", SUBDOCKET)
            .with("history.csv", HISTORY)
            .with("sponsors.csv", SPONSORS)
            .with("summaries.csv", SUMMARIES)
            .with("votestatements.csv", VOTE_STATEMENTS)
            .with("fiscalimpactstatements.csv", FISCAL)
            .with("vote.csv", VOTE)
    }

    fn dump(store: &Store) -> Vec<(String, Vec<Vec<Value>>)> {
        PLANS
            .iter()
            .map(|plan| {
                let name = plan.table().name;
                let mut stmt = store
                    .connection()
                    .prepare(&format!("SELECT * FROM \"{name}\" ORDER BY rowid"))
                    .unwrap();
                let width = stmt.column_count();
                let rows = stmt
                    .query_map([], |r| (0..width).map(|i| r.get::<_, Value>(i)).collect())
                    .unwrap()
                    .collect::<rusqlite::Result<Vec<Vec<Value>>>>()
                    .unwrap();
                (name.to_string(), rows)
            })
            .collect()
    }

    #[test]
    fn test_plan_order_puts_parents_first() {
        let mut loaded: Vec<&str> = Vec::new();
        for plan in PLANS {
            let table = plan.table();
            for parent in table.parents() {
                assert!(
                    loaded.contains(&parent),
                    "{} loads before its parent {}",
                    table.name,
                    parent
                );
            }
            loaded.push(table.name);
        }
        assert_eq!(loaded.len(), 15);
    }

    #[test]
    fn test_every_source_file_is_planned_once() {
        let mut sources: Vec<&str> = PLANS.iter().map(|p| p.table().source).collect();
        sources.sort();
        sources.dedup();
        assert_eq!(sources.len(), PLANS.len());
    }

    #[test]
    fn test_load_all_counts() {
        let mut store = Store::open_in_memory(true).unwrap();
        let summary = load_all(&mut store, &fixture()).unwrap();

        let expected = [
            ("members", 3),
            ("committees", 2),
            ("committee_members", 3),
            ("subcommittee_members", 1),
            ("bills", 2),
            ("bills_subjects", 2),
            ("parent_child_subjects", 1),
            ("dockets", 1),
            ("subdockets", 1),
            ("history", 3),
            ("sponsors", 1),
            ("summaries", 1),
            ("vote_statements", 1),
            ("fiscal_impact_statements", 1),
            // "H999" has no pairs and yields nothing.
            ("votes", 3),
        ];
        let got: Vec<(&str, usize)> = summary.tables.iter().map(|t| (t.table, t.rows)).collect();
        assert_eq!(got, expected.to_vec());
        for plan in PLANS {
            let table = plan.table();
            let (_, want) = expected.iter().find(|(name, _)| *name == table.name).unwrap();
            assert_eq!(store.count(table).unwrap(), *want as i64, "{}", table.name);
        }
        assert!(summary.dangling.is_empty());
    }

    #[test]
    fn test_load_all_is_idempotent() {
        let mut store = Store::open_in_memory(false).unwrap();
        let provider = fixture();
        load_all(&mut store, &provider).unwrap();
        let first = dump(&store);
        load_all(&mut store, &provider).unwrap();
        assert_eq!(first, dump(&store));
    }

    #[test]
    fn test_referential_completeness_with_enforcement() {
        let mut store = Store::open_in_memory(true).unwrap();
        load_all(&mut store, &fixture()).unwrap();
        assert!(store.foreign_key_violations().unwrap().is_empty());
    }

    #[test]
    fn test_dangling_reference_flagged_without_enforcement() {
        let provider = fixture().with(
            "sponsors.csv",
            "MEMBER_NAME,MEMBER_ID,BILL_NUMBER,PATRON_TYPE\nGhost,H9999,HB1,Co-Patron\n",
        );
        let mut store = Store::open_in_memory(false).unwrap();
        let summary = load_all(&mut store, &provider).unwrap();
        assert_eq!(
            summary.dangling,
            vec![Dangling {
                table: "sponsors".into(),
                parent: "members".into(),
                rows: 1,
            }]
        );
    }

    #[test]
    fn test_dangling_reference_rejected_with_enforcement() {
        let provider = fixture().with(
            "sponsors.csv",
            "MEMBER_NAME,MEMBER_ID,BILL_NUMBER,PATRON_TYPE\nGhost,H9999,HB1,Co-Patron\n",
        );
        let mut store = Store::open_in_memory(true).unwrap();
        let err = load_all(&mut store, &provider).unwrap_err();
        assert!(matches!(err, Error::Load { table: "sponsors", .. }));
    }

    #[test]
    fn test_failure_halts_run_and_keeps_earlier_tables() {
        let provider = fixture().with("vote.csv", "H100,H0001\n");
        let mut store = Store::open_in_memory(false).unwrap();
        let err = load_all(&mut store, &provider).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { .. }));
        assert_eq!(store.count(&schema::MEMBERS).unwrap(), 3);
        assert!(store.count(&schema::VOTES).is_err());
    }

    #[test]
    fn test_failure_stops_before_dependents() {
        let provider = fixture().with("bills.csv", "Bill_id,Bill_description\nHB1,x\n");
        let mut store = Store::open_in_memory(false).unwrap();
        let err = load_all(&mut store, &provider).unwrap_err();
        assert!(matches!(err, Error::Conversion { table: "bills", .. }));
        assert!(store.count(&schema::HISTORY).is_err());
    }

    #[test]
    fn test_trimmed_and_converted_values() {
        let mut store = Store::open_in_memory(false).unwrap();
        load_all(&mut store, &fixture()).unwrap();
        let conn = store.connection();

        let name: String = conn
            .query_row("SELECT MBR_NAME FROM members WHERE MBR_MBRNO = 'H0001'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(name, "Smith, Jane");

        let introduced: String = conn
            .query_row("SELECT Introduction_date FROM bills WHERE Bill_id = 'HB1'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(introduced, "2024-01-10");

        let null_date: Option<String> = conn
            .query_row(
                "SELECT Last_senate_action_date FROM bills WHERE Bill_id = 'HB1'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(null_date, None);

        let voted: String = conn
            .query_row("SELECT Vote_date FROM vote_statements", [], |r| r.get(0))
            .unwrap();
        assert!(voted.starts_with("2024-02-01 16:30:00"), "{voted}");

        let refid: String = conn
            .query_row(
                "SELECT History_refid FROM history WHERE History_description LIKE 'Reported%'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(refid, "H100");
    }

    #[test]
    fn test_full_text_search_after_load() {
        let mut store = Store::open_in_memory(false).unwrap();
        load_all(&mut store, &fixture()).unwrap();
        assert_eq!(store.search(&schema::BILLS, "speed limits").unwrap(), vec!["HB1"]);
        assert_eq!(store.search(&schema::BILLS, "licensure").unwrap(), vec!["SB2"]);
        assert_eq!(
            store.search(&schema::SUMMARIES, "speed limit").unwrap(),
            vec!["HB1SUM"]
        );
    }

    #[test]
    fn test_load_from_directory() {
        let tmp = tempdir().unwrap();
        let files = [
            ("members.csv", MEMBERS),
            ("committees.csv", COMMITTEES),
            ("committeemembers.csv", COMMITTEE_MEMBERS),
            ("subcommitteemembers.csv", SUBCOMMITTEE_MEMBERS),
            ("bills.csv", BILLS),
            ("cibillsubjects.csv", BILL_SUBJECTS),
            ("ciparentchildsubjects.csv", PARENT_CHILD),
            ("docket.csv", DOCKET),
            ("subdocket.csv", SUBDOCKET),
            ("history.csv", HISTORY),
            ("sponsors.csv", SPONSORS),
            ("summaries.csv", SUMMARIES),
            ("votestatements.csv", VOTE_STATEMENTS),
            ("fiscalimpactstatements.csv", FISCAL),
            ("vote.csv", VOTE),
        ];
        for (name, content) in files {
            fs::write(tmp.path().join(name), content).unwrap();
        }

        let config = Config {
            data_dir: tmp.path().to_path_buf(),
            db_path: tmp.path().join("lis.db"),
            enforce_foreign_keys: true,
            ..Config::default()
        };
        let summary = run(&config).unwrap();
        assert_eq!(summary.tables.len(), PLANS.len());
        // A second run over the same database replaces rather than appends.
        assert_eq!(run(&config).unwrap(), summary);

        let store = Store::open(&config.db_path, false).unwrap();
        assert_eq!(store.count(&schema::FISCAL_IMPACT_STATEMENTS).unwrap(), 1);
        assert_eq!(store.count(&schema::VOTES).unwrap(), 3);
    }
}
