// src/schema.rs
//
// Target tables, declared as data. The typed record for each table lives in
// `records`; the order they load in lives in `load`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Integer,
    /// Stored as ISO-8601 `YYYY-MM-DD` text.
    Date,
    /// Stored as ISO-8601 `YYYY-MM-DD HH:MM:SS` text.
    DateTime,
}

impl ColumnType {
    pub fn sql(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text | ColumnType::Date | ColumnType::DateTime => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub unique: bool,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnType::Text)
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnType::Integer)
    }

    pub const fn date(name: &'static str) -> Self {
        Self::new(name, ColumnType::Date)
    }

    pub const fn datetime(name: &'static str) -> Self {
        Self::new(name, ColumnType::DateTime)
    }

    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            unique: false,
        }
    }

    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ForeignKey {
    pub column: &'static str,
    pub parent: &'static str,
    pub parent_column: &'static str,
}

impl ForeignKey {
    pub const fn new(
        column: &'static str,
        parent: &'static str,
        parent_column: &'static str,
    ) -> Self {
        Self {
            column,
            parent,
            parent_column,
        }
    }
}

/// A full-text index over one long-text column. Hits are reported by `key`.
#[derive(Debug, Clone, Copy)]
pub struct Search {
    pub column: &'static str,
    pub key: &'static str,
}

#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    /// Canonical (lowercase) source file name.
    pub source: &'static str,
    pub columns: &'static [Column],
    pub primary_key: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
    pub search: Option<Search>,
    /// Raw header cell → canonical column name, for files whose header
    /// carries stray whitespace or quotes.
    pub aliases: &'static [(&'static str, &'static str)],
}

impl Table {
    /// Tables this one references, in declaration order, without repeats.
    pub fn parents(&self) -> Vec<&'static str> {
        let mut parents = Vec::new();
        for fk in self.foreign_keys {
            if fk.parent != self.name && !parents.contains(&fk.parent) {
                parents.push(fk.parent);
            }
        }
        parents
    }

    pub fn search_table(&self) -> Option<String> {
        self.search.map(|_| format!("{}_fts", self.name))
    }

    pub fn create_sql(&self) -> String {
        let mut defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                let mut def = format!("\"{}\" {}", c.name, c.ty.sql());
                if self.primary_key.contains(&c.name) {
                    def.push_str(" NOT NULL");
                }
                if c.unique {
                    def.push_str(" UNIQUE");
                }
                def
            })
            .collect();

        if !self.primary_key.is_empty() {
            defs.push(format!("PRIMARY KEY ({})", quote_list(self.primary_key)));
        }
        for fk in self.foreign_keys {
            defs.push(format!(
                "FOREIGN KEY (\"{}\") REFERENCES \"{}\"(\"{}\")",
                fk.column, fk.parent, fk.parent_column
            ));
        }

        format!("CREATE TABLE \"{}\" (\n  {}\n)", self.name, defs.join(",\n  "))
    }

    pub fn insert_sql(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name).collect();
        let slots: Vec<String> = (1..=names.len()).map(|i| format!("?{i}")).collect();
        format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            self.name,
            quote_list(&names),
            slots.join(", ")
        )
    }

    /// External-content FTS5 table mirroring the searchable column.
    pub fn create_search_sql(&self) -> Option<String> {
        let search = self.search?;
        Some(format!(
            "CREATE VIRTUAL TABLE \"{}_fts\" USING fts5(\"{}\", content='{}', content_rowid='rowid')",
            self.name, search.column, self.name
        ))
    }
}

fn quote_list(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!("\"{n}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Independent tables
// =============================================================================

pub static MEMBERS: Table = Table {
    name: "members",
    source: "members.csv",
    columns: &[Column::text("MBR_MBRNO"), Column::text("MBR_NAME")],
    primary_key: &["MBR_MBRNO"],
    foreign_keys: &[],
    search: None,
    aliases: &[],
};

pub static COMMITTEES: Table = Table {
    name: "committees",
    source: "committees.csv",
    columns: &[Column::text("COM_COMNO"), Column::text("COM_NAME")],
    primary_key: &["COM_COMNO"],
    foreign_keys: &[],
    search: None,
    aliases: &[],
};

pub static PARENT_CHILD_SUBJECTS: Table = Table {
    name: "parent_child_subjects",
    source: "ciparentchildsubjects.csv",
    columns: &[
        Column::text("Parent_Subject"),
        Column::integer("P_Subject_Id"),
        Column::text("Child_Subject"),
        Column::integer("C_Subject_Id"),
    ],
    primary_key: &["P_Subject_Id", "C_Subject_Id"],
    foreign_keys: &[],
    search: None,
    aliases: &[],
};

// =============================================================================
// Member / committee dependents
// =============================================================================

pub static COMMITTEE_MEMBERS: Table = Table {
    name: "committee_members",
    source: "committeemembers.csv",
    columns: &[Column::text("CMB_COMNO"), Column::text("CMB_MBRNO")],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("CMB_COMNO", "committees", "COM_COMNO"),
        ForeignKey::new("CMB_MBRNO", "members", "MBR_MBRNO"),
    ],
    search: None,
    aliases: &[],
};

pub static SUBCOMMITTEE_MEMBERS: Table = Table {
    name: "subcommittee_members",
    source: "subcommitteemembers.csv",
    columns: &[
        Column::text("SCM_HOUSE"),
        Column::text("SCM_COMNO"),
        Column::text("SCM_SUBCOMNO"),
        Column::text("SCM_MBRNO"),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("SCM_COMNO", "committees", "COM_COMNO"),
        ForeignKey::new("SCM_MBRNO", "members", "MBR_MBRNO"),
    ],
    search: None,
    aliases: &[],
};

pub static BILLS: Table = Table {
    name: "bills",
    source: "bills.csv",
    columns: &[
        Column::text("Bill_id"),
        Column::text("Bill_description"),
        Column::text("Patron_id"),
        Column::text("Last_house_committee_id"),
        Column::date("Last_house_action_date"),
        Column::text("Last_senate_committee_id"),
        Column::date("Last_senate_action_date"),
        Column::date("Last_conference_action_date"),
        Column::date("Last_governor_action_date"),
        Column::date("Introduction_date"),
    ],
    primary_key: &["Bill_id"],
    foreign_keys: &[
        ForeignKey::new("Patron_id", "members", "MBR_MBRNO"),
        ForeignKey::new("Last_house_committee_id", "committees", "COM_COMNO"),
        ForeignKey::new("Last_senate_committee_id", "committees", "COM_COMNO"),
    ],
    search: Some(Search {
        column: "Bill_description",
        key: "Bill_id",
    }),
    aliases: &[],
};

// =============================================================================
// Bill dependents
// =============================================================================

pub static BILL_SUBJECTS: Table = Table {
    name: "bills_subjects",
    source: "cibillsubjects.csv",
    columns: &[
        Column::text("Bill_Number"),
        Column::text("Subject_Name"),
        Column::integer("Subject_Id"),
    ],
    primary_key: &["Bill_Number", "Subject_Name", "Subject_Id"],
    foreign_keys: &[ForeignKey::new("Bill_Number", "bills", "Bill_id")],
    search: None,
    aliases: &[],
};

pub static DOCKETS: Table = Table {
    name: "dockets",
    source: "docket.csv",
    columns: &[
        Column::text("Com_no"),
        Column::date("Doc_date"),
        Column::integer("Doc_no"),
        Column::text("Bill_no"),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("Com_no", "committees", "COM_COMNO"),
        ForeignKey::new("Bill_no", "bills", "Bill_id"),
    ],
    search: None,
    aliases: &[],
};

pub static SUBDOCKETS: Table = Table {
    name: "subdockets",
    source: "subdocket.csv",
    columns: &[
        Column::text("Com_no"),
        Column::text("Sub_no"),
        Column::date("Doc_date"),
        Column::text("Bill_no"),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("Com_no", "committees", "COM_COMNO"),
        ForeignKey::new("Bill_no", "bills", "Bill_id"),
    ],
    search: None,
    aliases: &[],
};

/// `History_refid` is unique so vote and fiscal impact rows can reference it.
pub static HISTORY: Table = Table {
    name: "history",
    source: "history.csv",
    columns: &[
        Column::text("Bill_id"),
        Column::text("History_date"),
        Column::text("History_description"),
        Column::text("History_refid").unique(),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("Bill_id", "bills", "Bill_id")],
    search: None,
    aliases: &[],
};

pub static SPONSORS: Table = Table {
    name: "sponsors",
    source: "sponsors.csv",
    columns: &[
        Column::text("MEMBER_NAME"),
        Column::text("MEMBER_ID"),
        Column::text("BILL_NUMBER"),
        Column::text("PATRON_TYPE"),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("MEMBER_ID", "members", "MBR_MBRNO"),
        ForeignKey::new("BILL_NUMBER", "bills", "Bill_id"),
    ],
    search: None,
    aliases: &[],
};

pub static SUMMARIES: Table = Table {
    name: "summaries",
    source: "summaries.csv",
    columns: &[
        Column::text("SUM_BILNO"),
        Column::text("SUMMARY_DOCID"),
        Column::text("SUMMARY_TYPE"),
        Column::text("SUMMARY_TEXT"),
    ],
    primary_key: &[],
    foreign_keys: &[ForeignKey::new("SUM_BILNO", "bills", "Bill_id")],
    search: Some(Search {
        column: "SUMMARY_TEXT",
        key: "SUMMARY_DOCID",
    }),
    aliases: &[],
};

// =============================================================================
// History dependents
// =============================================================================

pub static VOTE_STATEMENTS: Table = Table {
    name: "vote_statements",
    source: "votestatements.csv",
    columns: &[
        Column::text("Bill_id"),
        Column::text("History_refid"),
        Column::datetime("Vote_date"),
        Column::text("Legislator_id"),
        Column::text("Vote"),
        Column::text("Statement"),
    ],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("Bill_id", "bills", "Bill_id"),
        ForeignKey::new("History_refid", "history", "History_refid"),
        ForeignKey::new("Legislator_id", "members", "MBR_MBRNO"),
    ],
    search: None,
    aliases: &[],
};

pub static FISCAL_IMPACT_STATEMENTS: Table = Table {
    name: "fiscal_impact_statements",
    source: "fiscalimpactstatements.csv",
    columns: &[Column::text("BILL_NUMBER"), Column::text("HST_REFID")],
    primary_key: &[],
    foreign_keys: &[
        ForeignKey::new("BILL_NUMBER", "bills", "Bill_id"),
        ForeignKey::new("HST_REFID", "history", "History_refid"),
    ],
    search: None,
    aliases: &[
        (" \"BILL_NUMBER\"", "BILL_NUMBER"),
        (" \"HST_REFID\"", "HST_REFID"),
    ],
};

/// Unpivoted from VOTE.CSV; never read through the headed row reader.
pub static VOTES: Table = Table {
    name: "votes",
    source: "vote.csv",
    columns: &[
        Column::text("History_refid"),
        Column::text("MBR_MBRNO"),
        Column::text("vote_status"),
    ],
    primary_key: &["History_refid", "MBR_MBRNO"],
    foreign_keys: &[
        ForeignKey::new("History_refid", "history", "History_refid"),
        ForeignKey::new("MBR_MBRNO", "members", "MBR_MBRNO"),
    ],
    search: None,
    aliases: &[],
};
