// src/fetch.rs
//
// Pulls the daily CSV exports off the LIS blob store into a local directory,
// renamed to their canonical lowercase names. Best effort: no retries, and
// the first failed download fails the fetch.

use crate::source::canonical_name;
use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Datelike, Utc};
use futures::future::try_join_all;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::{fs, io::AsyncWriteExt};
use tracing::{debug, info};
use url::Url;

pub const FILES_ENDPOINT: &str = "https://lis.blob.core.windows.net/lisfiles/";

/// Published names, with the portal's inconsistent casing.
pub static PUBLISHED_FILES: &[&str] = &[
    "Amendments.csv",
    "BILLS.CSV",
    "CIBillSubjects.csv",
    "CIParentChildSubjects.csv",
    "CommitteeMembers.csv",
    "Committees.csv",
    "DOCKET.CSV",
    "FiscalImpactStatements.csv",
    "HISTORY.CSV",
    "Members.csv",
    "Sponsors.csv",
    "SubCommitteeMembers.csv",
    "SUBDOCKET.CSV",
    "Summaries.csv",
    "VOTE.CSV",
    "VoteStatements.csv",
];

/// Present in every live session; used to probe for one.
const CANARY_FILE: &str = "BILLS.CSV";

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchedFile {
    pub published: String,
    pub canonical: String,
    pub bytes: u64,
}

/// Written next to the raw files after a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub session: String,
    pub fetched_at: DateTime<Utc>,
    pub files: Vec<FetchedFile>,
}

/// Session codes to probe, most likely first: `YYYYN` where N is 3, 2, 1
/// (special sessions before the regular one), this year then last year.
pub fn session_candidates(year: i32) -> Vec<String> {
    [year, year - 1]
        .iter()
        .flat_map(|y| [3, 2, 1].map(|n| format!("{y}{n}")))
        .collect()
}

pub fn file_url(session: &str, published: &str) -> Result<Url> {
    let base = Url::parse(FILES_ENDPOINT)?;
    base.join(&format!("{session}/{published}"))
        .with_context(|| format!("building URL for {published} in session {session}"))
}

/// Find the current session by probing for the canary file.
pub async fn discover_session(client: &Client) -> Result<String> {
    for session in session_candidates(Utc::now().year()) {
        let url = file_url(&session, CANARY_FILE)?;
        let resp = client
            .head(url.clone())
            .send()
            .await
            .with_context(|| format!("HEAD {url}"))?;
        debug!(session = %session, status = %resp.status(), "probed session");
        if resp.status() == StatusCode::OK {
            info!(session = %session, "found legislative session");
            return Ok(session);
        }
    }
    Err(anyhow!(
        "could not determine the session by probing for {CANARY_FILE}"
    ))
}

/// Stream one published file to `<dir>/<canonical name>`.
pub async fn download_file(
    client: &Client,
    session: &str,
    published: &str,
    dir: &Path,
) -> Result<FetchedFile> {
    let url = file_url(session, published)?;
    let canonical = canonical_name(published);
    let dest = dir.join(&canonical);
    let tmp = dir.join(format!("{canonical}.tmp"));

    let mut resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {url}"))?
        .error_for_status()
        .with_context(|| format!("GET {url}"))?;

    let mut file = fs::File::create(&tmp)
        .await
        .with_context(|| format!("creating {}", tmp.display()))?;
    let mut bytes = 0u64;
    while let Some(chunk) = resp.chunk().await.with_context(|| format!("reading {url}"))? {
        file.write_all(&chunk).await?;
        bytes += chunk.len() as u64;
    }
    file.flush().await?;
    drop(file);

    fs::rename(&tmp, &dest)
        .await
        .with_context(|| format!("renaming {} to {}", tmp.display(), dest.display()))?;
    info!(file = %canonical, bytes, "downloaded");

    Ok(FetchedFile {
        published: published.to_string(),
        canonical,
        bytes,
    })
}

/// Download every published file concurrently, then write the manifest.
/// The files are independent, so completion order does not matter.
pub async fn download_all(client: &Client, session: &str, dir: &Path) -> Result<Manifest> {
    fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    let files = try_join_all(
        PUBLISHED_FILES
            .iter()
            .map(|published| download_file(client, session, published, dir)),
    )
    .await?;

    let manifest = Manifest {
        session: session.to_string(),
        fetched_at: Utc::now(),
        files,
    };
    write_manifest(dir, &manifest).await?;
    Ok(manifest)
}

pub async fn write_manifest(dir: &Path, manifest: &Manifest) -> Result<PathBuf> {
    let path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_vec_pretty(manifest)?;
    fs::write(&path, json)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

pub async fn read_manifest(dir: &Path) -> Result<Manifest> {
    let path = dir.join(MANIFEST_FILE);
    let json = fs::read(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let manifest: Manifest = serde_json::from_slice(&json)?;
    if manifest.files.is_empty() {
        bail!("{} lists no files", path.display());
    }
    Ok(manifest)
}
