//! Archivage des roulements résolus : un document JSON versionné par fichier.

use crate::report::RosterView;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Version du document écrit par [`JsonStorage`].
pub const ROSTER_FORMAT: u32 = 1;

pub trait Storage {
    /// Charge un roulement résolu depuis un support.
    fn load(&self) -> anyhow::Result<RosterView>;
    /// Sauvegarde de manière atomique.
    fn save(&self, view: &RosterView) -> anyhow::Result<()>;
}

#[derive(Serialize, Deserialize)]
struct RosterDocument<'a> {
    format: u32,
    roster: Cow<'a, RosterView>,
}

/// Un fichier JSON par roulement, remplacé par renommage atomique.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.is_dir() {
            bail!("{} is a directory, expected a roster file", path.display());
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonStorage {
    fn load(&self) -> anyhow::Result<RosterView> {
        let data = fs::read(&self.path).with_context(|| format!("reading {}", self.path.display()))?;
        let doc: RosterDocument<'static> = serde_json::from_slice(&data)
            .with_context(|| format!("parsing roster {}", self.path.display()))?;
        if doc.format != ROSTER_FORMAT {
            bail!(
                "{} uses roster format {}, expected {ROSTER_FORMAT}",
                self.path.display(),
                doc.format
            );
        }
        let view = doc.roster.into_owned();
        check_shape(&view).with_context(|| format!("inconsistent roster {}", self.path.display()))?;
        Ok(view)
    }

    fn save(&self, view: &RosterView) -> anyhow::Result<()> {
        check_shape(view).context("refusing to store an inconsistent roster")?;
        let doc = RosterDocument {
            format: ROSTER_FORMAT,
            roster: Cow::Borrowed(view),
        };
        let json = serde_json::to_vec_pretty(&doc)?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir).with_context(|| "creating temp file")?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).with_context(|| "atomic rename")?;
        Ok(())
    }
}

/// Chaque ligne couvre 2N jours et ne porte que des postes connus ou le repos.
fn check_shape(view: &RosterView) -> anyhow::Result<()> {
    let width = 2 * view.num_days as usize;
    for row in &view.staff {
        if row.labels.len() != width {
            bail!(
                "{} has {} labels, expected {width}",
                row.staff,
                row.labels.len()
            );
        }
        if let Some(label) = row
            .labels
            .iter()
            .find(|l| **l != view.rest_label && !view.shifts.contains(l))
        {
            bail!("{} works unknown shift {label}", row.staff);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::StaffRow;
    use tempfile::tempdir;

    fn view() -> RosterView {
        RosterView {
            run_id: "run-7".to_string(),
            status: "FEASIBLE".to_string(),
            num_days: 1,
            start_date: None,
            rest_label: "X".to_string(),
            shifts: vec!["D".to_string()],
            staff: vec![StaffRow {
                staff: "S1".to_string(),
                role: "R".to_string(),
                labels: vec!["X".to_string(), "D".to_string()],
                unpleasant: 0,
            }],
            fairness_bound: None,
        }
    }

    #[test]
    fn document_carries_its_format() {
        let dir = tempdir().unwrap();
        let storage = JsonStorage::open(dir.path().join("r.json")).unwrap();
        storage.save(&view()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&fs::read(storage.path()).unwrap()).unwrap();
        assert_eq!(raw["format"], ROSTER_FORMAT);
        assert_eq!(raw["roster"]["run_id"], "run-7");
        assert_eq!(storage.load().unwrap(), view());
    }

    #[test]
    fn other_format_is_refused() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("r.json");
        let doc = serde_json::json!({ "format": 99, "roster": view() });
        fs::write(&path, doc.to_string()).unwrap();
        let err = JsonStorage::open(&path).unwrap().load().unwrap_err();
        assert!(err.to_string().contains("format 99"));
    }

    #[test]
    fn malformed_rows_are_neither_saved_nor_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("r.json");
        let storage = JsonStorage::open(&path).unwrap();

        let mut short = view();
        short.staff[0].labels.pop();
        assert!(storage.save(&short).is_err());
        assert!(!path.exists());

        let mut stray = view();
        stray.staff[0].labels[1] = "N".to_string();
        let doc = serde_json::json!({ "format": ROSTER_FORMAT, "roster": stray });
        fs::write(&path, doc.to_string()).unwrap();
        let err = storage.load().unwrap_err();
        assert!(format!("{err:#}").contains("unknown shift N"));
    }

    #[test]
    fn directory_is_not_a_roster_file() {
        let dir = tempdir().unwrap();
        assert!(JsonStorage::open(dir.path()).is_err());
    }
}
