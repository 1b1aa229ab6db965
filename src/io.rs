use crate::report::RosterView;
use anyhow::{bail, Context};
use csv::{ReaderBuilder, WriterBuilder};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

/// Import d'historique depuis CSV: header `staff,d1,...,dN`, une ligne par membre
pub fn import_history_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<BTreeMap<String, Vec<String>>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening history {}", path.display()))?;
    read_history(file).with_context(|| format!("reading history {}", path.display()))
}

pub fn read_history<R: Read>(reader: R) -> anyhow::Result<BTreeMap<String, Vec<String>>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut out = BTreeMap::new();
    for rec in rdr.records() {
        let rec = rec?;
        let staff = rec.get(0).context("missing staff")?.trim();
        if staff.is_empty() {
            bail!("invalid history row (empty staff)");
        }
        let labels: Vec<String> = rec.iter().skip(1).map(|s| s.trim().to_string()).collect();
        if labels.iter().any(String::is_empty) {
            bail!("empty shift label in history of {staff}");
        }
        if out.insert(staff.to_string(), labels).is_some() {
            bail!("history of {staff} given twice");
        }
    }
    Ok(out)
}

/// Export CSV du roulement: header `staff,role,<jours>,unpleasant`
pub fn export_roster_csv<P: AsRef<Path>>(
    path: P,
    view: &RosterView,
    include_history: bool,
) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_roster(file, view, include_history)
}

pub fn write_roster<W: Write>(writer: W, view: &RosterView, include_history: bool) -> anyhow::Result<()> {
    let days = if include_history {
        view.days()
    } else {
        view.current_days()
    };
    let skip = (days.start() - view.first_day()) as usize;

    let mut w = WriterBuilder::new().has_headers(true).from_writer(writer);
    let mut buf = itoa::Buffer::new();
    let mut header = vec!["staff".to_string(), "role".to_string()];
    header.extend(days.map(|day| buf.format(day).to_string()));
    header.push("unpleasant".to_string());
    w.write_record(&header)?;

    for row in &view.staff {
        let mut record: Vec<&str> = vec![row.staff.as_str(), row.role.as_str()];
        record.extend(row.labels.iter().skip(skip).map(String::as_str));
        record.push(buf.format(row.unpleasant));
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::StaffRow;

    #[test]
    fn history_rows_are_keyed_by_staff() {
        let data = "staff,1,2,3\nA, X ,D,D\nB,N,X,X\n";
        let history = read_history(data.as_bytes()).unwrap();
        assert_eq!(history["A"], ["X", "D", "D"]);
        assert_eq!(history["B"], ["N", "X", "X"]);
    }

    #[test]
    fn duplicate_history_is_rejected() {
        let data = "staff,1\nA,X\nA,D\n";
        let err = read_history(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn roster_csv_lists_days_then_unpleasant_count() {
        let view = RosterView {
            run_id: "r".into(),
            status: "OPTIMAL".into(),
            num_days: 2,
            start_date: None,
            rest_label: "X".into(),
            shifts: vec!["D".into()],
            staff: vec![StaffRow {
                staff: "A".into(),
                role: "R".into(),
                labels: vec!["D".into(), "X".into(), "X".into(), "D".into()],
                unpleasant: 0,
            }],
            fairness_bound: None,
        };

        let mut out = Vec::new();
        write_roster(&mut out, &view, false).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "staff,role,1,2,unpleasant\nA,R,X,D,0\n");

        let mut out = Vec::new();
        write_roster(&mut out, &view, true).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "staff,role,-1,0,1,2,unpleasant\nA,R,D,X,X,D,0\n"
        );
    }
}
