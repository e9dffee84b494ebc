use crate::common::model::{ComputedRecord, Record};
use crate::errors::{Error, ErrorKind, InputError, OutputError, Result};
use log::debug;
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Reads and fully parses the input array before any work starts.
pub async fn read_records(path: impl AsRef<Path>) -> Result<Vec<Record>> {
    let path = path.as_ref();
    let data = fs::read(path).await.map_err(|source| InputError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let records: Vec<Record> = serde_json::from_slice(&data).map_err(|source| {
        Error::with_message(
            ErrorKind::Input,
            format!("parsing {}", path.display()),
            Some(InputError::Parse(source)),
        )
    })?;
    if let Some((index, record)) = records
        .iter()
        .enumerate()
        .find(|(_, r)| r.requested_hour > 23)
    {
        return Err(InputError::InvalidHour {
            index,
            hour: record.requested_hour,
        }
        .into());
    }

    debug!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

pub fn render_report(records: &[ComputedRecord]) -> String {
    let mut report = String::with_capacity(records.len() * 80 + 16);
    for record in records {
        let _ = writeln!(report, "{record}");
    }
    let _ = writeln!(report, "Count: {}", records.len());
    report
}

/// Renders the report in memory, then writes it in one go.
pub async fn write_report(path: impl AsRef<Path>, records: &[ComputedRecord]) -> Result<()> {
    let path = path.as_ref();
    let report = render_report(records);
    let to_err = |source| OutputError::Write {
        path: path.display().to_string(),
        source,
    };

    let mut file = fs::File::create(path).await.map_err(to_err)?;
    file.write_all(report.as_bytes()).await.map_err(to_err)?;
    file.flush().await.map_err(to_err)?;

    debug!("Wrote {} bytes to {}", report.len(), path.display());
    Ok(())
}
