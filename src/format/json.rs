use std::io;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::entry::FieldMap;
use crate::hook::HookError;
use crate::level::Level;

use super::Formatter;

/// Keys the formatter writes itself; caller fields under these names are
/// renamed to `fields.<name>` so nothing is lost.
const RESERVED: [&str; 3] = ["level", "message", "time"];

/// One JSON object per line: all entry fields plus `level`, `message` and an
/// RFC 3339 UTC `time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format(
        &self,
        out: &mut dyn io::Write,
        level: Level,
        message: &str,
        fields: &FieldMap,
    ) -> Result<(), HookError> {
        let mut record = fields.clone();
        for key in RESERVED {
            if let Some(value) = record.remove(key) {
                record.insert(format!("fields.{key}"), value);
            }
        }
        record.insert("level".into(), Value::from(level.as_str()));
        record.insert("message".into(), Value::from(message));
        record.insert(
            "time".into(),
            Value::from(Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)),
        );

        serde_json::to_writer(&mut *out, &record)?;
        out.write_all(b"\n")?;
        Ok(())
    }
}
