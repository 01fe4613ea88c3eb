use std::io;

use crate::entry::FieldMap;
use crate::hook::HookError;
use crate::level::Level;

use super::Formatter;

const NOCOLOR: u8 = 0;
const RED: u8 = 31;
const GREEN: u8 = 32;
const YELLOW: u8 = 33;
const BLUE: u8 = 36;

fn level_color(level: Level) -> u8 {
    match level {
        Level::Debug => GREEN,
        Level::Info => BLUE,
        Level::Warn => YELLOW,
        Level::Error => RED,
        Level::Track => NOCOLOR,
    }
}

/// Colorized block per event for terminals: a banner line with the level and
/// message, then one indented `key: value` line per field.
///
/// Fields named in `special_fields` are printed first, in list order; the
/// rest follow sorted by key.
#[derive(Debug, Clone)]
pub struct MultilineFormatter {
    special_fields: Vec<String>,
}

impl MultilineFormatter {
    pub fn new<I, S>(special_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            special_fields: special_fields.into_iter().map(Into::into).collect(),
        }
    }

    fn order_of(&self, key: &str) -> usize {
        self.special_fields
            .iter()
            .position(|special| special == key)
            .unwrap_or(usize::MAX)
    }
}

impl Default for MultilineFormatter {
    fn default() -> Self {
        Self::new(["error", "trace", "serving"])
    }
}

impl Formatter for MultilineFormatter {
    fn format(
        &self,
        out: &mut dyn io::Write,
        level: Level,
        message: &str,
        fields: &FieldMap,
    ) -> Result<(), HookError> {
        let mut lines = Vec::with_capacity(fields.len());
        for (key, value) in fields {
            lines.push((self.order_of(key), key, serde_json::to_string(value)?));
        }
        lines.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

        writeln!(out, "---------------")?;
        writeln!(
            out,
            "\x1b[{}m{}\x1b[0m: {:<44}",
            level_color(level),
            level,
            message
        )?;
        for (_, key, value) in lines {
            writeln!(out, "    {key}: {value}")?;
        }
        Ok(())
    }
}
