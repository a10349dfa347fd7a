//! Line and statement formatting primitives.
//!
//! Everything the JCL builder and the command renderers emit passes through
//! these helpers: fixed-width name fields, ordered `KEY=VALUE` parameter
//! lists, 72-column statement continuation and 80-column card wrapping.
//!
//! # Examples
//!
//! ```
//! use cics_provision_core::{Parameters, format_field_name, join_parameters, split_at_72};
//!
//! assert_eq!(format_field_name("cout"), "COUT     ");
//!
//! let params = Parameters::new().with("disp", "SHR").with("dummy", "");
//! assert_eq!(join_parameters(&params), "DISP=SHR,DUMMY");
//!
//! let short = "//COUT     DD DISP=SHR";
//! assert_eq!(split_at_72(short), vec![short.to_string()]);
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Prefix of every JCL statement.
pub const JCL_PREFIX: &str = "//";

/// Prefix of a continuation line: `//` followed by an empty name field.
pub const CONTINUATION_PREFIX: &str = "//         ";

/// Width of the name field, including the separating blank.
pub const NAME_FIELD_WIDTH: usize = 9;

/// Maximum number of columns a JCL statement line may occupy.
pub const MAX_LINE_LENGTH: usize = 72;

/// Width of a SYSIN card image.
pub const CARD_IMAGE_LENGTH: usize = 80;

/// Parameters whose value is free text and must be single-quoted.
const QUOTED_TEXT_KEYS: &[&str] = &["GMTEXT"];

static ALREADY_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"'([^']|'')*'"$"#).expect("static regex must compile"));

/// Ordered list of keyword parameters.
///
/// Insertion order is preserved because JCL and utility control statements
/// are read positionally by humans even where the syntax does not require it.
/// An empty value renders as a bare keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(Vec<(String, String)>);

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter and returns `self` for chaining.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(key, value);
        self
    }

    /// Appends a parameter, or replaces the value of an existing key
    /// (compared case-insensitively) in place.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self
            .0
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&key))
        {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    /// Looks up a value by key, ignoring case.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Parameters::new();
        for (key, value) in iter {
            params.push(key, value);
        }
        params
    }
}

/// Uppercases `name` and left-justifies it into the 9-column name field.
///
/// Names longer than eight characters are not truncated; callers validate
/// name length before rendering.
pub fn format_field_name(name: &str) -> String {
    format!("{:<width$}", name.to_uppercase(), width = NAME_FIELD_WIDTH)
}

/// Renders each parameter as `KEY=VALUE`, or `KEY` when the value is empty.
///
/// Keys are always uppercased. Values of free-text keys such as `GMTEXT` are
/// single-quoted with embedded apostrophes doubled.
pub fn parameter_pairs(params: &Parameters) -> Vec<String> {
    params
        .iter()
        .map(|(key, value)| {
            let key = key.to_uppercase();
            if value.is_empty() {
                key
            } else if QUOTED_TEXT_KEYS.contains(&key.as_str()) {
                format!("{key}={}", quote_text(value))
            } else {
                format!("{key}={value}")
            }
        })
        .collect()
}

/// Comma-joins [`parameter_pairs`].
pub fn join_parameters(params: &Parameters) -> String {
    parameter_pairs(params).join(",")
}

/// Splits a statement longer than 72 columns at comma boundaries.
///
/// Commas inside parentheses or apostrophes are not boundaries, so a
/// `KEY=(A,B)` operand always stays on one line. Every line except the last
/// keeps its trailing comma, and continuation lines start with
/// [`CONTINUATION_PREFIX`]. A single operand too long to fit is emitted
/// over-length rather than being broken.
///
/// # Examples
///
/// ```
/// use cics_provision_core::split_at_72;
///
/// let line = "//TOOLONG  DD DISP=SHR,DSN=TOOLONGNAME,PARM1=ONE,PARM2=TWO,PARM3=THREE,PARM4=FOUR";
/// assert_eq!(
///     split_at_72(line),
///     vec![
///         "//TOOLONG  DD DISP=SHR,DSN=TOOLONGNAME,PARM1=ONE,PARM2=TWO,PARM3=THREE,",
///         "//         PARM4=FOUR",
///     ]
/// );
/// ```
pub fn split_at_72(line: &str) -> Vec<String> {
    if columns(line) <= MAX_LINE_LENGTH {
        return vec![line.to_string()];
    }

    let mut operands = top_level_operands(line).into_iter();
    let Some(first) = operands.next() else {
        return vec![line.to_string()];
    };

    let mut lines = Vec::new();
    let mut current = first.to_string();
    for operand in operands {
        // Room for the separating comma plus the trailing continuation comma.
        if columns(&current) + 2 + columns(operand) > MAX_LINE_LENGTH {
            current.push(',');
            lines.push(std::mem::take(&mut current));
            current = format!("{CONTINUATION_PREFIX}{operand}");
        } else {
            current.push(',');
            current.push_str(operand);
        }
    }
    lines.push(current);
    lines
}

/// Applies [`split_at_72`] to every line and flattens the result.
pub fn split_all(lines: &[String]) -> Vec<String> {
    lines.iter().flat_map(|line| split_at_72(line)).collect()
}

/// Cuts a card image into `width`-column chunks.
pub fn wrap_card_image(line: &str, width: usize) -> Vec<String> {
    if width == 0 || columns(line) <= width {
        return vec![line.to_string()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Single-quotes free text, doubling embedded apostrophes.
///
/// Text already in the `"'...'"` form is passed through untouched. Otherwise
/// surrounding double quotes and then apostrophes are stripped before quoting.
///
/// # Examples
///
/// ```
/// use cics_provision_core::quote_text;
///
/// assert_eq!(quote_text("hello"), "'hello'");
/// assert_eq!(quote_text("'hello'"), "'hello'");
/// assert_eq!(quote_text("\"hel'lo\""), "'hel''lo'");
/// ```
pub fn quote_text(value: &str) -> String {
    if ALREADY_QUOTED.is_match(value) {
        return value.to_string();
    }
    let stripped = value.trim_matches('"').trim_matches('\'');
    format!("'{}'", stripped.replace('\'', "''"))
}

/// Quotes a programmer name for the JOB statement.
pub fn quote_programmer_name(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

/// Display width of a line. JCL is single-byte, so chars are columns.
pub(crate) fn columns(text: &str) -> usize {
    text.chars().count()
}

/// Splits on commas that are outside parentheses and quoted strings.
fn top_level_operands(line: &str) -> Vec<&str> {
    let mut operands = Vec::new();
    let mut depth = 0usize;
    let mut quoted = false;
    let mut start = 0;
    for (idx, ch) in line.char_indices() {
        match ch {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => depth = depth.saturating_sub(1),
            ',' if !quoted && depth == 0 => {
                operands.push(&line[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    operands.push(&line[start..]);
    operands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_field_name_pads_to_nine() {
        assert_eq!(format_field_name("TEST"), "TEST     ");
        assert_eq!(format_field_name("steplib"), "STEPLIB  ");
        assert_eq!(format_field_name(""), "         ");
    }

    #[test]
    fn test_parameter_pairs_uppercase_keys_only() {
        let params = Parameters::new()
            .with("Val1", "One")
            .with("Val2", "Two")
            .with("Val3", "Three");
        assert_eq!(parameter_pairs(&params), vec!["VAL1=One", "VAL2=Two", "VAL3=Three"]);
    }

    #[test]
    fn test_join_parameters_round_trips() {
        let params = Parameters::new()
            .with("disp", "SHR")
            .with("dsn", "DATA.SET.NAME")
            .with("dummy", "");
        let joined = join_parameters(&params);
        let recovered: Vec<(String, String)> = joined
            .split(',')
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();
        assert_eq!(
            recovered,
            vec![
                ("DISP".to_string(), "SHR".to_string()),
                ("DSN".to_string(), "DATA.SET.NAME".to_string()),
                ("DUMMY".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_gmtext_value_is_quoted() {
        let params = Parameters::new().with("gmtext", "Welcome to Bob's CICS");
        assert_eq!(join_parameters(&params), "GMTEXT='Welcome to Bob''s CICS'");
    }

    #[test]
    fn test_push_replaces_existing_key() {
        let mut params = Parameters::new().with("class", "A").with("user", "BOB");
        params.push("CLASS", "B");
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("class"), Some("B"));
        assert_eq!(join_parameters(&params), "CLASS=B,USER=BOB");
    }

    #[test]
    fn test_split_short_line_untouched() {
        let line = "//NOTLONG  DD DISP=SHR,DSN=TOOLONGNAME,PARM1=ONE";
        assert_eq!(split_at_72(line), vec![line]);
    }

    #[test]
    fn test_split_long_job_statement() {
        let line = "//TESTJOB  JOB CLASS=A,USER=KIERA,REGION=0M,MSGCLASS=A,MEMLIMIT=10G,\
ADDITIONAL_PARAMETER=TESTONE,ADDITIONAL_PARAMETER1=TESTTWO";
        assert_eq!(
            split_at_72(line),
            vec![
                "//TESTJOB  JOB CLASS=A,USER=KIERA,REGION=0M,MSGCLASS=A,MEMLIMIT=10G,",
                "//         ADDITIONAL_PARAMETER=TESTONE,ADDITIONAL_PARAMETER1=TESTTWO",
            ]
        );
    }

    #[test]
    fn test_split_keeps_parenthesised_operand_together() {
        let line = "//DFHAUXT  DD DSN=CICS.REGION.DFHAUXT,DISP=(NEW,CATLG,DELETE),\
SPACE=(CYL,(20,4)),RECFM=VB";
        let split = split_at_72(line);
        assert!(split.iter().all(|l| columns(l) <= MAX_LINE_LENGTH));
        assert!(split.iter().any(|l| l.contains("DISP=(NEW,CATLG,DELETE)")));
        assert!(split.iter().any(|l| l.contains("SPACE=(CYL,(20,4))")));
    }

    #[test]
    fn test_split_every_line_fits() {
        let operands: Vec<String> = (0..40).map(|i| format!("PARM{i}=VALUE{i}")).collect();
        let line = format!("//BIG      DD {}", operands.join(","));
        let split = split_at_72(&line);
        assert!(split.len() > 1);
        for l in &split {
            assert!(columns(l) <= MAX_LINE_LENGTH, "{l}");
        }
        for l in &split[1..] {
            assert!(l.starts_with(CONTINUATION_PREFIX));
        }

        let rejoined: String = split
            .iter()
            .enumerate()
            .map(|(i, l)| {
                if i == 0 {
                    l.as_str()
                } else {
                    &l[CONTINUATION_PREFIX.len()..]
                }
            })
            .collect();
        assert_eq!(rejoined, line);
    }

    #[test]
    fn test_split_does_not_break_oversized_token() {
        let token = format!("DSN={}", "A".repeat(80));
        let line = format!("//LONG     DD {token}");
        let split = split_at_72(&line);
        assert_eq!(split, vec![line.clone()]);
        assert!(columns(&split[0]) > MAX_LINE_LENGTH);
    }

    #[test]
    fn test_wrap_card_image() {
        let line = "X".repeat(170);
        let wrapped = wrap_card_image(&line, CARD_IMAGE_LENGTH);
        assert_eq!(wrapped.len(), 3);
        assert_eq!(wrapped[0].len(), 80);
        assert_eq!(wrapped[1].len(), 80);
        assert_eq!(wrapped[2].len(), 10);
        assert_eq!(wrap_card_image("SHORT", CARD_IMAGE_LENGTH), vec!["SHORT"]);
    }

    #[test]
    fn test_quote_text() {
        assert_eq!(quote_text("'hello'"), "'hello'");
        assert_eq!(quote_text("hello"), "'hello'");
        assert_eq!(quote_text("\"'hello'\""), "\"'hello'\"");
        assert_eq!(quote_text("\"hel'lo\""), "'hel''lo'");
        assert_eq!(quote_text("hel'lo"), "'hel''lo'");
        assert_eq!(quote_text("h'e'l'l'o"), "'h''e''l''l''o'");
    }

    #[test]
    fn test_quote_programmer_name() {
        assert_eq!(quote_programmer_name("USER"), "'USER'");
        assert_eq!(quote_programmer_name("USER'NAME"), "'USER''NAME'");
    }
}
