//! JCL job stream construction.
//!
//! A [`JobDescription`] holds one job card and an ordered list of
//! [`ExecStep`]s, each with its DD statements. [`JobDescription::render`]
//! turns it into card images: the JOB statement, every EXEC statement
//! followed by its DDs in declaration order, and a closing `//` null
//! statement. Statement lines go through [`split_at_72`]; in-stream data
//! lines are written verbatim.
//!
//! # Examples
//!
//! ```
//! use cics_provision_core::*;
//!
//! let job = JobDescription::new(JobCard::new("IEFBR14").with_parameter("CLASS", "A"))
//!     .with_step(
//!         ExecStep::new("STEP1")
//!             .with_program("IEFBR14")
//!             .with_dd(DdEntry::parameters(
//!                 "DD1",
//!                 Parameters::new().with("DSN", "MY.DATA").with("DISP", "SHR"),
//!             )),
//!     );
//!
//! assert_eq!(
//!     job.render().unwrap(),
//!     vec![
//!         "//IEFBR14  JOB CLASS=A",
//!         "//STEP1    EXEC PGM=IEFBR14",
//!         "//DD1      DD DSN=MY.DATA,DISP=SHR",
//!         "//",
//!     ]
//! );
//! ```

use serde::{Deserialize, Serialize};

use crate::format::{
    CONTINUATION_PREFIX, JCL_PREFIX, Parameters, format_field_name, join_parameters,
    quote_programmer_name, split_at_72,
};
use crate::validate::{ValidationError, validate_name};

/// Closing delimiter of in-stream data when none is chosen.
pub const DEFAULT_DELIMITER: &str = "/*";

const PREFERRED_DELIMITER_CHARS: &str = "@$#";
const ALL_DELIMITER_CHARS: &str = "@$#ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Positional accounting information of the JOB statement.
///
/// Sub-fields are written in their fixed positional order, separated by
/// commas, with trailing empty positions dropped. With fewer than two
/// sub-fields set the value is written bare, otherwise it is parenthesised.
///
/// ```
/// use cics_provision_core::AccountingInformation;
///
/// let acct = AccountingInformation { pano: Some("AB12".into()), ..Default::default() };
/// assert_eq!(acct.render(), "AB12");
///
/// let acct = AccountingInformation {
///     pano: Some("AB12".into()),
///     time: Some("TIME".into()),
///     lines: Some("23".into()),
///     ..Default::default()
/// };
/// assert_eq!(acct.render(), "(AB12,,TIME,23)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountingInformation {
    #[serde(default, deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub pano: Option<String>,
    #[serde(default, deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(
        default,
        alias = "times",
        deserialize_with = "scalar",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub lines: Option<String>,
    #[serde(default, deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub cards: Option<String>,
    #[serde(default, deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub forms: Option<String>,
    #[serde(default, deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub copies: Option<String>,
    #[serde(default, deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub log: Option<String>,
    #[serde(default, deserialize_with = "scalar", skip_serializing_if = "Option::is_none")]
    pub linect: Option<String>,
}

/// Accepts either a string or a number, since YAML writes `lines: 23`.
fn scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(i64),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|value| match value {
        Scalar::Text(text) => text,
        Scalar::Number(number) => number.to_string(),
    }))
}

impl AccountingInformation {
    fn fields(&self) -> [Option<&str>; 9] {
        [
            self.pano.as_deref(),
            self.room.as_deref(),
            self.time.as_deref(),
            self.lines.as_deref(),
            self.cards.as_deref(),
            self.forms.as_deref(),
            self.copies.as_deref(),
            self.log.as_deref(),
            self.linect.as_deref(),
        ]
    }

    /// Renders the positional accounting value; empty when nothing is set.
    pub fn render(&self) -> String {
        let mut rendered = String::new();
        let mut set = 0;
        for value in self.fields() {
            if let Some(value) = value.filter(|v| !v.is_empty()) {
                set += 1;
                rendered.push_str(value);
            }
            rendered.push(',');
        }
        let rendered = rendered.trim_end_matches(',');
        if set < 2 {
            rendered.to_string()
        } else {
            format!("({rendered})")
        }
    }
}

/// `MSGLEVEL=(statements,messages)` job parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MsgLevel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<u8>,
}

impl MsgLevel {
    /// `1` for statements only, `(,1)` for messages only, `(1,0)` for both.
    pub fn render(&self) -> String {
        let statements = self.statements.map(|s| s.to_string()).unwrap_or_default();
        match self.messages {
            Some(messages) => format!("({statements},{messages})"),
            None => statements,
        }
    }
}

/// The JOB statement: name, positional parameters and ordered keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobCard {
    pub name: String,
    pub accounting: Option<AccountingInformation>,
    pub programmer_name: Option<String>,
    pub parameters: Parameters,
}

impl JobCard {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_accounting(mut self, accounting: AccountingInformation) -> Self {
        self.accounting = Some(accounting);
        self
    }

    pub fn with_programmer_name(mut self, name: impl Into<String>) -> Self {
        self.programmer_name = Some(name.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push(key, value);
        self
    }

    /// Adds `MSGLEVEL` at the current keyword position.
    pub fn with_msglevel(self, msglevel: &MsgLevel) -> Self {
        let rendered = msglevel.render();
        self.with_parameter("MSGLEVEL", rendered)
    }

    /// Accounting information and programmer name, or `None` when both are
    /// absent.
    fn positional(&self) -> Option<String> {
        let accounting = self
            .accounting
            .as_ref()
            .map(AccountingInformation::render)
            .unwrap_or_default();
        match self.programmer_name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => Some(format!("{accounting},{}", quote_programmer_name(name))),
            None if !accounting.is_empty() => Some(accounting),
            None => None,
        }
    }

    fn statement(&self) -> String {
        let mut line = format!("{JCL_PREFIX}{}JOB", format_field_name(&self.name));
        let keywords = join_parameters(&self.parameters);
        match self.positional() {
            Some(positional) => {
                line.push(' ');
                line.push_str(&positional);
                if !keywords.is_empty() {
                    line.push(',');
                    line.push_str(&keywords);
                }
            }
            None if !keywords.is_empty() => {
                line.push(' ');
                line.push_str(&keywords);
            }
            None => {}
        }
        line
    }
}

/// In-stream (`DD *`) data.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstreamData {
    pub lines: Vec<String>,
    /// Explicit delimiter. When `None` one is chosen on render if the
    /// content would otherwise end the stream early.
    pub delimiter: Option<String>,
    pub parameters: Parameters,
}

/// What a DD statement points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DdContent {
    Parameters(Parameters),
    Concatenation(Vec<Parameters>),
    Instream(InstreamData),
}

/// One named DD statement or concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DdEntry {
    pub name: String,
    pub content: DdContent,
}

impl DdEntry {
    pub fn parameters(name: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            name: name.into(),
            content: DdContent::Parameters(parameters),
        }
    }

    pub fn concatenation(name: impl Into<String>, members: Vec<Parameters>) -> Self {
        Self {
            name: name.into(),
            content: DdContent::Concatenation(members),
        }
    }

    pub fn instream(name: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            name: name.into(),
            content: DdContent::Instream(InstreamData {
                lines,
                ..InstreamData::default()
            }),
        }
    }
}

/// One EXEC statement and its DDs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecStep {
    /// Step name; empty leaves the name field blank.
    pub name: String,
    pub program: Option<String>,
    pub parm: Option<String>,
    /// Keywords written after `PGM` and `PARM`.
    pub parameters: Parameters,
    pub dds: Vec<DdEntry>,
}

impl ExecStep {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = Some(program.into());
        self
    }

    pub fn with_parm(mut self, parm: impl Into<String>) -> Self {
        self.parm = Some(parm.into());
        self
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push(key, value);
        self
    }

    pub fn with_dd(mut self, dd: DdEntry) -> Self {
        self.dds.push(dd);
        self
    }

    fn statement(&self) -> String {
        let mut parameters = Parameters::new();
        if let Some(program) = &self.program {
            parameters.push("PGM", program.to_uppercase());
        }
        if let Some(parm) = &self.parm {
            parameters.push("PARM", parm.as_str());
        }
        for (key, value) in self.parameters.iter() {
            parameters.push(key, value);
        }

        let line = format!("{JCL_PREFIX}{}EXEC", format_field_name(&self.name));
        if parameters.is_empty() {
            line
        } else {
            format!("{line} {}", join_parameters(&parameters))
        }
    }
}

/// A complete job: JOB statement plus ordered steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobDescription {
    pub job_card: JobCard,
    pub steps: Vec<ExecStep>,
}

impl JobDescription {
    pub fn new(job_card: JobCard) -> Self {
        Self {
            job_card,
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: ExecStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Renders the job stream as card images.
    ///
    /// Fails before producing any output when a name is invalid, or when
    /// in-stream content collides with every candidate delimiter.
    pub fn render(&self) -> Result<Vec<String>, ValidationError> {
        self.validate()?;
        let mut writer = JclWriter::default();
        writer.statement(&self.job_card.statement());
        for step in &self.steps {
            writer.statement(&step.statement());
            for dd in &step.dds {
                writer.dd(dd)?;
            }
        }
        writer.lines.push(JCL_PREFIX.to_string());
        Ok(writer.lines)
    }

    /// [`render`](Self::render) joined with newlines.
    pub fn render_text(&self) -> Result<String, ValidationError> {
        Ok(self.render()?.join("\n"))
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.job_card.name.is_empty() {
            return Err(ValidationError::InvalidName(String::new()));
        }
        validate_name(&self.job_card.name)?;
        for step in &self.steps {
            validate_name(&step.name)?;
            for dd in &step.dds {
                if dd.name.is_empty() {
                    return Err(ValidationError::InvalidName(String::new()));
                }
                validate_name(&dd.name)?;
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct JclWriter {
    lines: Vec<String>,
}

impl JclWriter {
    fn statement(&mut self, line: &str) {
        self.lines.extend(split_at_72(line));
    }

    fn dd(&mut self, dd: &DdEntry) -> Result<(), ValidationError> {
        match &dd.content {
            DdContent::Parameters(parameters) => {
                self.statement(&dd_statement(&dd.name, parameters));
            }
            DdContent::Concatenation(members) => {
                let mut members = members.iter();
                if let Some(first) = members.next() {
                    self.statement(&dd_statement(&dd.name, first));
                }
                for member in members {
                    self.statement(&format!(
                        "{CONTINUATION_PREFIX}DD {}",
                        join_parameters(member)
                    ));
                }
            }
            DdContent::Instream(data) => self.instream(&dd.name, data)?,
        }
        Ok(())
    }

    fn instream(&mut self, name: &str, data: &InstreamData) -> Result<(), ValidationError> {
        let delimiter = match &data.delimiter {
            Some(delimiter) => Some(delimiter.clone()),
            None if needs_custom_delimiter(&data.lines) => {
                Some(find_unused_delimiter(&data.lines)?)
            }
            None => None,
        };

        let mut parameters = Parameters::new();
        if let Some(delimiter) = &delimiter {
            parameters.push("DLM", delimiter.as_str());
        }
        for (key, value) in data.parameters.iter() {
            parameters.push(key, value);
        }

        let mut opening = format!("{JCL_PREFIX}{}DD *", format_field_name(name));
        if !parameters.is_empty() {
            opening.push(',');
            opening.push_str(&join_parameters(&parameters));
        }
        self.statement(&opening);
        self.lines.extend(data.lines.iter().cloned());
        self.lines
            .push(delimiter.unwrap_or_else(|| DEFAULT_DELIMITER.to_string()));
        Ok(())
    }
}

fn dd_statement(name: &str, parameters: &Parameters) -> String {
    let line = format!("{JCL_PREFIX}{}DD", format_field_name(name));
    if parameters.is_empty() {
        line
    } else {
        format!("{line} {}", join_parameters(parameters))
    }
}

/// True when any content line contains the default `/*` delimiter.
pub fn needs_custom_delimiter(lines: &[String]) -> bool {
    lines.iter().any(|line| line.contains(DEFAULT_DELIMITER))
}

/// Picks a two-character delimiter that no content line starts with.
///
/// Pairs of `@`, `$` and `#` are tried first, then pairs over the national
/// characters, letters and digits. Only the first two columns of each line
/// are compared, since that is where a delimiter ends in-stream data.
///
/// ```
/// use cics_provision_core::find_unused_delimiter;
///
/// let lines = vec!["@@ FIRST".to_string(), "/* SECOND".to_string()];
/// assert_eq!(find_unused_delimiter(&lines).unwrap(), "@$");
/// ```
pub fn find_unused_delimiter(lines: &[String]) -> Result<String, ValidationError> {
    let used: std::collections::HashSet<String> =
        lines.iter().map(|line| line.chars().take(2).collect()).collect();
    unused_pair(&used, PREFERRED_DELIMITER_CHARS)
        .or_else(|| unused_pair(&used, ALL_DELIMITER_CHARS))
        .ok_or(ValidationError::DelimiterExhausted)
}

fn unused_pair(used: &std::collections::HashSet<String>, alphabet: &str) -> Option<String> {
    alphabet.chars().find_map(|first| {
        alphabet.chars().find_map(|second| {
            let candidate: String = [first, second].iter().collect();
            (!used.contains(&candidate)).then_some(candidate)
        })
    })
}

/// Rejects in-stream content that would open a nested in-stream DD.
pub fn check_instream_content(lines: &[String]) -> Result<(), ValidationError> {
    for line in lines {
        let upper = line.to_uppercase();
        for marker in ["DD *", "DD DATA"] {
            if upper.contains(marker) {
                return Err(ValidationError::InvalidInstreamContent(marker.to_string()));
            }
        }
    }
    Ok(())
}
