//! DFHCSDUP command rendering.
//!
//! [`CsdCommand`] is a closed set of the commands DFHCSDUP accepts, each
//! variant holding only the operands that command takes. Commands render
//! to DFHCSDUP's keyword syntax and are wrapped to 71 columns at blanks
//! outside parentheses.
//!
//! Scripts can be read from YAML or JSON as a list of single-key maps, the
//! key naming the command and the value holding its options:
//!
//! ```
//! use cics_provision_core::*;
//!
//! let script: CsdScript = serde_json::from_str(
//!     r#"[{"define": {"resource_type": "program", "resource_name": "prog1",
//!                     "group_name": "grp1", "attr_list": {"language": "cobol"}}},
//!         {"add": {"group_name": "grp1", "list_name": "list1"}}]"#,
//! )
//! .unwrap();
//! assert_eq!(
//!     script.render(),
//!     "DEFINE PROGRAM(PROG1) GROUP(GRP1) LANGUAGE(COBOL)\nADD GROUP(GRP1) LIST(LIST1)"
//! );
//! ```

use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::sit::OrderedScalars;
use crate::validate::ValidationError;

/// Longest DFHCSDUP control statement line.
pub const CSDUP_LINE_LIMIT: usize = 71;

/// Keywords DFHCSDUP accepts, in the form users write them.
pub const SUPPORTED_COMMANDS: &[&str] = &[
    "ADD",
    "ALTER",
    "APPEND",
    "COPY",
    "DEFINE",
    "DELETE",
    "EXTRACT",
    "INITIALIZE",
    "LIST",
    "PROCESS",
    "REMOVE",
    "SCAN",
    "SERVICE",
    "UPGRADE",
    "USERDEFINE",
    "VERIFY",
];

/// A resource type and name, rendered `TYPE(NAME)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub resource_type: String,
    pub name: String,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    fn render(&self) -> String {
        format!(
            "{}({})",
            self.resource_type.to_uppercase(),
            self.name.to_uppercase()
        )
    }
}

/// A group or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Group(String),
    List(String),
}

impl Scope {
    fn render(&self) -> String {
        match self {
            Self::Group(group) => format!("GROUP({})", group.to_uppercase()),
            Self::List(list) => format!("LIST({})", list.to_uppercase()),
        }
    }
}

/// What `LIST` reports on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListTarget {
    All,
    Scope(Scope),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListDetail {
    Objects,
    Sigsumm,
}

/// Where `ADD` places a group within a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListPosition {
    After(String),
    Before(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeleteTarget {
    All,
    Resource(Resource),
}

/// Handling of definitions that already exist in the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyMode {
    Merge,
    Replace,
}

/// `APPEND`, `COPY` and `SERVICE` operands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub from_csd: Option<String>,
    pub scope: Option<Scope>,
    pub to: Option<String>,
    pub resource: Option<Resource>,
    pub mode: Option<CopyMode>,
    pub level: Option<u16>,
}

/// Resource definition commands: `DEFINE`, `USERDEFINE` and `ALTER`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    pub resource: Resource,
    pub group: String,
    pub attributes: Vec<(String, String)>,
}

/// One DFHCSDUP command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CsdCommand {
    Initialize,
    Verify,
    Upgrade {
        replace: bool,
        using: Option<String>,
    },
    Process {
        apar: String,
    },
    Scan {
        resource: Resource,
        alias: Option<String>,
    },
    List {
        target: ListTarget,
        detail: Option<ListDetail>,
    },
    Add {
        group: String,
        list: String,
        position: Option<ListPosition>,
    },
    Remove {
        group: String,
        list: String,
    },
    Define(ResourceDefinition),
    Userdefine(ResourceDefinition),
    Alter(ResourceDefinition),
    Delete {
        target: DeleteTarget,
        group: String,
        remove: bool,
    },
    Append(Transfer),
    Copy(Transfer),
    Service(Transfer),
    Extract {
        scope: Scope,
        user_program: Option<String>,
        objects: bool,
    },
}

impl CsdCommand {
    /// Command keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Initialize => "INITIALIZE",
            Self::Verify => "VERIFY",
            Self::Upgrade { .. } => "UPGRADE",
            Self::Process { .. } => "PROCESS",
            Self::Scan { .. } => "SCAN",
            Self::List { .. } => "LIST",
            Self::Add { .. } => "ADD",
            Self::Remove { .. } => "REMOVE",
            Self::Define(_) => "DEFINE",
            Self::Userdefine(_) => "USERDEFINE",
            Self::Alter(_) => "ALTER",
            Self::Delete { .. } => "DELETE",
            Self::Append(_) => "APPEND",
            Self::Copy(_) => "COPY",
            Self::Service(_) => "SERVICE",
            Self::Extract { .. } => "EXTRACT",
        }
    }

    /// Renders the command on one line, unwrapped.
    pub fn render(&self) -> String {
        let mut tokens = vec![self.keyword().to_string()];
        match self {
            Self::Initialize | Self::Verify => {}
            Self::Upgrade { replace, using } => {
                if *replace {
                    tokens.push("REPLACE".to_string());
                }
                if let Some(using) = using {
                    tokens.push(format!("USING({})", using.to_uppercase()));
                }
            }
            Self::Process { apar } => tokens.push(format!("APAR({})", apar.to_uppercase())),
            Self::Scan { resource, alias } => {
                tokens.push(resource.render());
                if let Some(alias) = alias {
                    tokens.push(format!("ALIAS({})", alias.to_uppercase()));
                }
            }
            Self::List { target, detail } => {
                tokens.push(match target {
                    ListTarget::All => "ALL".to_string(),
                    ListTarget::Scope(scope) => scope.render(),
                });
                match detail {
                    Some(ListDetail::Objects) => tokens.push("OBJECTS".to_string()),
                    Some(ListDetail::Sigsumm) => tokens.push("SIGSUMM".to_string()),
                    None => {}
                }
            }
            Self::Add {
                group,
                list,
                position,
            } => {
                tokens.push(Scope::Group(group.clone()).render());
                tokens.push(Scope::List(list.clone()).render());
                match position {
                    Some(ListPosition::After(group)) => {
                        tokens.push(format!("AFTER({})", group.to_uppercase()))
                    }
                    Some(ListPosition::Before(group)) => {
                        tokens.push(format!("BEFORE({})", group.to_uppercase()))
                    }
                    None => {}
                }
            }
            Self::Remove { group, list } => {
                tokens.push(Scope::Group(group.clone()).render());
                tokens.push(Scope::List(list.clone()).render());
            }
            Self::Define(definition) | Self::Userdefine(definition) | Self::Alter(definition) => {
                tokens.push(definition.resource.render());
                tokens.push(Scope::Group(definition.group.clone()).render());
                for (key, value) in &definition.attributes {
                    tokens.push(format!("{}({})", key.to_uppercase(), value.to_uppercase()));
                }
            }
            Self::Delete {
                target,
                group,
                remove,
            } => {
                tokens.push(match target {
                    DeleteTarget::All => "ALL".to_string(),
                    DeleteTarget::Resource(resource) => resource.render(),
                });
                tokens.push(Scope::Group(group.clone()).render());
                if *remove {
                    tokens.push("REMOVE".to_string());
                }
            }
            Self::Append(transfer) | Self::Copy(transfer) => {
                transfer.render_into(&mut tokens, None);
            }
            Self::Service(transfer) => transfer.render_into(&mut tokens, Some("DFHCSD")),
            Self::Extract {
                scope,
                user_program,
                objects,
            } => {
                tokens.push(scope.render());
                if let Some(program) = user_program {
                    tokens.push(format!("USERPROGRAM({})", program.to_uppercase()));
                }
                if *objects {
                    tokens.push("OBJECTS".to_string());
                }
            }
        }
        tokens.join(" ")
    }

    /// Builds a command from its keyword and untyped options.
    pub fn from_options(key: &str, options: CsdOptions) -> Result<Self, ValidationError> {
        let keyword = key.to_uppercase();
        let o = options;
        let command = match keyword.as_str() {
            "INITIALIZE" => Self::Initialize,
            "VERIFY" => Self::Verify,
            "UPGRADE" => Self::Upgrade {
                replace: o.replace,
                using: o.using,
            },
            "PROCESS" => Self::Process {
                apar: require(o.apar, "APAR", &keyword)?,
            },
            "SCAN" => Self::Scan {
                resource: Resource::new(
                    require(o.resource_type, "RESOURCE_TYPE", &keyword)?,
                    require(o.resource_name, "RESOURCE_NAME", &keyword)?,
                ),
                alias: o.alias,
            },
            "LIST" => Self::List {
                target: if o.all {
                    ListTarget::All
                } else {
                    ListTarget::Scope(require(o.scope(), "GROUP_NAME", &keyword)?)
                },
                detail: if o.objects {
                    Some(ListDetail::Objects)
                } else if o.sigsumm {
                    Some(ListDetail::Sigsumm)
                } else {
                    None
                },
            },
            "ADD" => {
                let group = require(o.group_name, "GROUP_NAME", &keyword)?;
                let list = require(o.list_name, "LIST_NAME", &keyword)?;
                let position = match (o.after_grp, o.before_grp) {
                    (Some(after), _) => Some(ListPosition::After(after)),
                    (None, Some(before)) => Some(ListPosition::Before(before)),
                    (None, None) => None,
                };
                Self::Add {
                    group,
                    list,
                    position,
                }
            }
            "REMOVE" => Self::Remove {
                group: require(o.group_name, "GROUP_NAME", &keyword)?,
                list: require(o.list_name, "LIST_NAME", &keyword)?,
            },
            "DEFINE" | "USERDEFINE" | "ALTER" => {
                let group = require(o.group_name, "GROUP_NAME", &keyword)?;
                let definition = ResourceDefinition {
                    resource: Resource::new(
                        require(o.resource_type, "RESOURCE_TYPE", &keyword)?,
                        require(o.resource_name, "RESOURCE_NAME", &keyword)?,
                    ),
                    group,
                    attributes: o.attr_list.map(OrderedScalars::into_pairs).unwrap_or_default(),
                };
                match keyword.as_str() {
                    "DEFINE" => Self::Define(definition),
                    "USERDEFINE" => Self::Userdefine(definition),
                    _ => Self::Alter(definition),
                }
            }
            "DELETE" => {
                let group = require(o.group_name, "GROUP_NAME", &keyword)?;
                let target = if o.all {
                    DeleteTarget::All
                } else {
                    DeleteTarget::Resource(Resource::new(
                        require(o.resource_type, "RESOURCE_TYPE", &keyword)?,
                        require(o.resource_name, "RESOURCE_NAME", &keyword)?,
                    ))
                };
                Self::Delete {
                    target,
                    group,
                    remove: o.remove,
                }
            }
            "APPEND" | "COPY" | "SERVICE" => {
                let scope = o.scope();
                let resource = match (o.resource_type, o.resource_name) {
                    (Some(resource_type), Some(name)) => Some(Resource::new(resource_type, name)),
                    _ => None,
                };
                let mode = if o.merge {
                    Some(CopyMode::Merge)
                } else if o.replace {
                    Some(CopyMode::Replace)
                } else {
                    None
                };
                let transfer = Transfer {
                    from_csd: o.fromcsd,
                    scope,
                    to: o.to,
                    resource,
                    mode,
                    level: o.level,
                };
                match keyword.as_str() {
                    "APPEND" => Self::Append(transfer),
                    "COPY" => Self::Copy(transfer),
                    _ => Self::Service(transfer),
                }
            }
            "EXTRACT" => Self::Extract {
                scope: require(o.scope(), "GROUP_NAME", &keyword)?,
                user_program: o.user_program,
                objects: o.objects,
            },
            _ => return Err(ValidationError::UnsupportedCommand(key.to_string())),
        };
        Ok(command)
    }
}

impl Transfer {
    fn render_into(&self, tokens: &mut Vec<String>, default_from: Option<&str>) {
        if let Some(from) = self.from_csd.as_deref().or(default_from) {
            tokens.push(format!("FROMCSD({})", from.to_uppercase()));
        }
        if let Some(scope) = &self.scope {
            tokens.push(scope.render());
        }
        if let Some(to) = &self.to {
            tokens.push(format!("TO({})", to.to_uppercase()));
        }
        if let Some(resource) = &self.resource {
            tokens.push(resource.render());
        }
        match self.mode {
            Some(CopyMode::Merge) => tokens.push("MERGE".to_string()),
            Some(CopyMode::Replace) => tokens.push("REPLACE".to_string()),
            None => {}
        }
        if let Some(level) = self.level {
            tokens.push(format!("LEVEL({level:03})"));
        }
    }
}

fn require<T>(value: Option<T>, parameter: &str, command: &str) -> Result<T, ValidationError> {
    value.ok_or_else(|| ValidationError::MissingCommandParameter {
        command: command.to_string(),
        parameter: parameter.to_string(),
    })
}

/// Untyped command options, as written in a script.
#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsdOptions {
    group_name: Option<String>,
    list_name: Option<String>,
    resource_type: Option<String>,
    resource_name: Option<String>,
    attr_list: Option<OrderedScalars>,
    after_grp: Option<String>,
    before_grp: Option<String>,
    remove: bool,
    all: bool,
    fromcsd: Option<String>,
    to: Option<String>,
    level: Option<u16>,
    merge: bool,
    replace: bool,
    user_program: Option<String>,
    objects: bool,
    sigsumm: bool,
    apar: Option<String>,
    alias: Option<String>,
    using: Option<String>,
}

impl CsdOptions {
    fn scope(&self) -> Option<Scope> {
        match (&self.group_name, &self.list_name) {
            (Some(group), _) => Some(Scope::Group(group.clone())),
            (None, Some(list)) => Some(Scope::List(list.clone())),
            (None, None) => None,
        }
    }
}

/// An ordered list of DFHCSDUP commands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CsdScript(pub Vec<CsdCommand>);

impl CsdScript {
    /// SYSIN text: one wrapped command per line.
    pub fn render(&self) -> String {
        render_commands(&self.0)
    }
}

impl<'de> Deserialize<'de> for CsdScript {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(ScriptVisitor)
    }
}

struct ScriptVisitor;

impl<'de> Visitor<'de> for ScriptVisitor {
    type Value = CsdScript;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of single-key DFHCSDUP command maps")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut commands = Vec::new();
        while let Some(ScriptEntry(command)) = seq.next_element()? {
            commands.push(command);
        }
        Ok(CsdScript(commands))
    }
}

struct ScriptEntry(CsdCommand);

impl<'de> Deserialize<'de> for ScriptEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntryVisitor;

        impl<'de> Visitor<'de> for EntryVisitor {
            type Value = ScriptEntry;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map with one DFHCSDUP command key")
            }

            fn visit_str<E: de::Error>(self, key: &str) -> Result<Self::Value, E> {
                CsdCommand::from_options(key, CsdOptions::default())
                    .map(ScriptEntry)
                    .map_err(E::custom)
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let Some(key) = access.next_key::<String>()? else {
                    return Err(de::Error::custom("empty DFHCSDUP command"));
                };
                if !SUPPORTED_COMMANDS.contains(&key.to_uppercase().as_str()) {
                    return Err(de::Error::custom(ValidationError::UnsupportedCommand(key)));
                }
                let options = access.next_value::<Option<CsdOptions>>()?.unwrap_or_default();
                if access.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom(format!(
                        "more than one command in a single entry starting with {key}"
                    )));
                }
                CsdCommand::from_options(&key, options)
                    .map(ScriptEntry)
                    .map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(EntryVisitor)
    }
}

/// Renders commands one per line, each wrapped with [`split_command`].
pub fn render_commands(commands: &[CsdCommand]) -> String {
    commands
        .iter()
        .map(|command| split_command(&command.render()).join("\n"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Wraps a command at blanks outside parentheses so no line exceeds 71
/// columns. A single operand longer than the limit stays on its own line.
///
/// ```
/// use cics_provision_core::split_command;
///
/// assert_eq!(split_command("LIST   ALL  OBJECTS"), vec!["LIST ALL OBJECTS"]);
/// ```
pub fn split_command(command: &str) -> Vec<String> {
    let normalized = command.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut lines = Vec::new();
    let mut current = String::new();
    for token in top_level_tokens(&normalized) {
        if current.is_empty() {
            current = token.to_string();
        } else if current.chars().count() + 1 + token.chars().count() > CSDUP_LINE_LIMIT {
            lines.push(std::mem::take(&mut current));
            current = token.to_string();
        } else {
            current.push(' ');
            current.push_str(token);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Splits on blanks at parenthesis depth zero.
fn top_level_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (idx, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ' ' if depth == 0 => {
                if idx > start {
                    tokens.push(&text[start..idx]);
                }
                start = idx + 1;
            }
            _ => {}
        }
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

/// DFHCSDUP CSD access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AccessMode {
    #[default]
    #[serde(rename = "rw")]
    ReadWrite,
    #[serde(rename = "ro")]
    ReadOnly,
}

/// DFHCSDUP `PARM` options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsdupOptions {
    pub access_mode: AccessMode,
    pub page_size: u32,
    pub compat: bool,
    pub uppercase: bool,
}

impl Default for CsdupOptions {
    fn default() -> Self {
        Self {
            access_mode: AccessMode::ReadWrite,
            page_size: 60,
            compat: false,
            uppercase: false,
        }
    }
}

impl CsdupOptions {
    /// ```
    /// use cics_provision_core::CsdupOptions;
    ///
    /// assert_eq!(CsdupOptions::default().parm(), "CSD(READWRITE),PAGESIZE(60),NOCOMPAT");
    /// ```
    pub fn parm(&self) -> String {
        let mut parts = vec![
            match self.access_mode {
                AccessMode::ReadWrite => "CSD(READWRITE)".to_string(),
                AccessMode::ReadOnly => "CSD(READONLY)".to_string(),
            },
            format!("PAGESIZE({})", self.page_size),
            if self.compat { "COMPAT" } else { "NOCOMPAT" }.to_string(),
        ];
        if self.uppercase {
            parts.push("UPPERCASE".to_string());
        }
        parts.join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<CsdScript, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(CsdCommand::Initialize.render(), "INITIALIZE");
        assert_eq!(CsdCommand::Verify.render(), "VERIFY");
        assert_eq!(
            CsdCommand::Upgrade {
                replace: true,
                using: Some("dfhcure".to_string())
            }
            .render(),
            "UPGRADE REPLACE USING(DFHCURE)"
        );
        assert_eq!(
            CsdCommand::Process {
                apar: "pi12345".to_string()
            }
            .render(),
            "PROCESS APAR(PI12345)"
        );
    }

    #[test]
    fn test_parse_script_keeps_order_and_renders() {
        let script = parse(
            r#"[
                "initialize",
                {"scan": {"resource_type": "program", "resource_name": "dfhpep", "alias": "mypep"}},
                {"list": {"all": true, "objects": true}},
                {"list": {"list_name": "dfhlist"}},
                {"add": {"group_name": "g1", "list_name": "l1", "before_grp": "g0"}},
                {"remove": {"group_name": "g1", "list_name": "l1"}},
                {"delete": {"group_name": "g1", "all": true, "remove": true}},
                {"extract": {"group_name": "g1", "user_program": "dfh0cbdc", "objects": true}}
            ]"#,
        )
        .unwrap();
        assert_eq!(
            script.render(),
            [
                "INITIALIZE",
                "SCAN PROGRAM(DFHPEP) ALIAS(MYPEP)",
                "LIST ALL OBJECTS",
                "LIST LIST(DFHLIST)",
                "ADD GROUP(G1) LIST(L1) BEFORE(G0)",
                "REMOVE GROUP(G1) LIST(L1)",
                "DELETE ALL GROUP(G1) REMOVE",
                "EXTRACT GROUP(G1) USERPROGRAM(DFH0CBDC) OBJECTS",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_define_attributes_keep_order() {
        let script = parse(
            r#"[{"define": {"resource_type": "transaction", "resource_name": "abcd",
                 "group_name": "mygrp",
                 "attr_list": {"program": "prog1", "taskdataloc": "any", "dynamic": false}}}]"#,
        )
        .unwrap();
        assert_eq!(
            script.render(),
            "DEFINE TRANSACTION(ABCD) GROUP(MYGRP) PROGRAM(PROG1) TASKDATALOC(ANY) DYNAMIC(NO)"
        );
    }

    #[test]
    fn test_transfer_commands() {
        let script = parse(
            r#"[{"copy": {"group_name": "g1", "to": "g2", "replace": true}},
                {"append": {"list_name": "l1", "to": "l2", "fromcsd": "seccsd"}},
                {"service": {"level": 1}}]"#,
        )
        .unwrap();
        assert_eq!(
            script.render(),
            [
                "COPY GROUP(G1) TO(G2) REPLACE",
                "APPEND FROMCSD(SECCSD) LIST(L1) TO(L2)",
                "SERVICE FROMCSD(DFHCSD) LEVEL(001)",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_unsupported_command() {
        let err = parse(r#"[{"frobnicate": {}}]"#).unwrap_err();
        assert!(
            err.to_string()
                .contains("Input command 'frobnicate' is not supported by DFHCSDUP")
        );
        assert_eq!(
            CsdCommand::from_options("frobnicate", CsdOptions::default()),
            Err(ValidationError::UnsupportedCommand("frobnicate".to_string()))
        );
    }

    #[test]
    fn test_missing_required_parameters() {
        let err = parse(r#"[{"add": {"group_name": "g1"}}]"#).unwrap_err();
        assert!(
            err.to_string()
                .contains("Missing necessary command parameters: 'LIST_NAME' for the command ADD.")
        );
        let err = parse(r#"[{"define": {"group_name": "g1", "resource_name": "x"}}]"#).unwrap_err();
        assert!(err.to_string().contains("'RESOURCE_TYPE'"));
        let err = parse(r#"[{"process": null}]"#).unwrap_err();
        assert!(err.to_string().contains("'APAR' for the command PROCESS"));
    }

    #[test]
    fn test_unknown_option_rejected() {
        assert!(parse(r#"[{"list": {"all": true, "bogus": 1}}]"#).is_err());
    }

    #[test]
    fn test_long_command_wraps_outside_parentheses() {
        let command = CsdCommand::Define(ResourceDefinition {
            resource: Resource::new("PROGRAM", "PROGRAM1"),
            group: "LONGGROUP".to_string(),
            attributes: vec![
                ("DESCRIPTION".to_string(), "A PROGRAM WITH A LONG DESCRIPTION".to_string()),
                ("LANGUAGE".to_string(), "COBOL".to_string()),
                ("DATALOCATION".to_string(), "ANY".to_string()),
                ("EXECKEY".to_string(), "CICS".to_string()),
            ],
        });
        let lines = split_command(&command.render());
        assert_eq!(
            lines,
            vec![
                "DEFINE PROGRAM(PROGRAM1) GROUP(LONGGROUP)",
                "DESCRIPTION(A PROGRAM WITH A LONG DESCRIPTION) LANGUAGE(COBOL)",
                "DATALOCATION(ANY) EXECKEY(CICS)",
            ]
        );
        assert!(lines.iter().all(|l| l.len() <= CSDUP_LINE_LIMIT));
    }

    #[test]
    fn test_csdup_parm() {
        let options = CsdupOptions {
            access_mode: AccessMode::ReadOnly,
            page_size: 100,
            compat: true,
            uppercase: true,
        };
        assert_eq!(options.parm(), "CSD(READONLY),PAGESIZE(100),COMPAT,UPPERCASE");
        let parsed: CsdupOptions = serde_json::from_str(r#"{"access_mode": "ro"}"#).unwrap();
        assert_eq!(parsed.parm(), "CSD(READONLY),PAGESIZE(60),NOCOMPAT");
    }
}
