//! `<< variable >>` data set name templates.
//!
//! A template such as `CICSTS61.CICS.<< lib_name >>` names every library in
//! a group at once; `REGIONS.CICSA.<< data_set_name >>` does the same for
//! per-region data sets. Explicit names always win over the template.

use std::sync::LazyLock;

use cics_provision_core::{MAX_DATA_SET_NAME_LENGTH, validate_data_set_name};
use regex::{Captures, Regex};

use crate::error::{ConfigError, Result};

/// Filled with the uppercased region data set key (`DFHGCD`, ...).
pub const DATA_SET_NAME_VARIABLE: &str = "data_set_name";

/// Filled with the uppercased library key (`SDFHLOAD`, ...).
pub const LIB_NAME_VARIABLE: &str = "lib_name";

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<<\s*([A-Za-z_][A-Za-z0-9_]*)\s*>>").expect("static regex must compile")
});

/// Replaces every `<< variable >>` in `template` with `value`.
///
/// ```
/// use cics_provision_config::render_template;
///
/// assert_eq!(
///     render_template("CICSTS61.CICS.<< lib_name >>", "lib_name", "SDFHLOAD").unwrap(),
///     "CICSTS61.CICS.SDFHLOAD"
/// );
/// assert!(render_template("A.<< other >>", "lib_name", "SDFHLOAD").is_err());
/// ```
pub fn render_template(template: &str, variable: &str, value: &str) -> Result<String> {
    if let Some(unknown) = PLACEHOLDER_RE
        .captures_iter(template)
        .filter_map(|caps| caps.get(1))
        .find(|name| name.as_str() != variable)
    {
        return Err(ConfigError::UnknownTemplateVariable {
            variable: unknown.as_str().to_string(),
            template: template.to_string(),
        });
    }
    Ok(PLACEHOLDER_RE
        .replace_all(template, |_: &Captures<'_>| value.to_string())
        .into_owned())
}

/// The explicit name, or the template filled with `key`.
///
/// The result is uppercased and checked as a data set name.
pub(crate) fn resolve_data_set(
    explicit: Option<&str>,
    template: Option<&str>,
    variable: &str,
    key: &str,
    group: &'static str,
) -> Result<String> {
    let name = match (explicit, template) {
        (Some(name), _) => name.to_string(),
        (None, Some(template)) => render_template(template, variable, &key.to_uppercase())?,
        (None, None) => {
            return Err(ConfigError::MissingDataSet {
                group,
                name: key.to_string(),
            });
        }
    };
    check_data_set(&name)?;
    Ok(name.to_uppercase())
}

/// Length first, so an over-long name reports as such.
pub(crate) fn check_data_set(name: &str) -> Result<()> {
    if name.chars().count() > MAX_DATA_SET_NAME_LENGTH {
        return Err(ConfigError::DataSetTooLong(name.to_string()));
    }
    validate_data_set_name(name).map_err(|_| ConfigError::InvalidArgument {
        value: name.to_string(),
        kind: "data_set_base",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_spacing_is_optional() {
        assert_eq!(
            render_template("REGIONS.<<data_set_name>>", DATA_SET_NAME_VARIABLE, "DFHGCD").unwrap(),
            "REGIONS.DFHGCD"
        );
    }

    #[test]
    fn test_template_without_placeholder_is_literal() {
        assert_eq!(
            render_template("FIXED.NAME", LIB_NAME_VARIABLE, "SDFHLOAD").unwrap(),
            "FIXED.NAME"
        );
    }

    #[test]
    fn test_explicit_name_wins() {
        let name = resolve_data_set(
            Some("my.gcd"),
            Some("T.<< data_set_name >>"),
            DATA_SET_NAME_VARIABLE,
            "dfhgcd",
            "data set",
        )
        .unwrap();
        assert_eq!(name, "MY.GCD");
    }

    #[test]
    fn test_template_uses_uppercased_key() {
        let name = resolve_data_set(
            None,
            Some("REGIONS.CICSA.<< data_set_name >>"),
            DATA_SET_NAME_VARIABLE,
            "dfhlcd",
            "data set",
        )
        .unwrap();
        assert_eq!(name, "REGIONS.CICSA.DFHLCD");
    }

    #[test]
    fn test_missing_template_and_override() {
        let err = resolve_data_set(None, None, LIB_NAME_VARIABLE, "sdfhload", "library").unwrap_err();
        assert_eq!(err.to_string(), "No template or library override found for sdfhload");
    }

    #[test]
    fn test_rendered_name_too_long() {
        let template = "AVERYLONG.QUALIFIED.NAME.THAT.GOES.ON.AND.<< lib_name >>";
        let err = resolve_data_set(None, Some(template), LIB_NAME_VARIABLE, "sceerun2", "library")
            .unwrap_err();
        assert!(matches!(err, ConfigError::DataSetTooLong(_)));
    }

    #[test]
    fn test_long_qualifier_rejected() {
        let err = check_data_set("LIB.TOOO.LONGQUALIFIER").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid argument \"LIB.TOOO.LONGQUALIFIER\" for type \"data_set_base\"."
        );
    }
}
