//! Input validation for names, qualifiers and rendered content.
//!
//! Every rendering operation in this crate returns [`ValidationError`] when
//! its input would produce JCL or a control statement that z/OS rejects.
//! The `Display` text of each variant is the message reported to the user.
//!
//! # Examples
//!
//! ```
//! use cics_provision_core::*;
//!
//! assert!(validate_data_set_name("CICSTS61.CICS.SDFHLOAD").is_ok());
//! assert!(matches!(
//!     validate_qualifier("TOOLONGQUALIFIER"),
//!     Err(ValidationError::QualifierTooLong(_))
//! ));
//! ```

use thiserror::Error;

/// Longest name a JOB, EXEC or DD statement may carry.
pub const MAX_NAME_LENGTH: usize = 8;

/// Longest data set name, dots included.
pub const MAX_DATA_SET_NAME_LENGTH: usize = 44;

/// Longest single data set name qualifier.
pub const MAX_QUALIFIER_LENGTH: usize = 8;

/// Rendering and input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Every candidate in-stream delimiter collides with the content.
    #[error("Cannot replace instream delimiter as all character instances have been used.")]
    DelimiterExhausted,
    /// A JOB, EXEC or DD name is empty, too long or has invalid characters.
    #[error("Invalid name: {0}. Names must be 1-8 characters")]
    InvalidName(String),
    /// An indexed SIT subkey does not match the placeholder width.
    #[error("Invalid key: {key}. Key must be the same length as the x's within {placeholder}.")]
    IndexedKeyLength { key: String, placeholder: String },
    /// An `SKRxxxx` subkey is not 3 or 4 characters long.
    #[error("Invalid key: {0}. Key must be a length of 3 or 4.")]
    SkrKeyLength(String),
    /// In-stream content contains a nested in-stream DD.
    #[error("Invalid content for an in-stream: {0}")]
    InvalidInstreamContent(String),
    /// DFHCSDUP command keyword is not recognised.
    #[error("Input command '{0}' is not supported by DFHCSDUP")]
    UnsupportedCommand(String),
    /// DFHCSDUP command is missing a required operand.
    #[error("Missing necessary command parameters: '{parameter}' for the command {command}.")]
    MissingCommandParameter { command: String, parameter: String },
    /// DFHCSDUP command options could not be read.
    #[error("Invalid options for the command {command}: {reason}")]
    InvalidCommandOptions { command: String, reason: String },
    /// Shutdown transaction id is not 1-4 characters.
    #[error("Value: {0}, is invalid. SDTRAN value must be  1-4 characters.")]
    InvalidSdtran(String),
    /// A data set qualifier is longer than 8 characters.
    #[error("Data set qualifier {0} is longer than 8 characters")]
    QualifierTooLong(String),
    /// Data set name is longer than 44 characters.
    #[error("Data set name {0} is longer than 44 characters")]
    DataSetNameTooLong(String),
    /// Data set name has an empty or malformed qualifier.
    #[error("Invalid data set name: {0}")]
    InvalidDataSetName(String),
    /// A job was identified by neither name nor id.
    #[error("At least one of job_id or job_name must be specified")]
    MissingJobIdentity,
}

/// Checks a JOB, EXEC or DD statement name.
///
/// An empty name is allowed: it renders a blank name field, which JCL
/// accepts on EXEC and concatenated DD statements.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.chars().count() > MAX_NAME_LENGTH || name.chars().any(|c| c.is_whitespace()) {
        return Err(ValidationError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Checks a single high-level qualifier.
pub fn validate_qualifier(qualifier: &str) -> Result<(), ValidationError> {
    if qualifier.chars().count() > MAX_QUALIFIER_LENGTH {
        return Err(ValidationError::QualifierTooLong(qualifier.to_string()));
    }
    if !is_valid_qualifier(qualifier) {
        return Err(ValidationError::InvalidDataSetName(qualifier.to_string()));
    }
    Ok(())
}

/// Checks a fully qualified data set name, with optional `(MEMBER)` suffix.
pub fn validate_data_set_name(name: &str) -> Result<(), ValidationError> {
    let base = match name.split_once('(') {
        Some((base, member)) => {
            let valid = member.strip_suffix(')').filter(|member| {
                member.chars().count() <= MAX_NAME_LENGTH && is_valid_qualifier(member)
            });
            if valid.is_none() {
                return Err(ValidationError::InvalidDataSetName(name.to_string()));
            }
            base
        }
        None => name,
    };

    if base.chars().count() > MAX_DATA_SET_NAME_LENGTH {
        return Err(ValidationError::DataSetNameTooLong(name.to_string()));
    }
    for qualifier in base.split('.') {
        if qualifier.chars().count() > MAX_QUALIFIER_LENGTH {
            return Err(ValidationError::QualifierTooLong(qualifier.to_string()));
        }
        if !is_valid_qualifier(qualifier) {
            return Err(ValidationError::InvalidDataSetName(name.to_string()));
        }
    }
    Ok(())
}

/// First character alphabetic or national, the rest alphanumeric, national
/// or hyphen.
fn is_valid_qualifier(qualifier: &str) -> bool {
    let mut chars = qualifier.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let national = |c: char| matches!(c, '@' | '#' | '$');
    (first.is_ascii_alphabetic() || national(first))
        && chars.all(|c| c.is_ascii_alphanumeric() || national(c) || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(validate_name("DFHRMUTL").is_ok());
        assert!(validate_name("").is_ok());
        assert!(validate_name("A").is_ok());
    }

    #[test]
    fn test_name_too_long() {
        assert_eq!(
            validate_name("TOOLONGNAME"),
            Err(ValidationError::InvalidName("TOOLONGNAME".to_string()))
        );
        assert!(validate_name("HAS SPACE").is_err());
    }

    #[test]
    fn test_valid_data_set_names() {
        assert!(validate_data_set_name("CICSTS61.CICS.SDFHLOAD").is_ok());
        assert!(validate_data_set_name("SYS1.PROCLIB(MEMBER)").is_ok());
        assert!(validate_data_set_name("@USER.#WORK.$TMP-1").is_ok());
    }

    #[test]
    fn test_data_set_name_too_long() {
        let name = "ABCDEFGH.ABCDEFGH.ABCDEFGH.ABCDEFGH.ABCDEFGH.A";
        assert!(matches!(
            validate_data_set_name(name),
            Err(ValidationError::DataSetNameTooLong(_))
        ));
    }

    #[test]
    fn test_data_set_name_bad_qualifiers() {
        assert!(matches!(
            validate_data_set_name("CICS.TOOLONGQUAL.X"),
            Err(ValidationError::QualifierTooLong(q)) if q == "TOOLONGQUAL"
        ));
        assert!(matches!(
            validate_data_set_name("CICS..X"),
            Err(ValidationError::InvalidDataSetName(_))
        ));
        assert!(matches!(
            validate_data_set_name("1CICS.X"),
            Err(ValidationError::InvalidDataSetName(_))
        ));
    }

    #[test]
    fn test_data_set_name_bad_member() {
        for name in ["CICS.JCL(A'B)", "CICS.JCL()", "CICS.JCL(START", "CICS.JCL(TOOLONGMEM)"] {
            assert_eq!(
                validate_data_set_name(name),
                Err(ValidationError::InvalidDataSetName(name.to_string())),
                "{name}"
            );
        }
    }

    #[test]
    fn test_qualifier() {
        assert!(validate_qualifier("CICSTS61").is_ok());
        assert_eq!(
            validate_qualifier("CICSTS610"),
            Err(ValidationError::QualifierTooLong("CICSTS610".to_string()))
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::DelimiterExhausted.to_string(),
            "Cannot replace instream delimiter as all character instances have been used."
        );
        assert_eq!(
            ValidationError::SkrKeyLength("PF123".to_string()).to_string(),
            "Invalid key: PF123. Key must be a length of 3 or 4."
        );
        assert_eq!(
            ValidationError::InvalidSdtran("TOOLONG".to_string()).to_string(),
            "Value: TOOLONG, is invalid. SDTRAN value must be  1-4 characters."
        );
        assert_eq!(
            ValidationError::MissingCommandParameter {
                command: "ADD".to_string(),
                parameter: "list_name".to_string(),
            }
            .to_string(),
            "Missing necessary command parameters: 'list_name' for the command ADD."
        );
    }
}
