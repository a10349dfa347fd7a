//! ICETOOL `COUNT` output.

use super::util::{reason_code, squashed_lines};

/// SYSIN for counting the records of the data set on DD1.
pub const ICETOOL_COUNT: &str = "COUNT FROM(DD1)";

/// Record count from the `RECORD COUNT:` line, or -1 when it is missing.
///
/// ```
/// use cics_provision_utilities::parser::parse_record_count;
///
/// assert_eq!(parse_record_count("ICE628I 0 RECORD COUNT:  000000000000052"), 52);
/// assert_eq!(parse_record_count("ICE600I 0 DFSORT ICETOOL UTILITY RUN STARTED"), -1);
/// ```
pub fn parse_record_count(stdout: &str) -> i64 {
    squashed_lines(stdout)
        .iter()
        .find(|line| line.contains("RECORDCOUNT:"))
        .and_then(|line| line.split(':').nth(1))
        .and_then(|count| count.trim().parse().ok())
        .unwrap_or(-1)
}

/// The squashed line explaining a failure, when it carries a reason code.
pub fn icetool_reason_line(stdout: &str) -> Option<String> {
    let line = squashed_lines(stdout)
        .into_iter()
        .find(|line| line.contains("REASON:X"))?;
    reason_code(&line).filter(|code| !code.is_empty())?;
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_records() {
        assert_eq!(parse_record_count("ICE628I 0 RECORD COUNT: 000000000000000\n"), 0);
    }

    #[test]
    fn test_unparsable_count() {
        assert_eq!(parse_record_count("RECORD COUNT: lots"), -1);
    }

    #[test]
    fn test_reason_line() {
        let stdout = "ICE000I\nIEC161I 056-084, RC: 8, REASON: X'0038', ICETOOL";
        assert_eq!(
            icetool_reason_line(stdout),
            Some("IEC161I056-084,RC:8,REASON:X'0038',ICETOOL".to_string())
        );
        assert_eq!(icetool_reason_line("ICE602I OPERATION RETURN CODE: 12"), None);
    }
}
