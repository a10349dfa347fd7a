//! Shared helpers for squeezing utility output.

/// Removes blanks and newlines and uppercases, so labels match however the
/// utility spaced them.
pub fn squash(text: &str) -> String {
    text.chars()
        .filter(|c| *c != ' ' && *c != '\n' && *c != '\r')
        .collect::<String>()
        .to_uppercase()
}

/// Each line with blanks removed and uppercased.
pub fn squashed_lines(text: &str) -> Vec<String> {
    text.split('\n').map(squash).collect()
}

/// The hex value of the first `REASON:X'nn'` on a squashed line, with zeros
/// dropped the way the utilities' own messages are compared (`X'00A8'`
/// becomes `A8`).
pub fn reason_code(line: &str) -> Option<String> {
    let field = line.split(',').find(|part| part.contains("REASON:X"))?;
    let value = field.split('\'').nth(1)?;
    Some(value.replace('0', ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_squash() {
        assert_eq!(squash("Entry  cics.gcd\n not found"), "ENTRYCICS.GCDNOTFOUND");
    }

    #[test]
    fn test_reason_code() {
        assert_eq!(
            reason_code("DFHRM0001RC:16,REASON:X'00A8',MODULE"),
            Some("A8".to_string())
        );
        assert_eq!(reason_code("RC:16,REASON:X'0C'"), Some("C".to_string()));
        assert_eq!(reason_code("RC:16"), None);
        assert_eq!(reason_code("REASON:X"), None);
    }
}
