//! Job status output from TSO `STATUS` and the ZOAU `jls` listing.

use serde::{Deserialize, Serialize};

use super::ParseError;

pub const EXECUTING: &str = "EXECUTING";

/// One job reported by `STATUS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobStatusEntry {
    pub job_name: String,
    pub job_id: String,
    pub status: String,
}

impl JobStatusEntry {
    pub fn is_executing(&self) -> bool {
        self.status == EXECUTING
    }
}

/// Every job named `job_name` in `STATUS <name>` output.
///
/// Lines echoing the command and "not found" notices are skipped.
///
/// ```
/// use cics_provision_utilities::parser::{JobStatusEntry, parse_job_status_lines};
///
/// let stdout = "IKJ56211I JOB JOBNAM(JOB12345) EXECUTING";
/// assert_eq!(
///     parse_job_status_lines(stdout, "JOBNAM"),
///     vec![JobStatusEntry {
///         job_name: "JOBNAM".to_string(),
///         job_id: "JOB12345".to_string(),
///         status: "EXECUTING".to_string(),
///     }]
/// );
/// ```
pub fn parse_job_status_lines(stdout: &str, job_name: &str) -> Vec<JobStatusEntry> {
    let not_found = format!("JOB {job_name} NOT FOUND");
    let echo = format!("STATUS {job_name}");
    stdout
        .lines()
        .filter(|line| line.contains(job_name))
        .filter(|line| {
            let upper = line.to_uppercase();
            !upper.contains(&not_found) && !upper.contains(&echo)
        })
        .filter_map(|line| {
            let (_, rest) = line.split_once('(')?;
            let (job_id, status) = rest.split_once(')')?;
            Some(JobStatusEntry {
                job_name: job_name.to_string(),
                job_id: job_id.to_string(),
                status: status.split(')').next().unwrap_or_default().trim().to_string(),
            })
        })
        .collect()
}

/// Status of exactly one job from `STATUS <name>(<id>)` output.
pub fn parse_job_status_for_id(
    stdout: &str,
    job_name: &str,
    job_id: &str,
) -> Result<String, ParseError> {
    let needle = format!("{job_name}({job_id})");
    let jobs: Vec<&str> = stdout.lines().filter(|line| line.contains(&needle)).collect();
    match jobs.as_slice() {
        [] => Err(ParseError::Ambiguous(format!(
            "No jobs found with name {job_name} and ID {job_id}"
        ))),
        [line] => Ok(line
            .split_once(')')
            .map(|(_, status)| status.split(')').next().unwrap_or_default().trim().to_string())
            .unwrap_or_default()),
        _ => Err(ParseError::Ambiguous(
            "Multiple jobs with name and ID found".to_string(),
        )),
    }
}

/// Name of the job with id `job_id` in a `jls` listing.
///
/// Listing lines start `owner name id`, followed by the job's status.
pub fn parse_job_name_for_id(stdout: &str, job_id: &str) -> Result<String, ParseError> {
    let names: Vec<&str> = stdout
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _owner = fields.next()?;
            let name = fields.next()?;
            fields.next()?.eq_ignore_ascii_case(job_id).then_some(name)
        })
        .collect();
    match names.as_slice() {
        [] => Err(ParseError::Ambiguous(format!("No jobs found with ID {job_id}"))),
        [name] => Ok(name.to_uppercase()),
        _ => Err(ParseError::Ambiguous(format!("Multiple jobs found with ID {job_id}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_matching_jobs() {
        assert!(parse_job_status_lines("IKJ56216I JOB JOBNAM NOT FOUND", "JOBNAM").is_empty());
        assert!(parse_job_status_lines("", "JOBNAM").is_empty());
    }

    #[test]
    fn test_skips_echoed_command() {
        let stdout = "STATUS JOBNAM\nIKJ56192I JOB JOBNAM(JOB00001) ON OUTPUT QUEUE\nIKJ56211I JOB JOBNAM(JOB00002) EXECUTING";
        let jobs = parse_job_status_lines(stdout, "JOBNAM");
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].status, "ON OUTPUT QUEUE");
        assert!(!jobs[0].is_executing());
        assert_eq!(jobs[1].job_id, "JOB00002");
        assert!(jobs[1].is_executing());
    }

    #[test]
    fn test_status_for_id() {
        let stdout = "IKJ56211I JOB JOBNAM(JOB12345) EXECUTING\nIKJ56192I JOB JOBNAM(JOB99999) ON OUTPUT QUEUE";
        assert_eq!(
            parse_job_status_for_id(stdout, "JOBNAM", "JOB12345").unwrap(),
            "EXECUTING"
        );
        assert_eq!(
            parse_job_status_for_id(stdout, "JOBNAM", "JOB99999").unwrap(),
            "ON OUTPUT QUEUE"
        );
    }

    #[test]
    fn test_status_for_id_requires_one_match() {
        assert_eq!(
            parse_job_status_for_id("", "JOBNAM", "JOB1"),
            Err(ParseError::Ambiguous(
                "No jobs found with name JOBNAM and ID JOB1".to_string()
            ))
        );
        let stdout = "JOB JOBNAM(JOB1) EXECUTING\nJOB JOBNAM(JOB1) EXECUTING";
        assert_eq!(
            parse_job_status_for_id(stdout, "JOBNAM", "JOB1"),
            Err(ParseError::Ambiguous(
                "Multiple jobs with name and ID found".to_string()
            ))
        );
    }

    #[test]
    fn test_job_name_for_id() {
        let stdout = "IBMUSER  CICSA    JOB00123 AC\nIBMUSER  BATCHJOB JOB00124 CC 0000\n";
        assert_eq!(parse_job_name_for_id(stdout, "JOB00123").unwrap(), "CICSA");
        assert_eq!(parse_job_name_for_id(stdout, "job00124").unwrap(), "BATCHJOB");
        assert_eq!(
            parse_job_name_for_id(stdout, "JOB99999"),
            Err(ParseError::Ambiguous("No jobs found with ID JOB99999".to_string()))
        );
    }
}
