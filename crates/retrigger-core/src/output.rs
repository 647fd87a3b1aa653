//! Output formatting for triggered builds

use crate::error::Result;
use crate::types::{Build, Triggered};

/// Line written to stderr for every triggered build
pub fn follow_message(triggered: &Triggered) -> String {
    format!("Follow new build status at: {}", triggered.url)
}

/// Pretty JSON of a build record, two-space indented
pub fn build_json(build: &Build) -> Result<String> {
    Ok(serde_json::to_string_pretty(build)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::RepoId;

    #[test]
    fn test_follow_message() {
        let t = Triggered {
            repo: RepoId::parse("a/b").unwrap(),
            matched: 1,
            build: Build::default(),
            url: "https://ci/a/b/2".into(),
        };
        assert_eq!(follow_message(&t), "Follow new build status at: https://ci/a/b/2");
    }

    #[test]
    fn test_build_json_is_indented() {
        let build = Build {
            number: 12,
            status: "pending".into(),
            ..Default::default()
        };
        let json = build_json(&build).unwrap();
        assert!(json.contains("\n  \"number\": 12"));
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["status"], "pending");
    }
}
