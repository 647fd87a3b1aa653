//! Build selection

use crate::error::{Error, Result};
use crate::filter::FilterSet;
use crate::repo::RepoId;
use crate::types::Build;

/// Return the first build accepted by `filters`.
///
/// Builds are scanned in the order given (the server lists most recent
/// first); nothing is sorted or deduplicated here.
pub fn find_build<'b>(builds: &'b [Build], filters: &FilterSet) -> Option<&'b Build> {
    let found = builds.iter().find(|b| {
        let accepted = filters.matches(b);
        if !accepted {
            tracing::trace!(
                number = b.number,
                status = %b.status,
                event = %b.event,
                "build rejected by filters"
            );
        }
        accepted
    });

    if let Some(b) = found {
        tracing::debug!(number = b.number, commit = %b.commit, "matched build");
    }
    found
}

/// Like [`find_build`] but treats "no match" as an error for `repo`.
pub fn select<'b>(repo: &RepoId, builds: &'b [Build], filters: &FilterSet) -> Result<&'b Build> {
    find_build(builds, filters).ok_or_else(|| Error::NotFound {
        repo: repo.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn build(number: u64, status: &str, branch: &str) -> Build {
        Build {
            number,
            status: status.to_string(),
            event: "push".to_string(),
            branch: branch.to_string(),
            commit: format!("c{}", number),
            ..Default::default()
        }
    }

    #[test]
    fn test_returns_first_match_in_order() {
        let builds = vec![
            build(10, "running", "main"),
            build(9, "success", "main"),
            build(8, "success", "main"),
        ];
        let found = find_build(&builds, &FilterSet::default()).unwrap();
        assert_eq!(found.number, 9);
    }

    #[test]
    fn test_does_not_reorder() {
        // Oldest first on purpose: the finder must not sort
        let builds = vec![build(1, "success", "main"), build(2, "success", "main")];
        let found = find_build(&builds, &FilterSet::default()).unwrap();
        assert_eq!(found.number, 1);
    }

    #[test]
    fn test_branch_filter_skips_other_branches() {
        let builds = vec![
            build(3, "success", "feature"),
            build(2, "success", "main"),
            build(1, "success", "main"),
        ];
        let filters = FilterSet {
            branch: Some("main".into()),
            ..Default::default()
        };
        assert_eq!(find_build(&builds, &filters).unwrap().number, 2);
    }

    #[test]
    fn test_none_when_nothing_matches() {
        let builds = vec![build(1, "failure", "main")];
        assert!(find_build(&builds, &FilterSet::default()).is_none());
        assert!(find_build(&[], &FilterSet::default()).is_none());
    }

    #[test]
    fn test_select_reports_not_found() {
        let repo = RepoId::parse("octocat/hello-world").unwrap();
        let builds = vec![build(1, "failure", "main")];
        let err = select(&repo, &builds, &FilterSet::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.message(), "octocat/hello-world");
    }
}
