use serde::Deserialize;

/// Commit message that authorizes a build.
pub const TRIGGER_MARKER: &str = "trigger: Build new image";

const SHORT_ID_LEN: usize = 7;

/// One entry of the commit listing response.
#[derive(Deserialize, Debug, Clone)]
pub struct CommitRecord {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CommitDetail {
    pub message: String,
    pub committer: Signature,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Signature {
    pub date: String,
}

/// Latest commit on the watched branch, as seen by one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub short_id: String,
    pub message: String,
    pub date: String,
}

impl Commit {
    pub fn is_trigger(&self) -> bool {
        self.message.trim() == TRIGGER_MARKER
    }
}

impl From<CommitRecord> for Commit {
    fn from(record: CommitRecord) -> Self {
        Commit {
            short_id: short_id(&record.sha).to_string(),
            message: record.commit.message,
            date: record.commit.committer.date,
        }
    }
}

/// Abbreviated hash, as `git rev-parse --short` prints it.
pub fn short_id(sha: &str) -> &str {
    match sha.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &sha[..end],
        None => sha,
    }
}
