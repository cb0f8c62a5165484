//! Document identity
//!
//! A transcript page is addressed by `(key, session, part)`. The archive lays
//! them out as `{key}/stenprot/{session:03}schuz/s{session:03}{part:03}.htm`,
//! and the same relative path, flattened, is the local filename.

use std::fmt;

/// One transcript page in the archive
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId {
    pub key: String,
    pub session: u32,
    pub part: u32,
}

impl DocumentId {
    pub fn new(key: &str, session: u32, part: u32) -> Self {
        Self {
            key: key.to_string(),
            session,
            part,
        }
    }

    /// Path relative to the archive root
    ///
    /// # Example
    ///
    /// ```
    /// use steno_harvest::DocumentId;
    ///
    /// let id = DocumentId::new("2021ps", 7, 12);
    /// assert_eq!(id.path(), "2021ps/stenprot/007schuz/s007012.htm");
    /// ```
    pub fn path(&self) -> String {
        format!(
            "{}/stenprot/{:03}schuz/s{:03}{:03}.htm",
            self.key, self.session, self.session, self.part
        )
    }

    /// Absolute URL below `base_url`
    pub fn url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.path())
    }

    /// Local store filename; path separators become underscores
    pub fn filename(&self) -> String {
        self.path().replace('/', "_")
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} s{:03} p{:03}", self.key, self.session, self.part)
    }
}
