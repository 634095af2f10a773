use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::types::ViewId;

#[derive(Debug, Error)]
pub(crate) enum OpenFileError {
    #[error("could not read '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' is not a file", .0.display())]
    NotAFile(PathBuf),

    #[error("Unable to list \"{}\": {source}", dir.display())]
    List {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no view {0} in this window")]
    NoSuchView(ViewId),

    #[error("view {0} is read-only")]
    ReadOnly(ViewId),
}
