use std::string::FromUtf8Error;

use snafu::Snafu;

use crate::tree::TreeError;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("Failed to read the store file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write the store file: {}", file_path))]
    WriteError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to compress the tree"))]
    CompressError { source: std::io::Error },
    #[snafu(display("Failed to decompress the store file: {}", file_path))]
    DecompressError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Store file is not valid UTF-8: {}", file_path))]
    DecodeError {
        file_path: String,
        source: FromUtf8Error,
    },
    #[snafu(display("Stored tree is malformed"))]
    MalformedError { source: TreeError },
}
