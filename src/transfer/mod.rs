// Transfer module
//
// Download and upload runners, each with a local (filesystem) and a
// remote (polling wire protocol) variant. The concrete wire clients stay
// behind the `CartClient` and `IngestClient` traits.

pub mod downloader;
pub mod errors;
pub mod opener;
pub mod poll;
pub mod uploader;

/// Staging subdirectory used on both sides of a transfer: remote
/// downloads land under it and upload logical names are prefixed with it.
pub const DATA_SUBDIR: &str = "data";

pub use downloader::{
    CartClient, CartEntry, CartState, DownloaderRunner, LocalDownloaderRunner,
    RemoteDownloaderRunner,
};
pub use errors::{TransferError, TransferResult};
pub use opener::FileOpener;
pub use poll::PollPolicy;
pub use uploader::{
    Bundle, BundleFile, IngestClient, LocalUploaderRunner, MetadataRow, RemoteUploaderRunner,
    UploadOutcome, UploadStatus, UploaderRunner,
};
