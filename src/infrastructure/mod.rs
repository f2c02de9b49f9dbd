pub mod artifact;

pub use artifact::{
    decode_artifact, download_file_name, encode_artifact, sanitize_file_name, ArtifactSink,
    DiskSink,
};
