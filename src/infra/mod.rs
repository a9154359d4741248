pub mod snapshot_file;
