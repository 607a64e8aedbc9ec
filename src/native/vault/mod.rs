mod file;
pub use file::{
    load_cache_file, save_cache_file, save_file_creds, CacheFile, FileCCache,
    FILE_CACHE_PREFIX,
};
