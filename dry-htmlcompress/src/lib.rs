pub use dry_htmlcompress_macros::compress_directory as directory;
pub use dry_htmlcompress_macros::compress_file as file;
pub use dry_htmlcompress_macros::compress_str as str;

pub use dry_htmlcompress_parser::{
    Compressor, DEFAULT_ACTIVE_KEY, Error, Location, Options, Policies, Result, Source, Token,
    TokenKind,
};
