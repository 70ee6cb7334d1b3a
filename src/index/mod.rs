pub mod bi_fm_index;
pub mod cursor;
pub mod fm_index;
pub mod occ;
pub mod text;

pub use bi_fm_index::{BiFmCursor, BiFmIndex};
pub use cursor::{BidirectionalCursor, IndexCursor};
pub use fm_index::{FmCursor, FmIndex};
pub use text::{TextCollection, TextPosition};
