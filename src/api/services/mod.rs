//! # 业务服务

pub mod notes;

pub use notes::{NoteListQuery, NoteResponse, NoteService, NoteSortField, SortOrder};
