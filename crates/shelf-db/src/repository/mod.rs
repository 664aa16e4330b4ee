//! # Repository Module
//!
//! Database repository implementations for Shelf.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Shell command                                                         │
//! │       │  db.books().borrow(3)                                          │
//! │       ▼                                                                 │
//! │  BookRepository                                                        │
//! │  ├── list_all / search / get_by_id / get_by_isbn / stats               │
//! │  ├── add_or_add_copy / update_details / delete                         │
//! │  └── borrow / return_copy                                              │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod book;
