//! API module
//!
//! Contains HTTP request handlers for the book catalog endpoints

pub mod books;
pub mod comments;
pub mod readinglist;
pub mod users;
pub mod utils;
pub mod wishlist;
