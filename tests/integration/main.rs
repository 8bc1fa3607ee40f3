//! End-to-end marketplace scenarios over the in-memory backends.

mod concurrency_test;
mod document_test;
mod entity_test;
mod helpers;
