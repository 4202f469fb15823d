//! End-to-end tests against the HTTP router with in-memory stores.

mod helpers;

mod auth_test;
mod folder_test;
mod share_test;
mod upload_test;
