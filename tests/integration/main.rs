//! Integration tests entry point, following https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod classify_scenarios;
mod cli;
mod fixtures;
mod markup_scenarios;
mod pipeline;
mod tracing_utils;
