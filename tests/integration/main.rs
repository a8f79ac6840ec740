//! Integration test suite for Link-Ripple

mod crawl_tests;
