//! Container and directory tests over in-memory fixtures

mod byte_order_tests;
mod container_tests;
