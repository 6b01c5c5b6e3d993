pub(crate) mod utils;

mod router_tests;
